pub mod artifact;
pub mod descriptor;
pub mod phase;
pub mod scope;
pub mod verdict;

pub use artifact::{
    Artifact, ArtifactDraft, ChangeAction, DocMarker, LayerRef, PlannedChange, TestIntent, WorkUnit,
};
pub use descriptor::{ArchitectureProfile, Layer, ProfileError, TaskDescriptor};
pub use phase::{Phase, WorkflowPhase};
pub use scope::{ScopeDecision, ScopeItem, ScopeLedger, ScopeStatus};
pub use verdict::{Outcome, Verdict, Violation, ViolationKind};
