// Complyd - Task Compliance Workflow Engine
// Phase-gated governance for automated coding tasks: clarify scope, plan
// against an architecture profile, implement with documentation, verify with
// test intents.

pub mod cli;
pub mod error;
pub mod extract;
pub mod models;
pub mod registry;
pub mod reporter;
pub mod state;
pub mod validator;

pub use error::{EngineError, Result};

// Re-export commonly used types
pub use models::{
    ArchitectureProfile, Artifact, ArtifactDraft, Layer, Phase, ScopeDecision, ScopeLedger,
    TaskDescriptor, Verdict, Violation, ViolationKind, WorkflowPhase,
};
pub use reporter::ComplianceReport;
pub use state::{Workflow, WorkflowState};
pub use validator::ValidationRules;
