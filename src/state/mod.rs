pub mod machine;

pub use machine::{TransitionKind, TransitionRecord, Workflow, WorkflowState};
