//! Engine error taxonomy
//!
//! Three classes of failure, with different handling expectations:
//! - Usage errors: the caller invoked the API out of turn. Surfaced
//!   immediately, never retried internally.
//! - Conflict errors: internal data inconsistency. Fatal to the workflow
//!   instance, which transitions to `Aborted`.
//! - Content violations are NOT errors: they come back as Fail verdicts so
//!   the caller can revise and resubmit.

use crate::models::{Phase, WorkflowPhase};
use uuid::Uuid;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by the workflow engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("artifact submitted for phase '{submitted}' but workflow is in '{current}'")]
    PhaseMismatch {
        submitted: Phase,
        current: WorkflowPhase,
    },

    #[error("prerequisite phase '{missing}' has no recorded passing verdict")]
    OutOfOrder { missing: Phase },

    #[error("scope item '{0}' was never raised during clarification")]
    UnknownScopeItem(String),

    #[error("workflow is not ready to finalize (current phase: '{0}')")]
    WorkflowNotComplete(WorkflowPhase),

    #[error("conflicting definition for scope item '{name}': {reason}")]
    ScopeConflict { name: String, reason: String },

    #[error("clarifications are closed in phase '{0}'")]
    ClarificationClosed(WorkflowPhase),

    #[error("workflow is terminal ('{0}'); no further transitions permitted")]
    Terminal(WorkflowPhase),

    #[error("no failing verdict to revise from")]
    NothingToRevise,

    #[error("unknown workflow id: {0}")]
    UnknownWorkflow(Uuid),
}

impl EngineError {
    /// Caller misuse: the request was malformed for the current state
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            EngineError::PhaseMismatch { .. }
                | EngineError::OutOfOrder { .. }
                | EngineError::UnknownScopeItem(_)
                | EngineError::WorkflowNotComplete(_)
                | EngineError::ClarificationClosed(_)
                | EngineError::Terminal(_)
                | EngineError::NothingToRevise
                | EngineError::UnknownWorkflow(_)
        )
    }

    /// Fatal to the workflow instance
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::ScopeConflict { .. })
    }
}
