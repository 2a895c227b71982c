//! Phase enums for artifacts and the workflow machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase an artifact is submitted for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Clarify,
    Plan,
    Implement,
    Verify,
}

impl Phase {
    /// All phases in mandatory order
    pub const ALL: [Phase; 4] = [Phase::Clarify, Phase::Plan, Phase::Implement, Phase::Verify];

    /// Phases that must hold a passing verdict before this one may be submitted
    pub fn prerequisites(&self) -> &'static [Phase] {
        match self {
            Phase::Clarify => &[],
            Phase::Plan => &[Phase::Clarify],
            Phase::Implement => &[Phase::Clarify, Phase::Plan],
            Phase::Verify => &[Phase::Clarify, Phase::Plan, Phase::Implement],
        }
    }

    /// The workflow state in which this phase's artifact is accepted
    pub fn workflow_phase(&self) -> WorkflowPhase {
        match self {
            Phase::Clarify => WorkflowPhase::Clarifying,
            Phase::Plan => WorkflowPhase::Planning,
            Phase::Implement => WorkflowPhase::Implementing,
            Phase::Verify => WorkflowPhase::Verifying,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Clarify => "clarify",
            Phase::Plan => "plan",
            Phase::Implement => "implement",
            Phase::Verify => "verify",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Workflow machine state
///
/// `Created -> Clarifying -> Planning -> Implementing -> Verifying ->
/// {Completed, Aborted}`. Transitions only move forward except the explicit
/// Revise transition, which returns to a failing verdict's earliest-violated
/// phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowPhase {
    Created,
    Clarifying,
    Planning,
    Implementing,
    Verifying,
    Completed,
    Aborted,
}

impl WorkflowPhase {
    /// Ordering rank for the forward-only invariant. Terminal states share
    /// the top rank; Aborted is reachable from anywhere.
    pub fn rank(&self) -> u8 {
        match self {
            WorkflowPhase::Created => 0,
            WorkflowPhase::Clarifying => 1,
            WorkflowPhase::Planning => 2,
            WorkflowPhase::Implementing => 3,
            WorkflowPhase::Verifying => 4,
            WorkflowPhase::Completed | WorkflowPhase::Aborted => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowPhase::Completed | WorkflowPhase::Aborted)
    }

    /// The artifact phase accepted in this state, if any
    pub fn expected_phase(&self) -> Option<Phase> {
        match self {
            WorkflowPhase::Clarifying => Some(Phase::Clarify),
            WorkflowPhase::Planning => Some(Phase::Plan),
            WorkflowPhase::Implementing => Some(Phase::Implement),
            WorkflowPhase::Verifying => Some(Phase::Verify),
            _ => None,
        }
    }

    /// Next state after a passing verdict
    pub fn next(&self) -> Option<WorkflowPhase> {
        match self {
            WorkflowPhase::Created => Some(WorkflowPhase::Clarifying),
            WorkflowPhase::Clarifying => Some(WorkflowPhase::Planning),
            WorkflowPhase::Planning => Some(WorkflowPhase::Implementing),
            WorkflowPhase::Implementing => Some(WorkflowPhase::Verifying),
            WorkflowPhase::Verifying => Some(WorkflowPhase::Completed),
            WorkflowPhase::Completed | WorkflowPhase::Aborted => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WorkflowPhase::Created => "created",
            WorkflowPhase::Clarifying => "clarifying",
            WorkflowPhase::Planning => "planning",
            WorkflowPhase::Implementing => "implementing",
            WorkflowPhase::Verifying => "verifying",
            WorkflowPhase::Completed => "completed",
            WorkflowPhase::Aborted => "aborted",
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
