//! Clarify-phase validator
//!
//! The clarify artifact closes the question-and-answer loop: it passes only
//! when every scope item raised from the request has been explicitly
//! approved or rejected. The engine never blocks waiting for answers; it
//! simply refuses to move on while any item is still Requested.

use crate::models::{Artifact, Verdict, Violation, ViolationKind};
use crate::state::WorkflowState;
use crate::validator::ValidationRules;

pub fn validate(artifact: &Artifact, state: &WorkflowState, _rules: &ValidationRules) -> Verdict {
    let violations: Vec<Violation> = state
        .ledger
        .unresolved()
        .into_iter()
        .map(|name| {
            Violation::new(
                ViolationKind::UnresolvedScope,
                format!("scope item '{}' has no clarification answer", name),
            )
            .with_scope_item(name)
        })
        .collect();

    let passing = violations.is_empty();
    Verdict::from_violations(artifact.phase, artifact.generation, violations, passing)
}
