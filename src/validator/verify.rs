//! Verify-phase validator
//!
//! Existence checks only, never execution: every approved scope item needs at
//! least the configured number of recorded test intents, and no phase in the
//! current artifact generation may be left with an outstanding failing
//! verdict.

use crate::models::{Artifact, Outcome, Phase, Verdict, Violation, ViolationKind};
use crate::state::WorkflowState;
use crate::validator::ValidationRules;

pub fn validate(artifact: &Artifact, state: &WorkflowState, rules: &ValidationRules) -> Verdict {
    let mut violations = Vec::new();

    for item in state.ledger.approved() {
        let count = artifact
            .draft
            .test_intents
            .iter()
            .filter(|t| t.scope_item == item)
            .count();
        if count < rules.min_test_intents {
            violations.push(
                Violation::new(
                    ViolationKind::MissingTest,
                    format!(
                        "approved feature '{}' has {} of {} required test intents",
                        item, count, rules.min_test_intents
                    ),
                )
                .with_scope_item(item),
            );
        }
    }

    // No phase in this generation may end on a Fail
    for phase in [Phase::Clarify, Phase::Plan, Phase::Implement] {
        let last = state
            .verdict_history
            .iter()
            .filter(|v| v.phase == phase && v.generation == artifact.generation)
            .last();
        if let Some(verdict) = last {
            if verdict.outcome == Outcome::Fail {
                let kind = verdict
                    .violations
                    .first()
                    .map(|v| v.kind)
                    .unwrap_or(ViolationKind::IncompletePlan);
                violations.push(Violation::new(
                    kind,
                    format!(
                        "outstanding failing '{}' verdict in generation {}",
                        phase, artifact.generation
                    ),
                ));
            }
        }
    }

    let passing = violations.is_empty();
    Verdict::from_violations(artifact.phase, artifact.generation, violations, passing)
}
