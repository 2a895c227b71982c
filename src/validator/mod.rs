//! Phase validators
//!
//! One validator per phase, each a pure function over the submitted artifact
//! and the current workflow state. Validators never mutate anything; they
//! return a Verdict and the state machine records it.

pub mod clarify;
pub mod implement;
pub mod plan;
pub mod verify;

use crate::models::{
    ArchitectureProfile, Artifact, LayerRef, Phase, Verdict, Violation, ViolationKind,
};
use crate::state::WorkflowState;
use serde::{Deserialize, Serialize};

/// Validation thresholds, loadable from configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Maximum number of undocumented work units tolerated before the
    /// Implement verdict escalates to Fail
    #[serde(default)]
    pub doc_gap_threshold: usize,

    /// Minimum test intents required per approved scope item
    #[serde(default = "default_min_test_intents")]
    pub min_test_intents: usize,
}

fn default_min_test_intents() -> usize {
    1
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            doc_gap_threshold: 0,
            min_test_intents: 1,
        }
    }
}

/// Dispatch to the validator matching the artifact's phase
pub fn validate(artifact: &Artifact, state: &WorkflowState, rules: &ValidationRules) -> Verdict {
    match artifact.phase {
        Phase::Clarify => clarify::validate(artifact, state, rules),
        Phase::Plan => plan::validate(artifact, state, rules),
        Phase::Implement => implement::validate(artifact, state, rules),
        Phase::Verify => verify::validate(artifact, state, rules),
    }
}

/// Check declared layer references against the architecture profile.
/// Shared by the Plan and Implement validators.
pub(crate) fn layering_violations(
    profile: &ArchitectureProfile,
    declared_layer: Option<&str>,
    refs: &[LayerRef],
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Some(layer) = declared_layer {
        if profile.layer(layer).is_none() {
            violations.push(
                Violation::new(
                    ViolationKind::Layering,
                    format!("declared layer '{}' is not in the architecture profile", layer),
                )
                .with_layer(layer),
            );
        }
    }

    for edge in refs {
        if profile.layer(&edge.from).is_none() {
            violations.push(
                Violation::new(
                    ViolationKind::Layering,
                    format!("reference from undeclared layer '{}'", edge.from),
                )
                .with_layer(edge.from.clone()),
            );
            continue;
        }
        if profile.layer(&edge.to).is_none() {
            violations.push(
                Violation::new(
                    ViolationKind::Layering,
                    format!("reference to undeclared layer '{}'", edge.to),
                )
                .with_layer(edge.to.clone()),
            );
            continue;
        }
        if !profile.allows(&edge.from, &edge.to) {
            violations.push(
                Violation::new(
                    ViolationKind::Layering,
                    format!(
                        "layer '{}' may not depend on layer '{}'",
                        edge.from, edge.to
                    ),
                )
                .with_layer(edge.from.clone()),
            );
        }
    }

    violations
}

/// One ScopeCreep violation per declared item outside the approved set
pub(crate) fn scope_creep_violations(
    state: &WorkflowState,
    artifact: &Artifact,
) -> Vec<Violation> {
    state
        .ledger
        .creep(&artifact.draft.declared_scope_items)
        .into_iter()
        .map(|name| {
            Violation::new(
                ViolationKind::ScopeCreep,
                format!("artifact touches unapproved feature '{}'", name),
            )
            .with_scope_item(name)
        })
        .collect()
}
