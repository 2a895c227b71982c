//! Plan-phase validator
//!
//! Three checks: every declared layer reference must be permitted by the
//! architecture profile, every planned change must map onto exactly one
//! approved scope item, and every approved scope item must have at least one
//! planned change.

use crate::models::{Artifact, Verdict, Violation, ViolationKind};
use crate::state::WorkflowState;
use crate::validator::{layering_violations, scope_creep_violations, ValidationRules};
use std::collections::BTreeSet;

pub fn validate(artifact: &Artifact, state: &WorkflowState, _rules: &ValidationRules) -> Verdict {
    let mut violations = Vec::new();

    violations.extend(layering_violations(
        &state.descriptor.profile,
        artifact.draft.declared_layer.as_deref(),
        &artifact.draft.layer_refs,
    ));

    violations.extend(scope_creep_violations(state, artifact));

    // Each planned change must name an approved scope item
    let mut covered: BTreeSet<&str> = BTreeSet::new();
    for change in &artifact.draft.planned_changes {
        match change.scope_item.as_deref() {
            None => violations.push(Violation::new(
                ViolationKind::ScopeCreep,
                format!("planned change '{}' maps to no approved scope item", change.file),
            )),
            Some(item) if !state.ledger.is_approved(item) => violations.push(
                Violation::new(
                    ViolationKind::ScopeCreep,
                    format!(
                        "planned change '{}' maps to unapproved feature '{}'",
                        change.file, item
                    ),
                )
                .with_scope_item(item),
            ),
            Some(item) => {
                covered.insert(item);
            }
        }
    }

    // Each approved item must be covered by at least one change
    for item in state.ledger.approved() {
        if !covered.contains(item) {
            violations.push(
                Violation::new(
                    ViolationKind::IncompletePlan,
                    format!("approved feature '{}' has no planned change", item),
                )
                .with_scope_item(item),
            );
        }
    }

    let passing = violations.is_empty();
    Verdict::from_violations(artifact.phase, artifact.generation, violations, passing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::StaticExtractor;
    use crate::models::{
        ArchitectureProfile, Artifact, ArtifactDraft, Layer, LayerRef, Phase, PlannedChange,
        ScopeDecision, TaskDescriptor,
    };
    use crate::state::Workflow;

    fn workflow_with_approved_name() -> Workflow {
        let profile = ArchitectureProfile::new(vec![
            Layer::new("presentation").depends_on("domain"),
            Layer::new("domain"),
        ])
        .unwrap();
        let descriptor = TaskDescriptor::new("collect name and email", profile);
        let mut wf =
            Workflow::create(descriptor, &StaticExtractor::new(&["name", "email"])).unwrap();
        wf.answer_clarification("name", ScopeDecision::Approve)
            .unwrap();
        wf.answer_clarification("email", ScopeDecision::Reject)
            .unwrap();
        wf
    }

    fn plan_artifact(draft: ArtifactDraft) -> Artifact {
        Artifact::seal(Phase::Plan, 1, draft)
    }

    #[test]
    fn test_scope_creep_named_per_item() {
        let wf = workflow_with_approved_name();
        let artifact = plan_artifact(ArtifactDraft {
            declared_scope_items: ["name", "email"].iter().map(|s| s.to_string()).collect(),
            planned_changes: vec![PlannedChange {
                file: "src/models/user.rs".to_string(),
                action: Default::default(),
                scope_item: Some("name".to_string()),
            }],
            ..Default::default()
        });

        let verdict = validate(&artifact, wf.state(), &ValidationRules::default());
        assert!(!verdict.is_pass());

        let creep: Vec<_> = verdict
            .violations
            .iter()
            .filter(|v| v.kind == ViolationKind::ScopeCreep)
            .collect();
        assert_eq!(creep.len(), 1);
        assert_eq!(creep[0].scope_item.as_deref(), Some("email"));
    }

    #[test]
    fn test_forbidden_layer_reference() {
        let wf = workflow_with_approved_name();
        let artifact = plan_artifact(ArtifactDraft {
            declared_scope_items: ["name"].iter().map(|s| s.to_string()).collect(),
            layer_refs: vec![LayerRef::new("domain", "presentation")],
            planned_changes: vec![PlannedChange {
                file: "src/domain/user.rs".to_string(),
                action: Default::default(),
                scope_item: Some("name".to_string()),
            }],
            ..Default::default()
        });

        let verdict = validate(&artifact, wf.state(), &ValidationRules::default());
        assert!(!verdict.is_pass());
        assert!(verdict
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::Layering && v.layer.as_deref() == Some("domain")));
    }

    #[test]
    fn test_unmapped_change_is_creep() {
        let wf = workflow_with_approved_name();
        let artifact = plan_artifact(ArtifactDraft {
            declared_scope_items: ["name"].iter().map(|s| s.to_string()).collect(),
            planned_changes: vec![
                PlannedChange {
                    file: "src/models/user.rs".to_string(),
                    action: Default::default(),
                    scope_item: Some("name".to_string()),
                },
                PlannedChange {
                    file: "src/utils/logging.rs".to_string(),
                    action: Default::default(),
                    scope_item: None,
                },
            ],
            ..Default::default()
        });

        let verdict = validate(&artifact, wf.state(), &ValidationRules::default());
        assert!(!verdict.is_pass());
        assert!(verdict
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::ScopeCreep && v.message.contains("logging")));
    }

    #[test]
    fn test_uncovered_approved_item_is_incomplete() {
        let wf = workflow_with_approved_name();
        let artifact = plan_artifact(ArtifactDraft {
            declared_scope_items: ["name"].iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        });

        let verdict = validate(&artifact, wf.state(), &ValidationRules::default());
        assert!(!verdict.is_pass());
        assert!(verdict.violations.iter().any(|v| {
            v.kind == ViolationKind::IncompletePlan && v.scope_item.as_deref() == Some("name")
        }));
    }

    #[test]
    fn test_clean_plan_passes() {
        let wf = workflow_with_approved_name();
        let artifact = plan_artifact(ArtifactDraft {
            declared_scope_items: ["name"].iter().map(|s| s.to_string()).collect(),
            layer_refs: vec![LayerRef::new("presentation", "domain")],
            planned_changes: vec![PlannedChange {
                file: "src/models/user.rs".to_string(),
                action: Default::default(),
                scope_item: Some("name".to_string()),
            }],
            ..Default::default()
        });

        let verdict = validate(&artifact, wf.state(), &ValidationRules::default());
        assert!(verdict.is_pass());
    }
}
