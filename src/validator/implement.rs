//! Implement-phase validator
//!
//! Re-runs the layering and scope-creep checks against the implementation
//! artifact, then requires a documentation marker (purpose, parameters,
//! failure modes) for every unit of work the passing plan declared. Missing
//! documentation is not fatal by itself; it escalates to Fail once the gap
//! count exceeds the configured threshold.

use crate::models::{Artifact, Phase, Verdict, Violation, ViolationKind};
use crate::state::WorkflowState;
use crate::validator::{layering_violations, scope_creep_violations, ValidationRules};

pub fn validate(artifact: &Artifact, state: &WorkflowState, rules: &ValidationRules) -> Verdict {
    let mut violations = Vec::new();

    violations.extend(layering_violations(
        &state.descriptor.profile,
        artifact.draft.declared_layer.as_deref(),
        &artifact.draft.layer_refs,
    ));

    violations.extend(scope_creep_violations(state, artifact));

    for unit in &artifact.draft.work_units {
        if let Some(item) = unit.scope_item.as_deref() {
            if !state.ledger.is_approved(item) {
                violations.push(
                    Violation::new(
                        ViolationKind::ScopeCreep,
                        format!(
                            "work unit '{}' serves unapproved feature '{}'",
                            unit.name, item
                        ),
                    )
                    .with_scope_item(item),
                );
            }
        }
    }

    // Documentation check: every change the passing plan declared needs a
    // documented work unit here
    let mut doc_gaps = Vec::new();
    if let Some(plan) = state.latest_passing_artifact(Phase::Plan) {
        for change in &plan.draft.planned_changes {
            let unit = artifact
                .draft
                .work_units
                .iter()
                .find(|u| u.name == change.file);
            match unit {
                None => doc_gaps.push(Violation::new(
                    ViolationKind::DocumentationGap,
                    format!("planned change '{}' has no work unit", change.file),
                )),
                Some(unit) => {
                    let documented = unit
                        .documentation
                        .as_ref()
                        .map(|d| d.is_complete())
                        .unwrap_or(false);
                    if !documented {
                        doc_gaps.push(Violation::new(
                            ViolationKind::DocumentationGap,
                            format!(
                                "work unit '{}' lacks a complete documentation marker",
                                unit.name
                            ),
                        ));
                    }
                }
            }
        }
    }

    let hard_failure = !violations.is_empty();
    let gaps_over_threshold = doc_gaps.len() > rules.doc_gap_threshold;
    violations.extend(doc_gaps);

    let passing = !hard_failure && !gaps_over_threshold;
    Verdict::from_violations(artifact.phase, artifact.generation, violations, passing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::StaticExtractor;
    use crate::models::{
        ArchitectureProfile, ArtifactDraft, DocMarker, Layer, Phase, PlannedChange, ScopeDecision,
        TaskDescriptor, WorkUnit,
    };
    use crate::state::Workflow;

    /// Workflow advanced through a passing plan with one change per feature
    fn workflow_at_implement() -> Workflow {
        let profile = ArchitectureProfile::new(vec![
            Layer::new("presentation").depends_on("domain"),
            Layer::new("domain"),
        ])
        .unwrap();
        let descriptor = TaskDescriptor::new("collect user name", profile);
        let mut wf = Workflow::create(descriptor, &StaticExtractor::new(&["name"])).unwrap();
        wf.answer_clarification("name", ScopeDecision::Approve)
            .unwrap();
        wf.submit_artifact(Phase::Clarify, ArtifactDraft::default())
            .unwrap();
        wf.submit_artifact(
            Phase::Plan,
            ArtifactDraft {
                declared_scope_items: ["name".to_string()].into_iter().collect(),
                planned_changes: vec![PlannedChange {
                    file: "src/models/user.rs".to_string(),
                    action: Default::default(),
                    scope_item: Some("name".to_string()),
                }],
                ..Default::default()
            },
        )
        .unwrap();
        wf
    }

    fn documented_unit() -> WorkUnit {
        WorkUnit {
            name: "src/models/user.rs".to_string(),
            scope_item: Some("name".to_string()),
            documentation: Some(DocMarker {
                purpose: "store the user's name".to_string(),
                parameters: vec!["name".to_string()],
                failure_modes: vec!["empty input rejected".to_string()],
            }),
        }
    }

    #[test]
    fn test_documented_implementation_passes() {
        let wf = workflow_at_implement();
        let artifact = crate::models::Artifact::seal(
            Phase::Implement,
            1,
            ArtifactDraft {
                declared_layer: Some("domain".to_string()),
                declared_scope_items: ["name".to_string()].into_iter().collect(),
                work_units: vec![documented_unit()],
                ..Default::default()
            },
        );

        let verdict = validate(&artifact, wf.state(), &ValidationRules::default());
        assert!(verdict.is_pass(), "{}", verdict.format_violations());
    }

    #[test]
    fn test_missing_documentation_fails_at_default_threshold() {
        let wf = workflow_at_implement();
        let mut unit = documented_unit();
        unit.documentation = None;

        let artifact = crate::models::Artifact::seal(
            Phase::Implement,
            1,
            ArtifactDraft {
                declared_layer: Some("domain".to_string()),
                declared_scope_items: ["name".to_string()].into_iter().collect(),
                work_units: vec![unit],
                ..Default::default()
            },
        );

        let verdict = validate(&artifact, wf.state(), &ValidationRules::default());
        assert!(!verdict.is_pass());
        assert!(verdict
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::DocumentationGap));
    }

    #[test]
    fn test_gaps_under_threshold_pass_but_are_recorded() {
        let wf = workflow_at_implement();
        let mut unit = documented_unit();
        unit.documentation = None;

        let artifact = crate::models::Artifact::seal(
            Phase::Implement,
            1,
            ArtifactDraft {
                declared_layer: Some("domain".to_string()),
                declared_scope_items: ["name".to_string()].into_iter().collect(),
                work_units: vec![unit],
                ..Default::default()
            },
        );

        let rules = ValidationRules {
            doc_gap_threshold: 1,
            ..Default::default()
        };
        let verdict = validate(&artifact, wf.state(), &rules);
        assert!(verdict.is_pass());
        // The gap still shows up for the reporter to count
        assert_eq!(verdict.violations.len(), 1);
        assert_eq!(verdict.violations[0].kind, ViolationKind::DocumentationGap);
    }

    #[test]
    fn test_scope_creep_detected_again_in_implement() {
        let wf = workflow_at_implement();
        let artifact = crate::models::Artifact::seal(
            Phase::Implement,
            1,
            ArtifactDraft {
                declared_layer: Some("domain".to_string()),
                declared_scope_items: ["name".to_string(), "email".to_string()]
                    .into_iter()
                    .collect(),
                work_units: vec![documented_unit()],
                ..Default::default()
            },
        );

        let verdict = validate(&artifact, wf.state(), &ValidationRules::default());
        assert!(!verdict.is_pass());
        assert!(verdict
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::ScopeCreep
                && v.scope_item.as_deref() == Some("email")));
        // A scope violation in Implement revises back to clarification
        assert_eq!(verdict.earliest_phase(), Some(Phase::Clarify));
    }

    #[test]
    fn test_forbidden_layer_dependency_fails() {
        let wf = workflow_at_implement();
        let artifact = crate::models::Artifact::seal(
            Phase::Implement,
            1,
            ArtifactDraft {
                declared_layer: Some("domain".to_string()),
                declared_scope_items: ["name".to_string()].into_iter().collect(),
                layer_refs: vec![crate::models::LayerRef::new("domain", "presentation")],
                work_units: vec![documented_unit()],
                ..Default::default()
            },
        );

        let verdict = validate(&artifact, wf.state(), &ValidationRules::default());
        assert!(!verdict.is_pass());
        assert!(verdict
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::Layering));
    }
}
