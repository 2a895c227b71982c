//! Workflow registry
//!
//! Multiple workflow instances are fully independent; a single instance is
//! not safe for concurrent mutation. The registry gives each instance its own
//! mutex so writers are serialized per workflow id while distinct workflows
//! run in parallel.

use crate::error::{EngineError, Result};
use crate::extract::FeatureExtractor;
use crate::models::TaskDescriptor;
use crate::reporter::ComplianceReport;
use crate::state::{Workflow, WorkflowState};
use crate::validator::ValidationRules;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
pub struct WorkflowRegistry {
    workflows: Mutex<HashMap<Uuid, Arc<Mutex<Workflow>>>>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a workflow, returning its id
    pub fn create(
        &self,
        descriptor: TaskDescriptor,
        extractor: &dyn FeatureExtractor,
    ) -> Result<Uuid> {
        self.create_with_rules(descriptor, extractor, ValidationRules::default())
    }

    pub fn create_with_rules(
        &self,
        descriptor: TaskDescriptor,
        extractor: &dyn FeatureExtractor,
        rules: ValidationRules,
    ) -> Result<Uuid> {
        let workflow = Workflow::create_with_rules(descriptor, extractor, rules)?;
        let id = workflow.id();
        self.lock_map()
            .insert(id, Arc::new(Mutex::new(workflow)));
        Ok(id)
    }

    /// Run a closure against a workflow, holding its per-instance lock for
    /// the duration (single-writer discipline)
    pub fn with_workflow<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Workflow) -> Result<R>,
    ) -> Result<R> {
        let handle = self
            .lock_map()
            .get(&id)
            .cloned()
            .ok_or(EngineError::UnknownWorkflow(id))?;
        let mut workflow = handle.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut workflow)
    }

    /// Snapshot report without mutating anything
    pub fn report(&self, id: Uuid) -> Result<ComplianceReport> {
        self.with_workflow(id, |wf| Ok(wf.current_report()))
    }

    /// Remove a workflow and hand back its final state for archival
    pub fn remove(&self, id: Uuid) -> Option<WorkflowState> {
        self.lock_map()
            .remove(&id)
            .map(|handle| {
                let workflow = handle.lock().unwrap_or_else(|e| e.into_inner());
                workflow.snapshot()
            })
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.lock_map().keys().copied().collect()
    }

    fn lock_map(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Arc<Mutex<Workflow>>>> {
        self.workflows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::StaticExtractor;
    use crate::models::{ArchitectureProfile, ArtifactDraft, Layer, Phase, ScopeDecision};

    fn descriptor() -> TaskDescriptor {
        let profile = ArchitectureProfile::new(vec![Layer::new("domain")]).unwrap();
        TaskDescriptor::new("collect name", profile)
    }

    #[test]
    fn test_create_and_report() {
        let registry = WorkflowRegistry::new();
        let id = registry
            .create(descriptor(), &StaticExtractor::new(&["name"]))
            .unwrap();

        let report = registry.report(id).unwrap();
        assert_eq!(report.workflow_id, id);
    }

    #[test]
    fn test_unknown_workflow() {
        let registry = WorkflowRegistry::new();
        let err = registry.report(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownWorkflow(_)));
    }

    #[test]
    fn test_independent_workflows_in_parallel() {
        let registry = Arc::new(WorkflowRegistry::new());
        let mut ids = Vec::new();
        for _ in 0..4 {
            ids.push(
                registry
                    .create(descriptor(), &StaticExtractor::new(&["name"]))
                    .unwrap(),
            );
        }

        let handles: Vec<_> = ids
            .iter()
            .map(|&id| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .with_workflow(id, |wf| {
                            wf.answer_clarification("name", ScopeDecision::Approve)?;
                            wf.submit_artifact(Phase::Clarify, ArtifactDraft::default())
                        })
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            let verdict = handle.join().unwrap();
            assert!(verdict.is_pass());
        }
    }

    #[test]
    fn test_remove_returns_state() {
        let registry = WorkflowRegistry::new();
        let id = registry
            .create(descriptor(), &StaticExtractor::new(&["name"]))
            .unwrap();

        let state = registry.remove(id).unwrap();
        assert_eq!(state.descriptor.id, id);
        assert!(registry.report(id).is_err());
    }
}
