//! Workflow state machine
//!
//! Owns the single mutable aggregate (`WorkflowState`) and drives it through
//! the mandatory phases. Every artifact submission runs the matching phase
//! validator; every verdict, Pass or Fail, is appended to history for audit.
//! Forward transitions happen only on a passing verdict; the explicit Revise
//! transition moves back to a failing verdict's earliest-violated phase.

use crate::error::{EngineError, Result};
use crate::extract::FeatureExtractor;
use crate::models::{
    Artifact, ArtifactDraft, Outcome, Phase, ScopeDecision, ScopeLedger, TaskDescriptor, Verdict,
    WorkflowPhase,
};
use crate::reporter::{self, ComplianceReport};
use crate::validator::{self, ValidationRules};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How a transition was taken
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Advance,
    Revise,
    Abort,
}

/// One entry in the time-ordered transition history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionRecord {
    pub from: WorkflowPhase,
    pub to: WorkflowPhase,
    pub kind: TransitionKind,
    pub at: DateTime<Utc>,
}

/// The single mutable aggregate for one workflow instance
///
/// Owned exclusively by `Workflow`; callers only ever see references or
/// clones. Fully serializable so external persistence can round-trip it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Immutable task input
    pub descriptor: TaskDescriptor,

    /// Current machine state
    pub current_phase: WorkflowPhase,

    /// Artifact generation; bumped on every Revise transition
    pub generation: u32,

    /// Scope ledger seeded from the request's extracted features
    pub ledger: ScopeLedger,

    /// Every artifact ever submitted, in submission order
    pub artifact_history: Vec<Artifact>,

    /// Every verdict ever produced, index-aligned with the artifacts
    pub verdict_history: Vec<Verdict>,

    /// Time-ordered transitions
    pub transitions: Vec<TransitionRecord>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Reason recorded when the workflow was aborted
    #[serde(default)]
    pub abort_reason: Option<String>,
}

impl WorkflowState {
    /// Latest verdict recorded for a phase, any generation
    pub fn latest_verdict(&self, phase: Phase) -> Option<&Verdict> {
        self.verdict_history.iter().rev().find(|v| v.phase == phase)
    }

    /// Whether any passing verdict exists for a phase
    pub fn has_pass(&self, phase: Phase) -> bool {
        self.verdict_history
            .iter()
            .any(|v| v.phase == phase && v.outcome == Outcome::Pass)
    }

    /// The most recent artifact for a phase whose verdict passed
    pub fn latest_passing_artifact(&self, phase: Phase) -> Option<&Artifact> {
        self.artifact_history
            .iter()
            .zip(self.verdict_history.iter())
            .rev()
            .find(|(a, v)| a.phase == phase && v.outcome == Outcome::Pass)
            .map(|(a, _)| a)
    }

    /// Serialize the full state to YAML for external persistence
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reconstruct a state from its YAML form
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Handle for one workflow instance
///
/// Not safe for concurrent mutation; wrap in a mutex (or use
/// `WorkflowRegistry`) to serialize writers per workflow id. Reads via
/// `current_report` return copied snapshots.
pub struct Workflow {
    state: WorkflowState,
    rules: ValidationRules,
}

impl Workflow {
    /// Create a workflow: seed the scope ledger from the request's extracted
    /// features and enter Clarifying.
    pub fn create(descriptor: TaskDescriptor, extractor: &dyn FeatureExtractor) -> Result<Self> {
        Self::create_with_rules(descriptor, extractor, ValidationRules::default())
    }

    pub fn create_with_rules(
        descriptor: TaskDescriptor,
        extractor: &dyn FeatureExtractor,
        rules: ValidationRules,
    ) -> Result<Self> {
        let now = Utc::now();
        let mut ledger = ScopeLedger::new();
        for feature in extractor.extract(&descriptor.raw_request) {
            ledger.register(feature, None)?;
        }

        info!(
            workflow_id = %descriptor.id,
            features = ledger.len(),
            "workflow created"
        );

        let mut state = WorkflowState {
            descriptor,
            current_phase: WorkflowPhase::Created,
            generation: 1,
            ledger,
            artifact_history: Vec::new(),
            verdict_history: Vec::new(),
            transitions: Vec::new(),
            created_at: now,
            updated_at: now,
            abort_reason: None,
        };

        state.transitions.push(TransitionRecord {
            from: WorkflowPhase::Created,
            to: WorkflowPhase::Clarifying,
            kind: TransitionKind::Advance,
            at: now,
        });
        state.current_phase = WorkflowPhase::Clarifying;

        Ok(Self { state, rules })
    }

    /// Rebuild a handle from a persisted state
    pub fn restore(state: WorkflowState, rules: ValidationRules) -> Self {
        Self { state, rules }
    }

    /// Current state (read-only)
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Copy of the full state, for persistence
    pub fn snapshot(&self) -> WorkflowState {
        self.state.clone()
    }

    pub fn id(&self) -> uuid::Uuid {
        self.state.descriptor.id
    }

    pub fn current_phase(&self) -> WorkflowPhase {
        self.state.current_phase
    }

    /// Submit an artifact for the current phase.
    ///
    /// Fails with `PhaseMismatch` when `phase` is not the machine's current
    /// phase, and with `OutOfOrder` when a prerequisite phase has no passing
    /// verdict. Otherwise the matching validator runs, the artifact and its
    /// verdict join the history, and a Pass advances the machine (a Fail
    /// leaves it in place; resubmission is unlimited).
    pub fn submit_artifact(&mut self, phase: Phase, draft: ArtifactDraft) -> Result<Verdict> {
        if self.state.current_phase.is_terminal() {
            return Err(EngineError::Terminal(self.state.current_phase));
        }

        let expected = self.state.current_phase.expected_phase();
        if expected != Some(phase) {
            return Err(EngineError::PhaseMismatch {
                submitted: phase,
                current: self.state.current_phase,
            });
        }

        for prerequisite in phase.prerequisites() {
            if !self.state.has_pass(*prerequisite) {
                return Err(EngineError::OutOfOrder {
                    missing: *prerequisite,
                });
            }
        }

        let artifact = Artifact::seal(phase, self.state.generation, draft);
        let verdict = validator::validate(&artifact, &self.state, &self.rules);

        debug!(
            workflow_id = %self.id(),
            phase = %phase,
            outcome = ?verdict.outcome,
            violations = verdict.violations.len(),
            "artifact validated"
        );

        self.state.artifact_history.push(artifact);
        self.state.verdict_history.push(verdict.clone());
        self.state.updated_at = Utc::now();

        // Verify passes wait for finalize(); earlier phases advance directly
        if verdict.is_pass() && phase != Phase::Verify {
            self.advance()?;
        }

        Ok(verdict)
    }

    /// Answer a clarification question for a raised scope item. Valid only
    /// while the machine is Clarifying; this is what freezes the ledger for
    /// the rest of the workflow.
    pub fn answer_clarification(&mut self, name: &str, decision: ScopeDecision) -> Result<()> {
        if self.state.current_phase.is_terminal() {
            return Err(EngineError::Terminal(self.state.current_phase));
        }
        if self.state.current_phase != WorkflowPhase::Clarifying {
            return Err(EngineError::ClarificationClosed(self.state.current_phase));
        }
        self.state.ledger.answer(name, decision)?;
        self.state.updated_at = Utc::now();
        Ok(())
    }

    /// Raise an additional scope item while clarification is open. A
    /// conflicting definition is fatal: the workflow aborts before the error
    /// is surfaced.
    pub fn register_scope_item(&mut self, name: &str, note: Option<String>) -> Result<()> {
        if self.state.current_phase.is_terminal() {
            return Err(EngineError::Terminal(self.state.current_phase));
        }
        if self.state.current_phase != WorkflowPhase::Clarifying {
            return Err(EngineError::ClarificationClosed(self.state.current_phase));
        }

        match self.state.ledger.register(name, note) {
            Ok(()) => {
                self.state.updated_at = Utc::now();
                Ok(())
            }
            Err(err) => {
                warn!(workflow_id = %self.id(), %err, "scope conflict; aborting workflow");
                self.record_transition(WorkflowPhase::Aborted, TransitionKind::Abort);
                self.state.abort_reason = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Revise: return to the earliest-violated phase of the latest verdict
    /// and open a new artifact generation. Only an outstanding failure can be
    /// revised from; a failure already superseded by a passing resubmission
    /// is history, not cause for a rewind. Re-entering Clarifying reopens the
    /// ledger for answers.
    pub fn revise(&mut self) -> Result<WorkflowPhase> {
        if self.state.current_phase.is_terminal() {
            return Err(EngineError::Terminal(self.state.current_phase));
        }

        let failing = match self.state.verdict_history.last() {
            Some(verdict) if verdict.outcome == Outcome::Fail => verdict,
            _ => return Err(EngineError::NothingToRevise),
        };

        let target = failing
            .earliest_phase()
            .unwrap_or(failing.phase)
            .workflow_phase();

        info!(
            workflow_id = %self.id(),
            from = %self.state.current_phase,
            to = %target,
            "revise transition"
        );

        self.record_transition(target, TransitionKind::Revise);
        self.state.generation += 1;
        Ok(target)
    }

    /// Abort: terminal, irreversible.
    pub fn abort(&mut self, reason: impl Into<String>) -> Result<()> {
        if self.state.current_phase.is_terminal() {
            return Err(EngineError::Terminal(self.state.current_phase));
        }
        self.record_transition(WorkflowPhase::Aborted, TransitionKind::Abort);
        self.state.abort_reason = Some(reason.into());
        Ok(())
    }

    /// Read-only snapshot of compliance so far. Never blocks, never fails,
    /// available in any phase.
    pub fn current_report(&self) -> ComplianceReport {
        reporter::report(&self.state)
    }

    /// Produce the final compliance report. Only valid once the machine is
    /// Verifying with a passing Verify verdict; records the transition to
    /// Completed. Re-finalizing a completed workflow returns the same report.
    pub fn finalize(&mut self) -> Result<ComplianceReport> {
        if self.state.current_phase == WorkflowPhase::Completed {
            return Ok(reporter::report(&self.state));
        }

        reporter::check_ready(&self.state)?;
        self.record_transition(WorkflowPhase::Completed, TransitionKind::Advance);
        info!(workflow_id = %self.id(), "workflow completed");
        Ok(reporter::report(&self.state))
    }

    /// Advance to the next phase after a passing verdict
    fn advance(&mut self) -> Result<()> {
        let from = self.state.current_phase;
        let to = from.next().ok_or(EngineError::Terminal(from))?;

        // Invariant: nothing leaves Clarifying with a Requested item. A
        // breach means the ledger and the verdict that approved the advance
        // disagree, which is fatal like any other scope conflict.
        if from == WorkflowPhase::Clarifying && !self.state.ledger.all_resolved() {
            let err = EngineError::ScopeConflict {
                name: self
                    .state
                    .ledger
                    .unresolved()
                    .first()
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                reason: "attempted to leave clarifying with unresolved scope".to_string(),
            };
            warn!(workflow_id = %self.id(), %err, "ledger inconsistency; aborting workflow");
            self.record_transition(WorkflowPhase::Aborted, TransitionKind::Abort);
            self.state.abort_reason = Some(err.to_string());
            return Err(err);
        }

        info!(workflow_id = %self.id(), from = %from, to = %to, "advance transition");
        self.record_transition(to, TransitionKind::Advance);
        Ok(())
    }

    fn record_transition(&mut self, to: WorkflowPhase, kind: TransitionKind) {
        let now = Utc::now();
        self.state.transitions.push(TransitionRecord {
            from: self.state.current_phase,
            to,
            kind,
            at: now,
        });
        self.state.current_phase = to;
        self.state.updated_at = now;
    }
}
