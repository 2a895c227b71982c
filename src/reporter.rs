//! Compliance reporter
//!
//! Aggregates the verdict history into a structured report: total violations
//! ever raised (even if later fixed), time-ordered phase transitions, and the
//! final scope set. `report` is the non-blocking snapshot available in any
//! phase; `finalize` is gated on a passing Verify verdict.

use crate::error::{EngineError, Result};
use crate::models::{Outcome, Phase, WorkflowPhase};
use crate::state::{TransitionRecord, WorkflowState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Overall workflow status as seen by the reporter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    InProgress,
    Passed,
    Aborted,
}

/// Per-phase submission summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseSummary {
    pub phase: Phase,
    /// Number of artifacts ever submitted for this phase
    pub submissions: usize,
    /// Outcome of the most recent submission, if any
    pub last_outcome: Option<Outcome>,
}

/// Immutable compliance summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub workflow_id: Uuid,
    pub raw_request: String,
    pub status: ReportStatus,
    pub current_phase: WorkflowPhase,
    pub generation: u32,
    pub generated_at: DateTime<Utc>,

    /// Every violation ever raised, counted even when a later resubmission
    /// fixed it
    pub total_violations: usize,

    /// Violation counts keyed by kind name
    pub violations_by_kind: BTreeMap<String, usize>,

    /// Time-ordered phase transitions
    pub transitions: Vec<TransitionRecord>,

    /// Final scope set
    pub approved_scope: Vec<String>,
    pub rejected_scope: Vec<String>,

    pub phase_summaries: Vec<PhaseSummary>,

    #[serde(default)]
    pub abort_reason: Option<String>,
}

impl ComplianceReport {
    pub fn passed(&self) -> bool {
        self.status == ReportStatus::Passed
    }

    /// Plain-text summary for display
    pub fn format_summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("workflow:   {}", self.workflow_id));
        lines.push(format!("status:     {:?}", self.status));
        lines.push(format!("phase:      {}", self.current_phase));
        lines.push(format!("generation: {}", self.generation));
        lines.push(format!("violations: {}", self.total_violations));
        for (kind, count) in &self.violations_by_kind {
            lines.push(format!("  {}: {}", kind, count));
        }
        lines.push(format!("approved:   [{}]", self.approved_scope.join(", ")));
        lines.push(format!("rejected:   [{}]", self.rejected_scope.join(", ")));
        lines.push(format!("transitions: {}", self.transitions.len()));
        lines.join("\n")
    }
}

/// Build a read-only snapshot report from the current state. Always
/// available, mid-workflow included.
pub fn report(state: &WorkflowState) -> ComplianceReport {
    let status = match state.current_phase {
        WorkflowPhase::Completed => ReportStatus::Passed,
        WorkflowPhase::Aborted => ReportStatus::Aborted,
        _ => ReportStatus::InProgress,
    };

    let mut violations_by_kind: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_violations = 0;
    for verdict in &state.verdict_history {
        for violation in &verdict.violations {
            total_violations += 1;
            *violations_by_kind
                .entry(violation.kind.name().to_string())
                .or_insert(0) += 1;
        }
    }

    let phase_summaries = Phase::ALL
        .iter()
        .map(|phase| {
            let submissions = state
                .verdict_history
                .iter()
                .filter(|v| v.phase == *phase)
                .count();
            let last_outcome = state.latest_verdict(*phase).map(|v| v.outcome);
            PhaseSummary {
                phase: *phase,
                submissions,
                last_outcome,
            }
        })
        .collect();

    ComplianceReport {
        workflow_id: state.descriptor.id,
        raw_request: state.descriptor.raw_request.clone(),
        status,
        current_phase: state.current_phase,
        generation: state.generation,
        generated_at: Utc::now(),
        total_violations,
        violations_by_kind,
        transitions: state.transitions.clone(),
        approved_scope: state.ledger.approved().iter().map(|s| s.to_string()).collect(),
        rejected_scope: state.ledger.rejected().iter().map(|s| s.to_string()).collect(),
        phase_summaries,
        abort_reason: state.abort_reason.clone(),
    }
}

/// Readiness gate for finalization: Verifying with a passing Verify verdict
/// from the current artifact generation. A Verify pass from an earlier
/// generation cannot complete work it never saw. The failure here is caller
/// misuse, not content non-compliance, so it is a hard error rather than a
/// Fail verdict.
pub fn check_ready(state: &WorkflowState) -> Result<()> {
    if state.current_phase != WorkflowPhase::Verifying {
        return Err(EngineError::WorkflowNotComplete(state.current_phase));
    }
    let verify_passed = state
        .latest_verdict(Phase::Verify)
        .map(|v| v.outcome == Outcome::Pass && v.generation == state.generation)
        .unwrap_or(false);
    if !verify_passed {
        return Err(EngineError::WorkflowNotComplete(state.current_phase));
    }
    Ok(())
}

/// Finalize against a read-only state: readiness-checked report production.
/// `Workflow::finalize` wraps this and also records the Completed transition.
pub fn finalize(state: &WorkflowState) -> Result<ComplianceReport> {
    if state.current_phase == WorkflowPhase::Completed {
        return Ok(report(state));
    }
    check_ready(state)?;
    let mut r = report(state);
    r.status = ReportStatus::Passed;
    Ok(r)
}
