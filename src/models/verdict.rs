//! Verdicts and violations
//!
//! Content violations are expected, recoverable outcomes: they ride on Fail
//! verdicts instead of being raised as errors, and every verdict (Pass or
//! Fail) lands in the workflow's history for audit.

use crate::models::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pass/Fail outcome of validating one phase's artifact
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
}

/// Kinds of content violation a validator can raise
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A scope item is still Requested when Clarify tries to close
    UnresolvedScope,
    /// An artifact touches a feature not explicitly approved
    ScopeCreep,
    /// A layer dependency the architecture profile does not permit
    Layering,
    /// An approved scope item with no planned change
    IncompletePlan,
    /// A work unit missing its documentation marker
    DocumentationGap,
    /// An approved scope item with no recorded test intent
    MissingTest,
}

impl ViolationKind {
    /// The phase where this kind of violation originates. Revise transitions
    /// target the earliest origin among a failing verdict's violations, so a
    /// scope violation surfacing in Implement still sends the workflow back
    /// to Clarifying.
    pub fn origin_phase(&self) -> Phase {
        match self {
            ViolationKind::UnresolvedScope | ViolationKind::ScopeCreep => Phase::Clarify,
            ViolationKind::Layering | ViolationKind::IncompletePlan => Phase::Plan,
            ViolationKind::DocumentationGap => Phase::Implement,
            ViolationKind::MissingTest => Phase::Verify,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViolationKind::UnresolvedScope => "unresolved_scope",
            ViolationKind::ScopeCreep => "scope_creep",
            ViolationKind::Layering => "layering",
            ViolationKind::IncompletePlan => "incomplete_plan",
            ViolationKind::DocumentationGap => "documentation_gap",
            ViolationKind::MissingTest => "missing_test",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single content violation with its diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,

    /// Human-readable message naming the offending feature or edge
    pub message: String,

    /// Scope item the violation relates to, if any
    #[serde(default)]
    pub scope_item: Option<String>,

    /// Layer the violation relates to, if any
    #[serde(default)]
    pub layer: Option<String>,
}

impl Violation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            scope_item: None,
            layer: None,
        }
    }

    pub fn with_scope_item(mut self, name: impl Into<String>) -> Self {
        self.scope_item = Some(name.into());
        self
    }

    pub fn with_layer(mut self, name: impl Into<String>) -> Self {
        self.layer = Some(name.into());
        self
    }

    /// Format violation for display
    pub fn format(&self) -> String {
        format!("[{}] {}", self.kind, self.message)
    }
}

/// The outcome of validating one phase's artifact. Produced, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub phase: Phase,

    /// Artifact generation this verdict applies to
    pub generation: u32,

    pub outcome: Outcome,

    /// Violations in the order they were detected
    #[serde(default)]
    pub violations: Vec<Violation>,

    pub recorded_at: DateTime<Utc>,
}

impl Verdict {
    pub fn pass(phase: Phase, generation: u32) -> Self {
        Self {
            phase,
            generation,
            outcome: Outcome::Pass,
            violations: Vec::new(),
            recorded_at: Utc::now(),
        }
    }

    pub fn fail(phase: Phase, generation: u32, violations: Vec<Violation>) -> Self {
        Self {
            phase,
            generation,
            outcome: Outcome::Fail,
            violations,
            recorded_at: Utc::now(),
        }
    }

    /// Build a verdict from collected violations; `passing` lets a validator
    /// keep sub-threshold violations on a Pass verdict.
    pub fn from_violations(
        phase: Phase,
        generation: u32,
        violations: Vec<Violation>,
        passing: bool,
    ) -> Self {
        Self {
            phase,
            generation,
            outcome: if passing { Outcome::Pass } else { Outcome::Fail },
            violations,
            recorded_at: Utc::now(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    /// Earliest-violated phase among this verdict's violations; the target
    /// of a Revise transition.
    pub fn earliest_phase(&self) -> Option<Phase> {
        self.violations
            .iter()
            .map(|v| v.kind.origin_phase())
            .min()
    }

    /// Format all violations for display
    pub fn format_violations(&self) -> String {
        self.violations
            .iter()
            .map(|v| v.format())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
