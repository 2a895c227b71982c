//! Phase artifacts
//!
//! An artifact is the document a caller submits for one phase: an opaque
//! structured payload plus the declared metadata the validators actually
//! inspect (layer references, scope items touched, planned changes, work
//! units, test intents). Artifacts are immutable once validated; a
//! resubmission creates a new artifact that supersedes but never erases the
//! prior one.

use crate::models::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// A declared dependency edge between two layers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerRef {
    pub from: String,
    pub to: String,
}

impl LayerRef {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Action a planned change performs on a file or module
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeAction {
    Create,
    #[default]
    Modify,
    Delete,
    Rename,
}

/// A file/module-level change enumerated by the Plan artifact
///
/// Every change must map onto exactly one approved scope item; an unmapped
/// change is scope creep, an approved item with no change is an incomplete
/// plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannedChange {
    /// File or module path the change touches
    pub file: String,

    #[serde(default)]
    pub action: ChangeAction,

    /// Approved scope item this change implements
    #[serde(default)]
    pub scope_item: Option<String>,
}

/// Documentation marker required for each unit of work
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocMarker {
    /// What the unit is for
    #[serde(default)]
    pub purpose: String,

    /// Parameters or inputs, if any
    #[serde(default)]
    pub parameters: Vec<String>,

    /// Failure modes the unit can exhibit
    #[serde(default)]
    pub failure_modes: Vec<String>,
}

impl DocMarker {
    /// A marker counts only when purpose and failure modes are filled in;
    /// parameters may be legitimately empty.
    pub fn is_complete(&self) -> bool {
        !self.purpose.trim().is_empty() && !self.failure_modes.is_empty()
    }
}

/// A unit of work declared by the Implement artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkUnit {
    /// Unit name; matched against the plan's change files
    pub name: String,

    /// Scope item this unit serves
    #[serde(default)]
    pub scope_item: Option<String>,

    /// Documentation marker (purpose, parameters, failure modes)
    #[serde(default)]
    pub documentation: Option<DocMarker>,
}

/// A recorded intent to test a scope item (existence check only; the engine
/// never executes anything)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestIntent {
    /// Test name or identifier
    pub name: String,

    /// Scope item the test covers
    pub scope_item: String,
}

/// Caller-supplied artifact content, before the engine seals it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactDraft {
    /// Opaque structured document; validated for shape, never content quality
    #[serde(default)]
    pub payload: serde_json::Value,

    /// Layer the artifact's work lives in
    #[serde(default)]
    pub declared_layer: Option<String>,

    /// Scope items the artifact touches
    #[serde(default)]
    pub declared_scope_items: BTreeSet<String>,

    /// Layer dependency edges the artifact introduces
    #[serde(default)]
    pub layer_refs: Vec<LayerRef>,

    /// File/module changes (Plan phase)
    #[serde(default)]
    pub planned_changes: Vec<PlannedChange>,

    /// Units of work (Implement phase)
    #[serde(default)]
    pub work_units: Vec<WorkUnit>,

    /// Test intents (Verify phase)
    #[serde(default)]
    pub test_intents: Vec<TestIntent>,
}

/// A sealed artifact: draft content plus phase, generation, timestamp, and
/// payload checksum. Immutable after validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Phase this artifact was submitted for
    pub phase: Phase,

    /// Artifact generation; bumped on every Revise transition
    pub generation: u32,

    /// Submission timestamp
    pub submitted_at: DateTime<Utc>,

    /// Payload checksum ("sha256:<hex>")
    pub checksum: String,

    #[serde(flatten)]
    pub draft: ArtifactDraft,
}

impl Artifact {
    /// Seal a draft for submission
    pub fn seal(phase: Phase, generation: u32, draft: ArtifactDraft) -> Self {
        let checksum = payload_checksum(&draft.payload);
        Self {
            phase,
            generation,
            submitted_at: Utc::now(),
            checksum,
            draft,
        }
    }
}

/// Checksum of an artifact payload, in the same `sha256:` format used for
/// file staleness tracking
pub fn payload_checksum(payload: &serde_json::Value) -> String {
    let canonical = payload.to_string();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}
