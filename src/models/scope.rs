//! Scope ledger - the single source of truth for what is in bounds
//!
//! Scope items are born during Clarify from parsed request features, mutated
//! only by explicit clarification answers, and never deleted. Once the
//! Clarify phase passes, the ledger is status-locked; a Revise transition
//! back to Clarifying lifts the lock.

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Resolution status of a scope item
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScopeStatus {
    #[default]
    Requested,
    Approved,
    Rejected,
}

impl ScopeStatus {
    /// An item is resolved once it is no longer merely requested
    pub fn is_resolved(&self) -> bool {
        !matches!(self, ScopeStatus::Requested)
    }
}

/// Clarification decision for a requested item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScopeDecision {
    Approve,
    Reject,
}

impl ScopeDecision {
    pub fn status(&self) -> ScopeStatus {
        match self {
            ScopeDecision::Approve => ScopeStatus::Approved,
            ScopeDecision::Reject => ScopeStatus::Rejected,
        }
    }
}

/// A single feature raised during clarification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeItem {
    /// Feature name (normalized by the extractor)
    pub name: String,

    /// Resolution status
    #[serde(default)]
    pub status: ScopeStatus,

    /// Optional clarifying note attached at registration; part of the item's
    /// identity for conflict detection
    #[serde(default)]
    pub note: Option<String>,

    /// When the item was first raised
    #[serde(default)]
    pub raised_at: Option<DateTime<Utc>>,
}

/// Ledger of every scope item ever raised for a workflow
///
/// Keyed by name in a `BTreeMap` so iteration order is deterministic and the
/// serialized form is stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeLedger {
    items: BTreeMap<String, ScopeItem>,
}

impl ScopeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scope item. Idempotent: re-registering an identical
    /// definition is a no-op; a conflicting definition (same name, different
    /// note) fails with `ScopeConflict`, which is fatal to the workflow.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        note: Option<String>,
    ) -> Result<(), EngineError> {
        let name = name.into();
        if let Some(existing) = self.items.get(&name) {
            if existing.note == note {
                return Ok(());
            }
            return Err(EngineError::ScopeConflict {
                name,
                reason: format!(
                    "already registered with note {:?}, re-registered with {:?}",
                    existing.note, note
                ),
            });
        }

        self.items.insert(
            name.clone(),
            ScopeItem {
                name,
                status: ScopeStatus::Requested,
                note,
                raised_at: Some(Utc::now()),
            },
        );
        Ok(())
    }

    /// Apply a clarification decision to a raised item
    pub fn answer(&mut self, name: &str, decision: ScopeDecision) -> Result<(), EngineError> {
        let item = self
            .items
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownScopeItem(name.to_string()))?;
        item.status = decision.status();
        Ok(())
    }

    /// The predicate every later-phase validator calls
    pub fn is_approved(&self, name: &str) -> bool {
        self.items
            .get(name)
            .map(|i| i.status == ScopeStatus::Approved)
            .unwrap_or(false)
    }

    pub fn get(&self, name: &str) -> Option<&ScopeItem> {
        self.items.get(name)
    }

    /// Names of all approved items, in deterministic order
    pub fn approved(&self) -> Vec<&str> {
        self.items
            .values()
            .filter(|i| i.status == ScopeStatus::Approved)
            .map(|i| i.name.as_str())
            .collect()
    }

    /// Names of all rejected items
    pub fn rejected(&self) -> Vec<&str> {
        self.items
            .values()
            .filter(|i| i.status == ScopeStatus::Rejected)
            .map(|i| i.name.as_str())
            .collect()
    }

    /// Items still awaiting a clarification answer
    pub fn unresolved(&self) -> Vec<&str> {
        self.items
            .values()
            .filter(|i| !i.status.is_resolved())
            .map(|i| i.name.as_str())
            .collect()
    }

    pub fn all_resolved(&self) -> bool {
        self.items.values().all(|i| i.status.is_resolved())
    }

    /// Scope-creep detection: strict set difference of declared items against
    /// approved ones. No fuzzy matching, no inference of implied features;
    /// ambiguity must have been resolved in Clarify.
    pub fn creep(&self, declared: &BTreeSet<String>) -> Vec<String> {
        declared
            .iter()
            .filter(|name| !self.is_approved(name))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopeItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
