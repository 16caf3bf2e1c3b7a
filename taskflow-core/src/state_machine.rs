use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{BuiltinStatus, KnownStatuses, StatusName};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("transition table has an entry for unknown status: {status}")]
    UnknownSource { status: StatusName },

    #[error("transition {from} \u{2192} {to} targets unknown status: {to}")]
    UnknownTarget { from: StatusName, to: StatusName },

    #[error("default status is not a known status: {status}")]
    UnknownDefault { status: StatusName },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status change not permitted: {from} \u{2192} {to}")]
pub struct TransitionDenied {
    pub from: StatusName,
    pub to: StatusName,
}

// ─── Transition Table ────────────────────────────────────────────────────────

/// Adjacency mapping from a status to the statuses reachable from it in one step.
///
/// Each entry keeps its declared order; nothing is sorted or deduplicated.
/// A null entry (`closed:` in YAML) reads as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TransitionTable(BTreeMap<StatusName, Vec<StatusName>>);

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        use BuiltinStatus::*;

        let edges: [(BuiltinStatus, &[BuiltinStatus]); 5] = [
            (New, &[InProgress, Canceled]),
            (InProgress, &[OnHold, Completed, Canceled]),
            (OnHold, &[InProgress, Canceled]),
            (Completed, &[]),
            (Canceled, &[]),
        ];

        let mut table = Self::new();
        for (from, targets) in edges {
            table.insert(from.into(), targets.iter().copied().map(StatusName::from).collect());
        }
        table
    }

    /// Replaces any previous entry for `from`.
    pub fn insert(&mut self, from: StatusName, targets: Vec<StatusName>) -> Option<Vec<StatusName>> {
        self.0.insert(from, targets)
    }

    pub fn get(&self, from: &str) -> Option<&[StatusName]> {
        self.0.get(from).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatusName, &[StatusName])> {
        self.0.iter().map(|(from, to)| (from, to.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Every name referenced as a source or target must be in `known`.
    /// Stops at the first violation: sources in sorted order, targets in
    /// declared order.
    pub fn validate(&self, known: &KnownStatuses) -> Result<(), ConfigurationError> {
        for (from, targets) in &self.0 {
            if !known.contains(from.as_str()) {
                return Err(ConfigurationError::UnknownSource {
                    status: from.clone(),
                });
            }
            if let Some(to) = targets.iter().find(|to| !known.contains(to.as_str())) {
                return Err(ConfigurationError::UnknownTarget {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for TransitionTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<StatusName, Option<Vec<StatusName>>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(from, to)| (from, to.unwrap_or_default()))
            .collect())
    }
}

impl FromIterator<(StatusName, Vec<StatusName>)> for TransitionTable {
    fn from_iter<I: IntoIterator<Item = (StatusName, Vec<StatusName>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Legal next-state graph for task statuses.
///
/// Immutable once built; share it behind an `Arc` or a `static`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransitionPolicy {
    table: TransitionTable,
    known: KnownStatuses,
}

impl StatusTransitionPolicy {
    pub fn new(table: TransitionTable, known: KnownStatuses) -> Result<Self, ConfigurationError> {
        table.validate(&known)?;
        Ok(Self { table, known })
    }

    pub fn builtin() -> Self {
        Self {
            table: TransitionTable::builtin(),
            known: KnownStatuses::builtin(),
        }
    }

    /// Statuses reachable from `current` in one step, in declared order.
    /// Unknown and terminal statuses both yield an empty slice.
    pub fn transitions(&self, current: &str) -> &[StatusName] {
        self.table.get(current).unwrap_or(&[])
    }

    /// Staying on `current` is always allowed.
    pub fn is_allowed(&self, current: &str, target: &str) -> bool {
        current == target || self.transitions(current).iter().any(|to| to == target)
    }

    pub fn check(&self, current: &StatusName, target: &StatusName) -> Result<(), TransitionDenied> {
        if !self.is_allowed(current.as_str(), target.as_str()) {
            return Err(TransitionDenied {
                from: current.clone(),
                to: target.clone(),
            });
        }
        Ok(())
    }

    pub fn is_terminal(&self, status: &str) -> bool {
        self.transitions(status).is_empty()
    }

    pub fn terminal_statuses(&self) -> Vec<&StatusName> {
        self.known
            .iter()
            .filter(|status| self.is_terminal(status.as_str()))
            .collect()
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn known_statuses(&self) -> &KnownStatuses {
        &self.known
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
