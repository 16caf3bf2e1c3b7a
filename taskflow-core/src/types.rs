use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ─── Status Names ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidStatusName {
    #[error("status name must not be empty")]
    Empty,

    #[error("status name {0:?} contains whitespace or control characters")]
    IllegalCharacter(String),
}

/// Identifier of a workflow status, e.g. `in_progress`.
///
/// Names are compared verbatim; no case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatusName(String);

impl StatusName {
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidStatusName> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidStatusName::Empty);
        }
        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidStatusName::IllegalCharacter(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StatusName {
    type Error = InvalidStatusName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for StatusName {
    type Error = InvalidStatusName;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for StatusName {
    type Err = InvalidStatusName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<StatusName> for String {
    fn from(name: StatusName) -> Self {
        name.0
    }
}

impl From<BuiltinStatus> for StatusName {
    fn from(status: BuiltinStatus) -> Self {
        Self(status.as_str().to_string())
    }
}

impl Borrow<str> for StatusName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StatusName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for StatusName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StatusName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for StatusName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Builtin Vocabulary ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinStatus {
    New,
    InProgress,
    OnHold,
    Completed,
    Canceled,
}

impl BuiltinStatus {
    pub const ALL: [BuiltinStatus; 5] = [
        BuiltinStatus::New,
        BuiltinStatus::InProgress,
        BuiltinStatus::OnHold,
        BuiltinStatus::Completed,
        BuiltinStatus::Canceled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BuiltinStatus::New => "new",
            BuiltinStatus::InProgress => "in_progress",
            BuiltinStatus::OnHold => "on_hold",
            BuiltinStatus::Completed => "completed",
            BuiltinStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for BuiltinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Known Statuses ─────────────────────────────────────────────────────────

/// The authoritative set of status names a transition table may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownStatuses(BTreeSet<StatusName>);

impl KnownStatuses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        BuiltinStatus::ALL.into_iter().map(StatusName::from).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusName> {
        self.0.iter()
    }
}

impl FromIterator<StatusName> for KnownStatuses {
    fn from_iter<I: IntoIterator<Item = StatusName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ─── Status Store ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub id: String,
    pub name: StatusName,
}

/// One selectable entry of a task edit form's status field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOption {
    pub value: String,
    pub text: String,
    pub selected: bool,
}

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn list_statuses(&self) -> Result<Vec<StatusRecord>, StoreError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<StatusRecord>, StoreError>;
    /// Records whose name is in `names`, in store order. Missing names are skipped.
    async fn find_by_names(&self, names: &[StatusName]) -> Result<Vec<StatusRecord>, StoreError>;
}

// ─── Tests ───────────────────────────────────────────────────────────────────
