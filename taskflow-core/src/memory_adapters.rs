use std::sync::RwLock;

use async_trait::async_trait;

use crate::types::{StatusName, StatusRecord, StatusStore, StoreError};

// ─── MemoryStatusStore ──────────────────────────────────────────────────────

/// Status reference table held in memory. Insertion order is store order.
pub struct MemoryStatusStore {
    records: RwLock<Vec<StatusRecord>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Creates a store holding one record per name, each with a fresh ULID.
    pub fn seed<I>(names: I) -> Self
    where
        I: IntoIterator<Item = StatusName>,
    {
        let store = Self::new();
        for name in names {
            store.insert(name);
        }
        store
    }

    /// Adds a status unless one with the same name exists; returns the stored record.
    pub fn insert(&self, name: StatusName) -> StatusRecord {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = records.iter().find(|r| r.name == name) {
            return existing.clone();
        }
        let record = StatusRecord {
            id: ulid::Ulid::new().to_string(),
            name,
        };
        records.push(record.clone());
        record
    }

    pub fn find_by_name(&self, name: &str) -> Option<StatusRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.iter().find(|r| r.name == name).cloned()
    }
}

impl Default for MemoryStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn list_statuses(&self) -> Result<Vec<StatusRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<StatusRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_names(&self, names: &[StatusName]) -> Result<Vec<StatusRecord>, StoreError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records
            .iter()
            .filter(|r| names.contains(&r.name))
            .cloned()
            .collect())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
