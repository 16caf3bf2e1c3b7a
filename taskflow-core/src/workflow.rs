use std::sync::Arc;

use crate::state_machine::{ConfigurationError, StatusTransitionPolicy, TransitionTable};
use crate::types::{KnownStatuses, StatusName, StatusOption, StatusRecord, StatusStore, StoreError};

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Status not found: {0}")]
    UnknownStatusId(String),

    #[error("status change not permitted: {from} \u{2192} {to}")]
    TransitionNotPermitted { from: StatusName, to: StatusName },

    #[error("invalid workflow: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("{0}")]
    Store(#[from] StoreError),
}

// ─── StatusWorkflow ──────────────────────────────────────────────────────────

/// Status handling for the task edit form and its submission.
pub struct StatusWorkflow {
    policy: Arc<StatusTransitionPolicy>,
    store: Arc<dyn StatusStore>,
}

impl StatusWorkflow {
    pub fn new(policy: Arc<StatusTransitionPolicy>, store: Arc<dyn StatusStore>) -> Self {
        Self { policy, store }
    }

    /// Reads the known statuses from `store` once and validates `table` against them.
    pub async fn from_store(
        table: TransitionTable,
        store: Arc<dyn StatusStore>,
    ) -> Result<Self, WorkflowError> {
        let known: KnownStatuses = store
            .list_statuses()
            .await?
            .into_iter()
            .map(|record| record.name)
            .collect();
        let policy = StatusTransitionPolicy::new(table, known)?;
        tracing::info!(
            statuses = policy.known_statuses().len(),
            transitions = policy.table().edge_count(),
            "built status transition policy from store"
        );
        Ok(Self::new(Arc::new(policy), store))
    }

    pub fn policy(&self) -> &StatusTransitionPolicy {
        &self.policy
    }

    /// Allowed next statuses that exist in the store, in declared order,
    /// followed by the current status marked as selected.
    pub async fn status_options(
        &self,
        current: &StatusRecord,
    ) -> Result<Vec<StatusOption>, WorkflowError> {
        let next: Vec<StatusName> = self
            .policy
            .transitions(current.name.as_str())
            .iter()
            .filter(|name| **name != current.name)
            .cloned()
            .collect();
        tracing::debug!(current = %current.name, ?next, "available status transitions");

        let stored = self.store.find_by_names(&next).await?;

        let mut options: Vec<StatusOption> = Vec::with_capacity(next.len() + 1);
        for name in &next {
            let Some(record) = stored.iter().find(|r| &r.name == name) else {
                continue;
            };
            if options.iter().any(|o| o.value == record.id) {
                continue;
            }
            options.push(StatusOption {
                value: record.id.clone(),
                text: record.name.to_string(),
                selected: false,
            });
        }
        options.push(StatusOption {
            value: current.id.clone(),
            text: current.name.to_string(),
            selected: true,
        });

        tracing::debug!(current = %current.name, options = options.len(), "status options");
        Ok(options)
    }

    /// Resolves a submitted status id and rejects it unless the policy allows
    /// moving there from `current`.
    pub async fn resolve_submission(
        &self,
        current: &StatusRecord,
        submitted_id: &str,
    ) -> Result<StatusRecord, WorkflowError> {
        let target = self
            .store
            .find_by_id(submitted_id)
            .await?
            .ok_or_else(|| WorkflowError::UnknownStatusId(submitted_id.to_string()))?;

        if let Err(denied) = self.policy.check(&current.name, &target.name) {
            tracing::warn!(from = %denied.from, to = %denied.to, "rejected status change");
            return Err(WorkflowError::TransitionNotPermitted {
                from: denied.from,
                to: denied.to,
            });
        }

        Ok(target)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
