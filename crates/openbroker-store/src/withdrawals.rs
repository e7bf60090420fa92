//! The withdrawal request store.

use std::collections::HashMap;

use chrono::Utc;
use openbroker_types::{BrokerError, Result, Withdrawal, WithdrawalId, WithdrawalStatus};
use parking_lot::RwLock;

/// Persistent table of withdrawal requests.
pub struct WithdrawalStore {
    withdrawals: RwLock<HashMap<WithdrawalId, Withdrawal>>,
}

impl WithdrawalStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            withdrawals: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, withdrawal: Withdrawal) {
        self.withdrawals.write().insert(withdrawal.id, withdrawal);
    }

    /// Fetch a withdrawal by id.
    ///
    /// # Errors
    /// Returns `WithdrawalNotFound` if no such request exists.
    pub fn get(&self, id: WithdrawalId) -> Result<Withdrawal> {
        self.withdrawals
            .read()
            .get(&id)
            .cloned()
            .ok_or(BrokerError::WithdrawalNotFound(id))
    }

    /// Mark a pending withdrawal completed. Returns the updated record.
    ///
    /// # Errors
    /// - `WithdrawalNotFound` if no such request exists.
    /// - `WithdrawalAlreadyProcessed` if it is not pending; the record is
    ///   unchanged.
    pub fn mark_completed(&self, id: WithdrawalId) -> Result<Withdrawal> {
        let mut withdrawals = self.withdrawals.write();
        let withdrawal = withdrawals
            .get_mut(&id)
            .ok_or(BrokerError::WithdrawalNotFound(id))?;
        if withdrawal.status != WithdrawalStatus::Pending {
            return Err(BrokerError::WithdrawalAlreadyProcessed(id));
        }
        withdrawal.status = WithdrawalStatus::Completed;
        withdrawal.completed_at = Some(Utc::now());
        Ok(withdrawal.clone())
    }

    /// Pending requests, oldest first (admin work queue).
    #[must_use]
    pub fn pending(&self, limit: usize) -> Vec<Withdrawal> {
        let mut pending: Vec<Withdrawal> = self
            .withdrawals
            .read()
            .values()
            .filter(|w| w.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|w| w.created_at);
        pending.truncate(limit);
        pending
    }
}

impl Default for WithdrawalStore {
    fn default() -> Self {
        Self::new()
    }
}
