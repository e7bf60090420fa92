//! The account store.

use std::collections::HashMap;

use openbroker_types::{Account, AccountId, BrokerError, CouponId, Result};
use parking_lot::RwLock;

/// Persistent table of user accounts.
pub struct AccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl AccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Register an account if it does not exist yet; returns the stored
    /// record either way.
    pub fn create_if_missing(&self, id: AccountId, username: &str) -> Account {
        let mut accounts = self.accounts.write();
        accounts
            .entry(id)
            .or_insert_with(|| Account::new(id, username))
            .clone()
    }

    /// Fetch an account by id.
    ///
    /// # Errors
    /// Returns `AccountNotFound` if the account was never registered.
    pub fn get(&self, id: AccountId) -> Result<Account> {
        self.accounts
            .read()
            .get(&id)
            .cloned()
            .ok_or(BrokerError::AccountNotFound(id))
    }

    /// The account's currently selected coupon, if any.
    #[must_use]
    pub fn active_coupon(&self, id: AccountId) -> Option<CouponId> {
        self.accounts.read().get(&id).and_then(|a| a.active_coupon)
    }

    /// Set or clear the active coupon selection. Returns the previous
    /// selection. Replacing a selection does not consume the old coupon.
    ///
    /// # Errors
    /// Returns `AccountNotFound` if the account was never registered.
    pub fn set_active_coupon(
        &self,
        id: AccountId,
        coupon: Option<CouponId>,
    ) -> Result<Option<CouponId>> {
        let mut accounts = self.accounts.write();
        let account = accounts.get_mut(&id).ok_or(BrokerError::AccountNotFound(id))?;
        Ok(std::mem::replace(&mut account.active_coupon, coupon))
    }

    /// Number of registered accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}
