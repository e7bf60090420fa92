//! Configuration for an OpenBroker deployment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Static configuration the engine is constructed with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Accounts with arbiter/admin privileges.
    pub admins: Vec<AccountId>,
    /// Minimum cash amount per withdrawal request.
    pub min_withdraw: Decimal,
}

impl BrokerConfig {
    #[must_use]
    pub fn new(admins: Vec<AccountId>, min_withdraw: Decimal) -> Self {
        Self {
            admins,
            min_withdraw,
        }
    }

    /// Whether `account` holds arbiter/admin privileges.
    #[must_use]
    pub fn is_admin(&self, account: AccountId) -> bool {
        self.admins.contains(&account)
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            admins: Vec::new(),
            min_withdraw: Decimal::new(100_00, 2), // 100.00
        }
    }
}
