//! User accounts.
//!
//! Cash balances live in the ledger store, not here; the account record
//! only carries identity and the single active coupon selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, CouponId};

/// A registered user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Display name from the chat surface.
    pub username: String,
    /// At most one coupon may be selected at a time; selecting a new one
    /// silently replaces the previous selection without consuming it.
    pub active_coupon: Option<CouponId>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    #[must_use]
    pub fn new(id: AccountId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            active_coupon: None,
            created_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Account[{}] {}", self.id, self.username)
    }
}
