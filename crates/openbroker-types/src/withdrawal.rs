//! Withdrawal requests against the cash ledger.
//!
//! A withdrawal is created only after the requested amount has been
//! atomically debited from the account's committed balance. Payout itself
//! is manual: an admin marks the request completed once funds are sent.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, WithdrawalId};

/// Processing status of a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    /// Debited and waiting for manual payout.
    Pending,
    /// Paid out by an admin.
    Completed,
}

impl std::fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// A single withdrawal request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: WithdrawalId,
    pub account: AccountId,
    /// Cash amount, already debited from the ledger.
    pub amount: Decimal,
    /// Payout method chosen by the user.
    pub method: String,
    /// Destination details (card / phone number / wallet).
    pub details: String,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
    /// Set when an admin completes the payout.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Withdrawal {
    #[must_use]
    pub fn new(
        account: AccountId,
        amount: Decimal,
        method: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: WithdrawalId::new(),
            account,
            amount,
            method: method.into(),
            details: details.into(),
            status: WithdrawalStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == WithdrawalStatus::Pending
    }
}

impl std::fmt::Display for Withdrawal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Withdrawal[{}] {} {} ({})",
            self.id, self.account, self.amount, self.status,
        )
    }
}
