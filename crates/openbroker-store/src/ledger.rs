//! The cash ledger — authoritative, concurrency-safe account balances.
//!
//! All mutations go through atomic read-modify-write operations serialized
//! per account. A debit observes the current committed balance inside its
//! critical section, never a snapshot a caller captured earlier. Balances
//! never go negative.

use std::collections::HashMap;

use openbroker_types::{AccountId, BrokerError, Result};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::keyed_mutex::KeyedMutex;

/// Persistent mapping of account -> cash balance.
pub struct LedgerStore {
    balances: RwLock<HashMap<AccountId, Decimal>>,
    /// Serializes read-modify-write per account. Distinct accounts mutate
    /// in parallel.
    locks: KeyedMutex<AccountId>,
}

impl LedgerStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            locks: KeyedMutex::new(),
        }
    }

    /// The committed balance for an account (zero if never credited).
    #[must_use]
    pub fn balance(&self, account: AccountId) -> Decimal {
        self.balances
            .read()
            .get(&account)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Add `amount` to the account's balance. Returns the new balance.
    ///
    /// # Errors
    /// Returns `NonPositiveAmount` if `amount` is zero or negative.
    pub fn credit(&self, account: AccountId, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(BrokerError::NonPositiveAmount);
        }
        Ok(self.locks.with_lock(&account, || {
            let mut balances = self.balances.write();
            let entry = balances.entry(account).or_insert(Decimal::ZERO);
            *entry += amount;
            *entry
        }))
    }

    /// Subtract `amount` from the account's balance. Returns the new
    /// balance. The balance is read inside the critical section, so two
    /// concurrent debits can never both succeed against funds that only
    /// cover one of them.
    ///
    /// # Errors
    /// - `NonPositiveAmount` if `amount` is zero or negative.
    /// - `InsufficientFunds` if the committed balance is below `amount`;
    ///   the balance is unchanged.
    pub fn debit(&self, account: AccountId, amount: Decimal) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(BrokerError::NonPositiveAmount);
        }
        self.locks.with_lock(&account, || {
            let mut balances = self.balances.write();
            let entry = balances.entry(account).or_insert(Decimal::ZERO);
            if *entry < amount {
                return Err(BrokerError::InsufficientFunds {
                    requested: amount,
                    available: *entry,
                });
            }
            *entry -= amount;
            Ok(*entry)
        })
    }

    /// Overwrite an account's balance (admin operation). Runs behind the
    /// same per-account lock as debit/credit.
    ///
    /// # Errors
    /// Returns `NegativeBalance` if `value` is negative.
    pub fn set_balance(&self, account: AccountId, value: Decimal) -> Result<Decimal> {
        if value < Decimal::ZERO {
            return Err(BrokerError::NegativeBalance);
        }
        Ok(self.locks.with_lock(&account, || {
            self.balances.write().insert(account, value);
            value
        }))
    }

    /// Sum of all balances — useful for reconciliation checks in tests
    /// and monitoring.
    #[must_use]
    pub fn total_cash(&self) -> Decimal {
        self.balances.read().values().copied().sum()
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}
