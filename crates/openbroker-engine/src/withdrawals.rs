//! Withdrawal requests against the cash ledger.
//!
//! The debit observes the current committed balance inside the ledger's
//! per-account critical section — never a balance captured earlier in a
//! multi-step conversation, since user-reported intermediate state is
//! untrusted. Payout itself is manual: an admin completes the request.

use openbroker_types::{
    AccountId, BrokerError, Notification, NotificationPayload, Result, Withdrawal, WithdrawalId,
};
use rust_decimal::Decimal;

use crate::engine::BrokerEngine;

impl BrokerEngine {
    /// Debit the account and record a pending withdrawal.
    ///
    /// # Errors
    /// - `NonPositiveAmount` / `WithdrawBelowMinimum` for bad amounts
    /// - `InsufficientFunds` if the committed balance is too low; the
    ///   whole request fails and the ledger is unchanged
    /// - `AccountNotFound` for unregistered callers
    pub fn request_withdrawal(
        &self,
        account: AccountId,
        amount: Decimal,
        method: &str,
        details: &str,
    ) -> Result<(Withdrawal, Vec<Notification>)> {
        self.accounts.get(account)?;
        if amount <= Decimal::ZERO {
            return Err(BrokerError::NonPositiveAmount);
        }
        if amount < self.config.min_withdraw {
            return Err(BrokerError::WithdrawBelowMinimum {
                requested: amount,
                minimum: self.config.min_withdraw,
            });
        }

        let new_balance = self.ledger.debit(account, amount)?;

        let withdrawal = Withdrawal::new(account, amount, method, details);
        self.withdrawals.insert(withdrawal.clone());

        self.audit.append(
            account,
            "WITHDRAW_REQUEST",
            format!(
                "withdrawal={} amount={} balance={}",
                withdrawal.id, amount, new_balance
            ),
        );
        tracing::info!(withdrawal_id = %withdrawal.id, %amount, "withdrawal requested");

        let notifications = self.notify_admins(&NotificationPayload::WithdrawalRequested {
            withdrawal_id: withdrawal.id,
            account,
            amount,
        });
        Ok((withdrawal, notifications))
    }

    /// Admin marks a pending withdrawal as paid out.
    ///
    /// # Errors
    /// - `NotArbiter` for non-admin callers
    /// - `WithdrawalNotFound` / `WithdrawalAlreadyProcessed`
    pub fn complete_withdrawal(
        &self,
        withdrawal_id: WithdrawalId,
        admin: AccountId,
    ) -> Result<(Withdrawal, Vec<Notification>)> {
        self.ensure_admin(admin)?;
        let withdrawal = self.withdrawals.mark_completed(withdrawal_id)?;

        self.audit.append(
            admin,
            "WITHDRAW_COMPLETED",
            format!("withdrawal={} amount={}", withdrawal.id, withdrawal.amount),
        );

        let notifications = vec![Notification::new(
            withdrawal.account,
            NotificationPayload::WithdrawalCompleted {
                withdrawal_id,
                amount: withdrawal.amount,
            },
        )];
        Ok((withdrawal, notifications))
    }

    /// The admin payout queue: pending withdrawals, oldest first.
    ///
    /// # Errors
    /// Returns `NotArbiter` for non-admin callers.
    pub fn pending_withdrawals(
        &self,
        caller: AccountId,
        limit: usize,
    ) -> Result<Vec<Withdrawal>> {
        self.ensure_admin(caller)?;
        Ok(self.withdrawals.pending(limit))
    }
}
