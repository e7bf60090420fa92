//! The dispute arbiter interface.
//!
//! A dispute freezes the trade until either the seller delivers anyway
//! (implicit close, see the lifecycle module) or an arbiter records a
//! resolution. Resolution is purely a record: the paid funds already left
//! the gateway account before the state machine observed them, so
//! settlement is an explicit out-of-band action by the arbiter — this
//! component never touches the ledger.

use chrono::Utc;
use openbroker_types::{
    AccountId, BrokerError, Notification, NotificationPayload, Result, Trade, TradeId, TradeStatus,
};

use crate::engine::BrokerEngine;

impl BrokerEngine {
    /// Buyer opens a dispute on a paid trade.
    ///
    /// # Errors
    /// - `NotTradeBuyer` if the caller is not this trade's buyer
    /// - `InvalidTransition` unless the trade is in `PaidAwaitingProof`
    ///   or `ProofSubmitted`
    /// - `EmptyDisputeReason` for a blank reason
    pub fn open_dispute(
        &self,
        trade_id: TradeId,
        caller: AccountId,
        reason: &str,
    ) -> Result<(Trade, Vec<Notification>)> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(BrokerError::EmptyDisputeReason);
        }

        let trade = self.trade_locks.with_lock(&trade_id, || {
            let (trade, ()) = self.trades.update(trade_id, |t| {
                if !t.is_buyer(caller) {
                    return Err(BrokerError::NotTradeBuyer(trade_id));
                }
                if !t.status.allows_dispute() {
                    return Err(BrokerError::InvalidTransition {
                        trade_id,
                        status: t.status,
                        action: "open_dispute",
                    });
                }
                t.status = TradeStatus::Disputed;
                t.dispute_reason = Some(reason.to_string());
                Ok(())
            })?;
            Ok::<_, BrokerError>(trade)
        })?;

        self.audit.append(
            caller,
            "DISPUTE_OPEN",
            format!("trade={trade_id} reason={reason}"),
        );
        tracing::warn!(%trade_id, "dispute opened");

        let payload = NotificationPayload::DisputeOpened {
            trade_id,
            opened_by: caller,
            reason: reason.to_string(),
        };
        let mut notifications = vec![Notification::new(trade.seller, payload.clone())];
        notifications.extend(self.notify_admins(&payload));
        Ok((trade, notifications))
    }

    /// Arbiter records a binding dispute outcome.
    ///
    /// Transitions `disputed -> resolved` and stores the winner and
    /// arbiter. Deliberately moves no money: ledger balances are
    /// untouched and any repayment is an explicit follow-up action.
    ///
    /// # Errors
    /// - `NotArbiter` for non-admin callers
    /// - `WinnerNotParty` if the winner is neither buyer nor seller
    /// - `InvalidTransition` unless the trade is in `Disputed`
    pub fn resolve_dispute(
        &self,
        trade_id: TradeId,
        winner: AccountId,
        arbiter: AccountId,
    ) -> Result<(Trade, Vec<Notification>)> {
        self.ensure_admin(arbiter)?;

        let trade = self.trade_locks.with_lock(&trade_id, || {
            let (trade, ()) = self.trades.update(trade_id, |t| {
                if t.status != TradeStatus::Disputed {
                    return Err(BrokerError::InvalidTransition {
                        trade_id,
                        status: t.status,
                        action: "resolve_dispute",
                    });
                }
                if !t.is_party(winner) {
                    return Err(BrokerError::WinnerNotParty { winner, trade_id });
                }
                t.status = TradeStatus::Resolved;
                t.arbiter = Some(arbiter);
                t.dispute_winner = Some(winner);
                t.resolved_at = Some(Utc::now());
                Ok(())
            })?;
            Ok::<_, BrokerError>(trade)
        })?;
        self.trade_locks.discard(&trade_id);

        self.audit.append(
            arbiter,
            "DISPUTE_RESOLVE",
            format!("trade={trade_id} winner={winner}"),
        );
        tracing::info!(%trade_id, %winner, "dispute resolved");

        let payload = NotificationPayload::DisputeResolved { trade_id, winner };
        let notifications = vec![
            Notification::new(trade.buyer, payload.clone()),
            Notification::new(trade.seller, payload),
        ];
        Ok((trade, notifications))
    }

    /// The arbiter work queue: all open disputes, oldest first.
    ///
    /// # Errors
    /// Returns `NotArbiter` for non-admin callers.
    pub fn open_disputes(&self, caller: AccountId) -> Result<Vec<Trade>> {
        self.ensure_admin(caller)?;
        Ok(self.trades.open_disputes())
    }
}
