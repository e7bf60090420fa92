//! The payment-confirmation reconciler.
//!
//! Two independent callers can report the same payment event: the
//! gateway's asynchronous webhook and a user-triggered status poll. Both
//! funnel into [`BrokerEngine::confirm_payment`], which is idempotent: the
//! status guard runs inside the trade's critical section, so exactly one
//! caller performs the transition and its side effects (coupon commit,
//! notifications); every later or concurrent duplicate observes a status
//! past `AwaitingPayment` and returns success without side effects.

use openbroker_types::{
    BrokerError, Notification, NotificationPayload, PaymentStatus, Result, Trade, TradeId,
    TradeStatus,
};

use crate::engine::BrokerEngine;

/// What a confirmation attempt did.
#[derive(Debug)]
pub enum PaymentOutcome {
    /// This call performed the transition to `PaidAwaitingProof`.
    Confirmed {
        trade: Trade,
        notifications: Vec<Notification>,
    },
    /// The trade was already past `AwaitingPayment`; nothing happened.
    AlreadyConfirmed { trade: Trade },
    /// The gateway still reports the payment in flight; safe to retry.
    StillPending { trade: Trade },
    /// The gateway reported a terminal non-success status; the trade was
    /// cancelled.
    Cancelled {
        trade: Trade,
        notifications: Vec<Notification>,
    },
}

impl BrokerEngine {
    /// Apply a gateway-reported payment status to a trade, exactly once.
    ///
    /// Safe to call any number of times with any interleaving of webhook
    /// and poll callers. `Pending` never transitions; `Succeeded` drives
    /// `awaiting_payment -> paid_awaiting_proof` plus coupon commit; any
    /// other status cancels the trade.
    ///
    /// # Errors
    /// Returns `TradeNotFound` for unknown trades. Never fails on
    /// duplicates.
    pub fn confirm_payment(
        &self,
        trade_id: TradeId,
        status: PaymentStatus,
    ) -> Result<PaymentOutcome> {
        let outcome = self.trade_locks.with_lock(&trade_id, || {
            let trade = self.trades.get(trade_id)?;
            if trade.status.is_past_payment() {
                tracing::debug!(
                    %trade_id,
                    status = %trade.status,
                    "duplicate payment signal ignored"
                );
                return Ok(PaymentOutcome::AlreadyConfirmed { trade });
            }

            match status {
                PaymentStatus::Pending => Ok(PaymentOutcome::StillPending { trade }),
                PaymentStatus::Succeeded => self.apply_success(trade_id),
                PaymentStatus::Failed | PaymentStatus::Other(_) => {
                    self.apply_cancellation(trade_id, &status)
                }
            }
        })?;

        if matches!(outcome, PaymentOutcome::Cancelled { .. }) {
            self.trade_locks.discard(&trade_id);
        }
        Ok(outcome)
    }

    /// Pull path: query the gateway for the trade's payment status and
    /// funnel the answer into [`BrokerEngine::confirm_payment`].
    ///
    /// The gateway call happens outside the trade's critical section so a
    /// slow provider never blocks the webhook path.
    ///
    /// # Errors
    /// - `MissingPaymentRef` if the trade never minted a payment
    /// - gateway errors pass through with trade state unchanged
    pub fn poll_payment(&self, trade_id: TradeId) -> Result<PaymentOutcome> {
        let trade = self.trades.get(trade_id)?;
        if trade.status.is_past_payment() {
            return Ok(PaymentOutcome::AlreadyConfirmed { trade });
        }
        let payment_ref = trade
            .payment_ref
            .clone()
            .ok_or(BrokerError::MissingPaymentRef(trade_id))?;
        let status = self.gateway.payment_status(&payment_ref)?;
        self.confirm_payment(trade_id, status)
    }

    /// Runs inside the trade's critical section with status known to be
    /// `AwaitingPayment`.
    fn apply_success(&self, trade_id: TradeId) -> Result<PaymentOutcome> {
        let (trade, ()) = self.trades.update(trade_id, |t| {
            t.status = TradeStatus::PaidAwaitingProof;
            Ok(())
        })?;

        if let Some(binding) = trade.coupon.clone() {
            self.commit_coupon_use(&binding, trade.buyer, trade_id);
        }

        self.audit.append(
            trade.buyer,
            "TRADE_PAID",
            format!("trade={} cash={}", trade_id, trade.cash_amount),
        );
        tracing::info!(%trade_id, cash = %trade.cash_amount, "payment confirmed");

        let mut notifications = vec![
            Notification::new(
                trade.buyer,
                NotificationPayload::PaymentConfirmed {
                    trade_id,
                    cash_amount: trade.cash_amount,
                },
            ),
            Notification::new(
                trade.seller,
                NotificationPayload::PaymentReceived {
                    trade_id,
                    buyer: trade.buyer,
                    cash_amount: trade.cash_amount,
                    delivery_target: trade.delivery_target.as_str().to_string(),
                },
            ),
        ];
        notifications.extend(self.notify_admins(&NotificationPayload::PaymentAlert {
            trade_id,
            cash_amount: trade.cash_amount,
            unit_amount: trade.unit_amount,
            coupon_code: trade.coupon.as_ref().map(|b| b.code.clone()),
        }));

        Ok(PaymentOutcome::Confirmed {
            trade,
            notifications,
        })
    }

    /// Runs inside the trade's critical section with status known to be
    /// `AwaitingPayment`.
    fn apply_cancellation(
        &self,
        trade_id: TradeId,
        status: &PaymentStatus,
    ) -> Result<PaymentOutcome> {
        let gateway_status = status.to_string();
        let (trade, ()) = self.trades.update(trade_id, |t| {
            t.status = TradeStatus::Cancelled;
            Ok(())
        })?;

        self.audit.append(
            trade.buyer,
            "TRADE_CANCELLED",
            format!("trade={trade_id} gateway_status={gateway_status}"),
        );
        tracing::info!(%trade_id, %gateway_status, "trade cancelled by gateway status");

        let notifications = vec![Notification::new(
            trade.buyer,
            NotificationPayload::TradeCancelled {
                trade_id,
                gateway_status,
            },
        )];
        Ok(PaymentOutcome::Cancelled {
            trade,
            notifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use openbroker_types::{
        AccountId, BrokerConfig, Coupon, DeliveryTarget, DiscountKind, Listing, ListingId,
    };
    use rust_decimal::Decimal;

    use crate::gateway::StubGateway;
    use crate::lifecycle::TradeTicket;

    use super::*;

    struct Fixture {
        engine: BrokerEngine,
        gateway: Arc<StubGateway>,
        buyer: AccountId,
        listing_id: ListingId,
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(StubGateway::new());
        let engine = BrokerEngine::new(BrokerConfig::default(), Arc::clone(&gateway) as _);
        let buyer = AccountId::new();
        let seller = AccountId::new();
        engine.register_account(buyer, "buyer");
        engine.register_account(seller, "seller");
        let listing = Listing::new(seller, "t", Decimal::new(5, 1), 1, 0, "bank", "");
        let listing_id = listing.id;
        engine.listings.insert(listing);
        Fixture {
            engine,
            gateway,
            buyer,
            listing_id,
        }
    }

    fn open_trade(fx: &Fixture, units: u64) -> TradeTicket {
        fx.engine
            .create_trade(fx.buyer, fx.listing_id, units, DeliveryTarget::new("tgt"))
            .unwrap()
    }

    #[test]
    fn succeeded_transitions_once() {
        let fx = fixture();
        let ticket = open_trade(&fx, 1000);
        let trade_id = ticket.trade.id;

        let first = fx
            .engine
            .confirm_payment(trade_id, PaymentStatus::Succeeded)
            .unwrap();
        assert!(matches!(first, PaymentOutcome::Confirmed { .. }));

        let second = fx
            .engine
            .confirm_payment(trade_id, PaymentStatus::Succeeded)
            .unwrap();
        assert!(matches!(second, PaymentOutcome::AlreadyConfirmed { .. }));

        let stored = fx.engine.trade(trade_id).unwrap();
        assert_eq!(stored.status, TradeStatus::PaidAwaitingProof);
    }

    #[test]
    fn pending_never_transitions() {
        let fx = fixture();
        let ticket = open_trade(&fx, 1000);
        let trade_id = ticket.trade.id;

        for _ in 0..3 {
            let outcome = fx
                .engine
                .confirm_payment(trade_id, PaymentStatus::Pending)
                .unwrap();
            assert!(matches!(outcome, PaymentOutcome::StillPending { .. }));
        }
        assert_eq!(
            fx.engine.trade(trade_id).unwrap().status,
            TradeStatus::AwaitingPayment
        );
    }

    #[test]
    fn terminal_failure_cancels() {
        let fx = fixture();
        let ticket = open_trade(&fx, 1000);
        let trade_id = ticket.trade.id;

        let outcome = fx
            .engine
            .confirm_payment(trade_id, PaymentStatus::Other("canceled".into()))
            .unwrap();
        let PaymentOutcome::Cancelled {
            trade,
            notifications,
        } = outcome
        else {
            panic!("expected cancellation");
        };
        assert_eq!(trade.status, TradeStatus::Cancelled);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].recipient, fx.buyer);

        // A late success signal on the cancelled trade is a no-op.
        let late = fx
            .engine
            .confirm_payment(trade_id, PaymentStatus::Succeeded)
            .unwrap();
        assert!(matches!(late, PaymentOutcome::AlreadyConfirmed { .. }));
        assert_eq!(
            fx.engine.trade(trade_id).unwrap().status,
            TradeStatus::Cancelled
        );
    }

    #[test]
    fn poll_path_funnels_into_confirm() {
        let fx = fixture();
        let ticket = open_trade(&fx, 1000);
        let trade_id = ticket.trade.id;
        let payment_ref = ticket.trade.payment_ref.clone().unwrap();

        // Still pending at the gateway.
        let outcome = fx.engine.poll_payment(trade_id).unwrap();
        assert!(matches!(outcome, PaymentOutcome::StillPending { .. }));

        fx.gateway.set_status(&payment_ref, PaymentStatus::Succeeded);
        let outcome = fx.engine.poll_payment(trade_id).unwrap();
        assert!(matches!(outcome, PaymentOutcome::Confirmed { .. }));

        // Duplicate poll after the webhook/poll already landed.
        let outcome = fx.engine.poll_payment(trade_id).unwrap();
        assert!(matches!(outcome, PaymentOutcome::AlreadyConfirmed { .. }));
    }

    #[test]
    fn gateway_outage_leaves_state_unchanged() {
        let fx = fixture();
        let ticket = open_trade(&fx, 1000);
        let trade_id = ticket.trade.id;

        fx.gateway.set_status_failure(true);
        let err = fx.engine.poll_payment(trade_id).unwrap_err();
        assert!(matches!(err, BrokerError::GatewayUnavailable { .. }));
        assert_eq!(
            fx.engine.trade(trade_id).unwrap().status,
            TradeStatus::AwaitingPayment
        );

        // Retry after the outage clears.
        fx.gateway.set_status_failure(false);
        let payment_ref = ticket.trade.payment_ref.clone().unwrap();
        fx.gateway.set_status(&payment_ref, PaymentStatus::Succeeded);
        assert!(matches!(
            fx.engine.poll_payment(trade_id).unwrap(),
            PaymentOutcome::Confirmed { .. }
        ));
    }

    #[test]
    fn duplicate_confirmation_commits_coupon_once() {
        let fx = fixture();
        let coupon_id = fx
            .engine
            .coupons
            .insert(Coupon::new("SAVE10", DiscountKind::Percent, Decimal::TEN, 0, 0))
            .unwrap();
        fx.engine.activate_coupon(fx.buyer, "SAVE10").unwrap();

        let ticket = open_trade(&fx, 1000);
        let trade_id = ticket.trade.id;
        assert_eq!(ticket.trade.cash_amount, Decimal::new(450, 0));

        fx.engine
            .confirm_payment(trade_id, PaymentStatus::Succeeded)
            .unwrap();
        fx.engine
            .confirm_payment(trade_id, PaymentStatus::Succeeded)
            .unwrap();

        assert_eq!(fx.engine.coupons.use_count(coupon_id), 1);
        assert_eq!(fx.engine.accounts.active_coupon(fx.buyer), None);
    }

    #[test]
    fn unknown_trade_is_integrity_error() {
        let fx = fixture();
        let err = fx
            .engine
            .confirm_payment(TradeId::new(), PaymentStatus::Succeeded)
            .unwrap_err();
        assert!(matches!(err, BrokerError::TradeNotFound(_)));
    }
}
