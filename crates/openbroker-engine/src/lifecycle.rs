//! Trade lifecycle operations: creation, proof submission, delivery
//! confirmation.
//!
//! Payment confirmation lives in the reconciler module; dispute handling
//! in the disputes module. All transitions on an existing trade run inside
//! that trade's critical section.

use openbroker_types::{
    AccountId, BrokerError, DeliveryTarget, ListingId, Notification, NotificationPayload,
    ProofRef, Result, Trade, TradeId, TradeStatus,
};

use crate::engine::BrokerEngine;

/// What `create_trade` hands back to the surface: the persisted trade and
/// where to send the buyer to pay.
#[derive(Debug, Clone)]
pub struct TradeTicket {
    pub trade: Trade,
    pub redirect_url: String,
}

impl BrokerEngine {
    /// Create a trade against a listing and mint its external payment.
    ///
    /// The listing's rate is copied by value; the buyer's active coupon is
    /// evaluated and tentatively bound (usage commits only on confirmed
    /// payment). If the gateway rejects payment creation, nothing is
    /// persisted.
    ///
    /// # Errors
    /// - `NonPositiveAmount` / `AmountOutOfBounds` for bad amounts
    /// - `ListingInactive`, `SelfTradeBlocked`
    /// - `ListingNotFound` / `AccountNotFound` for dangling references
    /// - gateway errors pass through untouched (retry-safe: no state
    ///   changed)
    pub fn create_trade(
        &self,
        buyer: AccountId,
        listing_id: ListingId,
        unit_amount: u64,
        delivery_target: DeliveryTarget,
    ) -> Result<TradeTicket> {
        if unit_amount == 0 {
            return Err(BrokerError::NonPositiveAmount);
        }
        self.accounts.get(buyer)?;
        let listing = self.listings.get(listing_id)?;
        if !listing.active {
            return Err(BrokerError::ListingInactive(listing_id));
        }
        if listing.owner == buyer {
            return Err(BrokerError::SelfTradeBlocked);
        }
        if !listing.accepts_amount(unit_amount) {
            return Err(BrokerError::AmountOutOfBounds {
                amount: unit_amount,
                min: listing.min_amount,
                max: listing.max_amount,
            });
        }

        let base_cash = listing.rate * rust_decimal::Decimal::from(unit_amount);
        let (binding, discount) = self.evaluate_active_coupon(buyer, unit_amount, base_cash)?;

        let mut trade = Trade::new(
            buyer,
            listing.owner,
            listing_id,
            unit_amount,
            listing.rate,
            discount,
            binding,
            delivery_target,
        );

        // Fail-closed: mint the payment before persisting anything, so a
        // gateway failure leaves no half-created trade behind.
        let intent = self.gateway.create_payment(trade.cash_amount, trade.id)?;
        trade.attach_payment(intent.payment_ref.clone());
        self.trades.insert(trade.clone())?;

        self.audit.append(
            buyer,
            "TRADE_CREATE",
            format!(
                "trade={} listing={} units={} cash={} coupon={}",
                trade.id,
                listing_id,
                unit_amount,
                trade.cash_amount,
                trade.coupon.as_ref().map_or("-", |b| b.code.as_str()),
            ),
        );
        tracing::info!(trade_id = %trade.id, cash = %trade.cash_amount, "trade created");

        Ok(TradeTicket {
            trade,
            redirect_url: intent.redirect_url,
        })
    }

    /// Attach the buyer's proof of payment and move the trade to
    /// `ProofSubmitted`.
    ///
    /// # Errors
    /// - `NotTradeBuyer` if the caller is not this trade's buyer
    /// - `InvalidTransition` unless the trade is in `PaidAwaitingProof`
    pub fn submit_proof(
        &self,
        trade_id: TradeId,
        caller: AccountId,
        proof: ProofRef,
    ) -> Result<(Trade, Vec<Notification>)> {
        let trade = self.trade_locks.with_lock(&trade_id, || {
            let (trade, ()) = self.trades.update(trade_id, |t| {
                if !t.is_buyer(caller) {
                    return Err(BrokerError::NotTradeBuyer(trade_id));
                }
                if t.status != TradeStatus::PaidAwaitingProof {
                    return Err(BrokerError::InvalidTransition {
                        trade_id,
                        status: t.status,
                        action: "submit_proof",
                    });
                }
                t.proof = Some(proof.clone());
                t.status = TradeStatus::ProofSubmitted;
                Ok(())
            })?;
            Ok::<_, BrokerError>(trade)
        })?;

        self.audit.append(
            caller,
            "PROOF_SUBMITTED",
            format!("trade={trade_id} proof={proof}"),
        );

        let notifications = vec![Notification::new(
            trade.seller,
            NotificationPayload::ProofSubmitted {
                trade_id,
                buyer: trade.buyer,
                proof,
            },
        )];
        Ok((trade, notifications))
    }

    /// Seller confirms the units were delivered; the trade completes.
    ///
    /// Valid from `ProofSubmitted` and also from `Disputed`: delivering
    /// while a dispute is pending closes the dispute implicitly in the
    /// seller's favour.
    ///
    /// # Errors
    /// - `NotTradeSeller` if the caller is not this trade's seller
    /// - `InvalidTransition` from any other status
    pub fn confirm_delivery(
        &self,
        trade_id: TradeId,
        caller: AccountId,
    ) -> Result<(Trade, Vec<Notification>)> {
        let (trade, was_disputed) = self.trade_locks.with_lock(&trade_id, || {
            self.trades.update(trade_id, |t| {
                if !t.is_seller(caller) {
                    return Err(BrokerError::NotTradeSeller(trade_id));
                }
                if !t.status.allows_delivery_confirmation() {
                    return Err(BrokerError::InvalidTransition {
                        trade_id,
                        status: t.status,
                        action: "confirm_delivery",
                    });
                }
                let was_disputed = t.status == TradeStatus::Disputed;
                t.status = TradeStatus::Completed;
                Ok(was_disputed)
            })
        })?;
        self.trade_locks.discard(&trade_id);

        self.audit.append(
            caller,
            "TRADE_COMPLETED",
            if was_disputed {
                format!("trade={trade_id} dispute closed by delivery")
            } else {
                format!("trade={trade_id}")
            },
        );
        tracing::info!(%trade_id, was_disputed, "delivery confirmed");

        let payload = NotificationPayload::DeliveryConfirmed { trade_id };
        let mut notifications = vec![Notification::new(trade.buyer, payload.clone())];
        notifications.extend(self.notify_admins(&payload));
        Ok((trade, notifications))
    }
}
