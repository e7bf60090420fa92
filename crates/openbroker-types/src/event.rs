//! Notification events emitted by core operations.
//!
//! The core never sends messages itself. Every mutating operation returns
//! the [`Notification`]s it produced; the embedding chat surface is
//! responsible for delivery (and for tolerating blocked recipients).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, ProofRef, TradeId, WithdrawalId};

/// A message the embedding surface should deliver to one recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: AccountId,
    pub payload: NotificationPayload,
}

impl Notification {
    #[must_use]
    pub fn new(recipient: AccountId, payload: NotificationPayload) -> Self {
        Self { recipient, payload }
    }
}

/// Typed payloads for every domain event the core emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NotificationPayload {
    /// To the buyer: payment went through, upload proof next.
    PaymentConfirmed {
        trade_id: TradeId,
        cash_amount: Decimal,
    },
    /// To the seller: a paid trade awaits delivery.
    PaymentReceived {
        trade_id: TradeId,
        buyer: AccountId,
        cash_amount: Decimal,
        delivery_target: String,
    },
    /// To admins: payment confirmed on a trade (monitoring feed).
    PaymentAlert {
        trade_id: TradeId,
        cash_amount: Decimal,
        unit_amount: u64,
        coupon_code: Option<String>,
    },
    /// To the buyer: the gateway reported a terminal non-success status.
    TradeCancelled {
        trade_id: TradeId,
        gateway_status: String,
    },
    /// To the seller: the buyer attached proof of payment.
    ProofSubmitted {
        trade_id: TradeId,
        buyer: AccountId,
        proof: ProofRef,
    },
    /// To the buyer (and admins): the seller confirmed delivery.
    DeliveryConfirmed { trade_id: TradeId },
    /// To the seller and admins: the buyer opened a dispute.
    DisputeOpened {
        trade_id: TradeId,
        opened_by: AccountId,
        reason: String,
    },
    /// To both parties: an arbiter recorded a resolution.
    DisputeResolved {
        trade_id: TradeId,
        winner: AccountId,
    },
    /// To the seller: a new review came in.
    ReviewReceived { trade_id: TradeId, rating: u8 },
    /// To admins: a withdrawal awaits manual payout.
    WithdrawalRequested {
        withdrawal_id: WithdrawalId,
        account: AccountId,
        amount: Decimal,
    },
    /// To the requesting account: the payout was made.
    WithdrawalCompleted {
        withdrawal_id: WithdrawalId,
        amount: Decimal,
    },
}
