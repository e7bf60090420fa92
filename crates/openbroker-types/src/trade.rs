//! The trade record and its lifecycle status.
//!
//! A [`Trade`] is one buyer/seller exchange of virtual-currency units for
//! cash. Its terms (parties, amounts, rate, delivery target) are fixed at
//! creation; only the status and the lifecycle attachments (payment ref,
//! proof, dispute fields) mutate afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, CouponBinding, DeliveryTarget, ListingId, PaymentRef, ProofRef, TradeId};

/// Lifecycle status of a trade.
///
/// ```text
/// created -> awaiting_payment -> paid_awaiting_proof -> proof_submitted
///            |                                           |          |
///            v                                           v          v
///        cancelled                                  disputed -> completed
///                                                       |
///                                                       v
///                                                   resolved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum TradeStatus {
    Created,
    AwaitingPayment,
    PaidAwaitingProof,
    ProofSubmitted,
    Completed,
    Disputed,
    Resolved,
    Cancelled,
}

impl TradeStatus {
    /// Whether the trade can still accept a payment confirmation.
    ///
    /// Everything past `AwaitingPayment` treats a duplicate confirmation
    /// signal as a no-op rather than an error.
    #[must_use]
    pub fn accepts_payment(self) -> bool {
        self == Self::AwaitingPayment
    }

    /// Whether the status is past the payment boundary (payment was
    /// confirmed at some point, or the trade ended without one).
    #[must_use]
    pub fn is_past_payment(self) -> bool {
        !matches!(self, Self::Created | Self::AwaitingPayment)
    }

    /// Terminal statuses: no further transition exists.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Resolved | Self::Cancelled)
    }

    /// Statuses from which the buyer may open a dispute.
    #[must_use]
    pub fn allows_dispute(self) -> bool {
        matches!(self, Self::PaidAwaitingProof | Self::ProofSubmitted)
    }

    /// Statuses from which the seller may confirm delivery. Confirming
    /// while disputed closes the dispute implicitly in the seller's favour.
    #[must_use]
    pub fn allows_delivery_confirmation(self) -> bool {
        matches!(self, Self::ProofSubmitted | Self::Disputed)
    }
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::AwaitingPayment => write!(f, "AWAITING_PAYMENT"),
            Self::PaidAwaitingProof => write!(f, "PAID_AWAITING_PROOF"),
            Self::ProofSubmitted => write!(f, "PROOF_SUBMITTED"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Disputed => write!(f, "DISPUTED"),
            Self::Resolved => write!(f, "RESOLVED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A single P2P trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Globally unique trade identifier.
    pub id: TradeId,
    /// The buying account.
    pub buyer: AccountId,
    /// The selling account (the listing owner at creation time).
    pub seller: AccountId,
    /// The listing this trade was instantiated from. The rate below was
    /// copied by value; later listing edits never affect this trade.
    pub listing_id: ListingId,
    /// Units of virtual currency purchased.
    pub unit_amount: u64,
    /// Cash per unit, copied from the listing at creation.
    pub rate: Decimal,
    /// Discount subtracted from the base cash amount. Zero if no coupon
    /// applied.
    pub discount: Decimal,
    /// Final payable cash amount: `max(0, rate * unit_amount - discount)`.
    pub cash_amount: Decimal,
    /// Where the seller delivers the units.
    pub delivery_target: DeliveryTarget,
    /// Gateway payment reference, set once the payment is minted.
    pub payment_ref: Option<PaymentRef>,
    /// Coupon tentatively bound at creation; recorded as used only on
    /// confirmed payment.
    pub coupon: Option<CouponBinding>,
    /// Buyer-submitted proof of payment.
    pub proof: Option<ProofRef>,
    /// Reason given by the buyer when opening a dispute.
    pub dispute_reason: Option<String>,
    /// The arbiter who resolved the dispute.
    pub arbiter: Option<AccountId>,
    /// The party the arbitration ruled in favour of.
    pub dispute_winner: Option<AccountId>,
    /// When the dispute was resolved.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Current lifecycle status.
    pub status: TradeStatus,
    /// When the trade was created.
    pub created_at: DateTime<Utc>,
}

impl Trade {
    /// Construct a new trade in `Created` status.
    ///
    /// The cash amount is derived from the terms and clamped to zero:
    /// `cash = max(0, rate * unit_amount - discount)`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        buyer: AccountId,
        seller: AccountId,
        listing_id: ListingId,
        unit_amount: u64,
        rate: Decimal,
        discount: Decimal,
        coupon: Option<CouponBinding>,
        delivery_target: DeliveryTarget,
    ) -> Self {
        let base = rate * Decimal::from(unit_amount);
        let cash_amount = (base - discount).max(Decimal::ZERO);
        Self {
            id: TradeId::new(),
            buyer,
            seller,
            listing_id,
            unit_amount,
            rate,
            discount,
            cash_amount,
            delivery_target,
            payment_ref: None,
            coupon,
            proof: None,
            dispute_reason: None,
            arbiter: None,
            dispute_winner: None,
            resolved_at: None,
            status: TradeStatus::Created,
            created_at: Utc::now(),
        }
    }

    /// Attach the gateway payment reference and move to `AwaitingPayment`.
    pub fn attach_payment(&mut self, payment_ref: PaymentRef) {
        self.payment_ref = Some(payment_ref);
        self.status = TradeStatus::AwaitingPayment;
    }

    #[must_use]
    pub fn is_buyer(&self, account: AccountId) -> bool {
        self.buyer == account
    }

    #[must_use]
    pub fn is_seller(&self, account: AccountId) -> bool {
        self.seller == account
    }

    #[must_use]
    pub fn is_party(&self, account: AccountId) -> bool {
        self.is_buyer(account) || self.is_seller(account)
    }

    /// Base cash amount before any discount.
    #[must_use]
    pub fn base_cash(&self) -> Decimal {
        self.rate * Decimal::from(self.unit_amount)
    }

    /// Whether the stored amounts still satisfy the pricing invariant.
    #[must_use]
    pub fn terms_consistent(&self) -> bool {
        self.discount >= Decimal::ZERO
            && self.cash_amount >= Decimal::ZERO
            && self.cash_amount == (self.base_cash() - self.discount).max(Decimal::ZERO)
    }
}

impl std::fmt::Display for Trade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade[{}] {} units @ {} = {} ({})",
            self.id, self.unit_amount, self.rate, self.cash_amount, self.status,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_trade(discount: Decimal) -> Trade {
        Trade::new(
            AccountId::new(),
            AccountId::new(),
            ListingId::new(),
            1000,
            Decimal::new(5, 1), // 0.5
            discount,
            None,
            DeliveryTarget::new("https://example.com/profile/42"),
        )
    }

    #[test]
    fn cash_amount_is_rate_times_units() {
        let trade = make_trade(Decimal::ZERO);
        assert_eq!(trade.cash_amount, Decimal::new(500, 0));
        assert_eq!(trade.base_cash(), Decimal::new(500, 0));
        assert!(trade.terms_consistent());
    }

    #[test]
    fn discount_reduces_cash_amount() {
        let trade = make_trade(Decimal::new(50, 0));
        assert_eq!(trade.cash_amount, Decimal::new(450, 0));
        assert!(trade.terms_consistent());
    }

    #[test]
    fn cash_amount_clamps_to_zero() {
        let trade = make_trade(Decimal::new(10_000, 0));
        assert_eq!(trade.cash_amount, Decimal::ZERO);
        assert!(trade.terms_consistent());
    }

    #[test]
    fn attach_payment_moves_to_awaiting() {
        let mut trade = make_trade(Decimal::ZERO);
        assert_eq!(trade.status, TradeStatus::Created);
        trade.attach_payment(PaymentRef::new("p-1"));
        assert_eq!(trade.status, TradeStatus::AwaitingPayment);
        assert!(trade.payment_ref.is_some());
    }

    #[test]
    fn status_predicates() {
        assert!(TradeStatus::AwaitingPayment.accepts_payment());
        assert!(!TradeStatus::PaidAwaitingProof.accepts_payment());
        assert!(TradeStatus::PaidAwaitingProof.is_past_payment());
        assert!(TradeStatus::Cancelled.is_terminal());
        assert!(TradeStatus::Resolved.is_terminal());
        assert!(!TradeStatus::Disputed.is_terminal());
        assert!(TradeStatus::ProofSubmitted.allows_dispute());
        assert!(!TradeStatus::Completed.allows_dispute());
        assert!(TradeStatus::Disputed.allows_delivery_confirmation());
        assert!(!TradeStatus::PaidAwaitingProof.allows_delivery_confirmation());
    }

    #[test]
    fn status_display_is_screaming_snake() {
        assert_eq!(
            format!("{}", TradeStatus::PaidAwaitingProof),
            "PAID_AWAITING_PROOF"
        );
        assert_eq!(format!("{}", TradeStatus::AwaitingPayment), "AWAITING_PAYMENT");
    }

    #[test]
    fn party_checks() {
        let trade = make_trade(Decimal::ZERO);
        assert!(trade.is_buyer(trade.buyer));
        assert!(trade.is_seller(trade.seller));
        assert!(!trade.is_buyer(trade.seller));
        assert!(!trade.is_party(AccountId::new()));
    }

    #[test]
    fn trade_serde_roundtrip() {
        let trade = make_trade(Decimal::new(25, 0));
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade.id, back.id);
        assert_eq!(trade.cash_amount, back.cash_amount);
        assert_eq!(trade.status, back.status);
    }
}
