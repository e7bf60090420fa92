//! Discount coupons and their usage records.
//!
//! A coupon is validated (active, usage remaining, per-user unused) when a
//! user activates it, tentatively bound to a trade at creation, and only
//! recorded as used once payment is confirmed — an abandoned unpaid trade
//! never burns a single-use coupon.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, CouponId, TradeId};

/// How the coupon's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountKind {
    /// `value` percent off the cash amount.
    Percent,
    /// `value` subtracted from the cash amount, capped at the amount itself.
    Fixed,
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percent => write!(f, "PERCENT"),
            Self::Fixed => write!(f, "FIXED"),
        }
    }
}

/// A discount coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    /// Unique code, stored uppercase; lookups are case-insensitive.
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    /// Global usage cap. Zero means unlimited.
    pub uses_limit: u32,
    /// Minimum unit amount a trade must reach for the discount to apply.
    pub min_amount: u64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        kind: DiscountKind,
        value: Decimal,
        uses_limit: u32,
        min_amount: u64,
    ) -> Self {
        Self {
            id: CouponId::new(),
            code: code.into().trim().to_uppercase(),
            kind,
            value,
            uses_limit,
            min_amount,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// The discount this coupon grants against a cash amount.
    ///
    /// Percentage: `cash * value / 100`. Fixed: `min(value, cash)` so the
    /// payable amount never goes negative. The minimum-amount gate is the
    /// caller's concern; this is pure arithmetic.
    #[must_use]
    pub fn discount_for(&self, cash: Decimal) -> Decimal {
        match self.kind {
            DiscountKind::Percent => cash * self.value / Decimal::new(100, 0),
            DiscountKind::Fixed => self.value.min(cash),
        }
    }

    /// Whether `unit_amount` meets this coupon's minimum.
    #[must_use]
    pub fn meets_minimum(&self, unit_amount: u64) -> bool {
        unit_amount >= self.min_amount
    }
}

impl std::fmt::Display for Coupon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Coupon[{}] {} {} {}", self.id, self.code, self.kind, self.value)
    }
}

/// The coupon tentatively bound to a trade at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponBinding {
    pub coupon_id: CouponId,
    /// Code snapshot, kept for notifications and audit even if the coupon
    /// is later edited.
    pub code: String,
}

/// A committed coupon use: at most one per (coupon, user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponUse {
    pub coupon_id: CouponId,
    pub account: AccountId,
    pub trade_id: TradeId,
    pub used_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_normalized_to_uppercase() {
        let coupon = Coupon::new(" save10 ", DiscountKind::Percent, Decimal::TEN, 0, 0);
        assert_eq!(coupon.code, "SAVE10");
    }

    #[test]
    fn percent_discount() {
        let coupon = Coupon::new("SAVE10", DiscountKind::Percent, Decimal::TEN, 0, 0);
        let discount = coupon.discount_for(Decimal::new(500, 0));
        assert_eq!(discount, Decimal::new(50, 0));
    }

    #[test]
    fn fixed_discount_capped_at_cash() {
        let coupon = Coupon::new("MINUS200", DiscountKind::Fixed, Decimal::new(200, 0), 0, 0);
        assert_eq!(
            coupon.discount_for(Decimal::new(500, 0)),
            Decimal::new(200, 0)
        );
        assert_eq!(
            coupon.discount_for(Decimal::new(150, 0)),
            Decimal::new(150, 0)
        );
    }

    #[test]
    fn minimum_amount_gate() {
        let coupon = Coupon::new("BIG", DiscountKind::Percent, Decimal::TEN, 0, 1000);
        assert!(coupon.meets_minimum(1000));
        assert!(!coupon.meets_minimum(999));
    }

    #[test]
    fn coupon_serde_roundtrip() {
        let coupon = Coupon::new("SAVE10", DiscountKind::Fixed, Decimal::new(75, 1), 3, 500);
        let json = serde_json::to_string(&coupon).unwrap();
        let back: Coupon = serde_json::from_str(&json).unwrap();
        assert_eq!(coupon.id, back.id);
        assert_eq!(coupon.code, back.code);
        assert_eq!(coupon.value, back.value);
    }
}
