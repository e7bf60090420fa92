//! Post-trade reviews left by buyers about sellers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, ReviewId, TradeId};

/// A single review. At most one exists per trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    /// The buyer who left the review.
    pub reviewer: AccountId,
    /// The seller being reviewed.
    pub target: AccountId,
    pub trade_id: TradeId,
    /// 1 to 5 stars.
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    #[must_use]
    pub fn new(
        reviewer: AccountId,
        target: AccountId,
        trade_id: TradeId,
        rating: u8,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id: ReviewId::new(),
            reviewer,
            target,
            trade_id,
            rating,
            comment: comment.into(),
            created_at: Utc::now(),
        }
    }
}

/// Aggregate rating for a seller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: usize,
}

impl RatingSummary {
    /// An empty summary (no reviews yet).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            average: 0.0,
            count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_carries_parties() {
        let buyer = AccountId::new();
        let seller = AccountId::new();
        let trade = TradeId::new();
        let review = Review::new(buyer, seller, trade, 5, "fast delivery");
        assert_eq!(review.reviewer, buyer);
        assert_eq!(review.target, seller);
        assert_eq!(review.trade_id, trade);
        assert_eq!(review.rating, 5);
    }

    #[test]
    fn empty_summary() {
        let s = RatingSummary::empty();
        assert_eq!(s.count, 0);
        assert!(s.average.abs() < f64::EPSILON);
    }
}
