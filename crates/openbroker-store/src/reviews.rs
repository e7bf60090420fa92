//! The review store.

use std::collections::HashSet;

use openbroker_types::{AccountId, BrokerError, RatingSummary, Result, Review, TradeId};
use parking_lot::RwLock;

/// Persistent table of reviews, unique per trade.
pub struct ReviewStore {
    reviews: RwLock<Vec<Review>>,
    reviewed_trades: RwLock<HashSet<TradeId>>,
}

impl ReviewStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            reviews: RwLock::new(Vec::new()),
            reviewed_trades: RwLock::new(HashSet::new()),
        }
    }

    /// Insert a review.
    ///
    /// # Errors
    /// Returns `ReviewAlreadyLeft` if the trade already has one.
    pub fn insert(&self, review: Review) -> Result<()> {
        let mut reviewed = self.reviewed_trades.write();
        if !reviewed.insert(review.trade_id) {
            return Err(BrokerError::ReviewAlreadyLeft(review.trade_id));
        }
        self.reviews.write().push(review);
        Ok(())
    }

    /// Whether the trade already has a review.
    #[must_use]
    pub fn has_review(&self, trade_id: TradeId) -> bool {
        self.reviewed_trades.read().contains(&trade_id)
    }

    /// Latest reviews about `target`, newest first.
    #[must_use]
    pub fn for_target(&self, target: AccountId, limit: usize) -> Vec<Review> {
        let mut matched: Vec<Review> = self
            .reviews
            .read()
            .iter()
            .filter(|r| r.target == target)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched.truncate(limit);
        matched
    }

    /// Average rating and review count for `target`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rating_summary(&self, target: AccountId) -> RatingSummary {
        let reviews = self.reviews.read();
        let (sum, count) = reviews
            .iter()
            .filter(|r| r.target == target)
            .fold((0u64, 0usize), |(s, c), r| (s + u64::from(r.rating), c + 1));
        if count == 0 {
            RatingSummary::empty()
        } else {
            RatingSummary {
                average: sum as f64 / count as f64,
                count,
            }
        }
    }
}

impl Default for ReviewStore {
    fn default() -> Self {
        Self::new()
    }
}
