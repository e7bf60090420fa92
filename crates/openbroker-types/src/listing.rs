//! Seller listings — standing offers trades are instantiated from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, ListingId};

/// A seller's standing offer: rate and tradeable bounds.
///
/// Listings have a lifecycle independent of trades. A trade copies the
/// rate by value at creation, so editing or deactivating a listing never
/// retroactively changes an in-flight trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    /// The selling account.
    pub owner: AccountId,
    /// Short human-readable title.
    pub title: String,
    /// Cash per unit.
    pub rate: Decimal,
    /// Minimum units per trade.
    pub min_amount: u64,
    /// Maximum units per trade. Zero means unbounded.
    pub max_amount: u64,
    /// Free-text note on accepted payment methods.
    pub methods: String,
    /// Free-text description.
    pub description: String,
    /// Whether the listing currently accepts new trades.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: AccountId,
        title: impl Into<String>,
        rate: Decimal,
        min_amount: u64,
        max_amount: u64,
        methods: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: ListingId::new(),
            owner,
            title: title.into(),
            rate,
            min_amount,
            max_amount,
            methods: methods.into(),
            description: description.into(),
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Whether `amount` units fall inside this listing's bounds.
    #[must_use]
    pub fn accepts_amount(&self, amount: u64) -> bool {
        amount >= self.min_amount && (self.max_amount == 0 || amount <= self.max_amount)
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Listing[{}] {} @ {} ({}..={})",
            self.id,
            self.title,
            self.rate,
            self.min_amount,
            if self.max_amount == 0 {
                "∞".to_string()
            } else {
                self.max_amount.to_string()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_listing(min: u64, max: u64) -> Listing {
        Listing::new(
            AccountId::new(),
            "Fast delivery",
            Decimal::new(5, 1),
            min,
            max,
            "bank transfer",
            "",
        )
    }

    #[test]
    fn bounds_inclusive() {
        let listing = make_listing(100, 5000);
        assert!(listing.accepts_amount(100));
        assert!(listing.accepts_amount(5000));
        assert!(!listing.accepts_amount(99));
        assert!(!listing.accepts_amount(5001));
    }

    #[test]
    fn zero_max_is_unbounded() {
        let listing = make_listing(1, 0);
        assert!(listing.accepts_amount(1));
        assert!(listing.accepts_amount(u64::MAX));
    }

    #[test]
    fn new_listing_is_active() {
        let listing = make_listing(1, 0);
        assert!(listing.active);
    }
}
