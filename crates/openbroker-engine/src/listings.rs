//! Listing management.

use openbroker_types::{AccountId, BrokerError, Listing, ListingId, Result};
use rust_decimal::Decimal;

use crate::engine::BrokerEngine;

impl BrokerEngine {
    /// Create a standing offer.
    ///
    /// # Errors
    /// - `InvalidListing` for a non-positive rate, zero minimum, or a
    ///   maximum below the minimum
    /// - `AccountNotFound` for unregistered owners
    #[allow(clippy::too_many_arguments)]
    pub fn create_listing(
        &self,
        owner: AccountId,
        title: &str,
        rate: Decimal,
        min_amount: u64,
        max_amount: u64,
        methods: &str,
        description: &str,
    ) -> Result<Listing> {
        self.accounts.get(owner)?;
        if rate <= Decimal::ZERO {
            return Err(BrokerError::InvalidListing {
                reason: "rate must be positive".into(),
            });
        }
        if min_amount == 0 {
            return Err(BrokerError::InvalidListing {
                reason: "minimum amount must be at least 1".into(),
            });
        }
        if max_amount != 0 && max_amount < min_amount {
            return Err(BrokerError::InvalidListing {
                reason: "maximum amount below minimum".into(),
            });
        }

        let listing = Listing::new(owner, title, rate, min_amount, max_amount, methods, description);
        self.listings.insert(listing.clone());
        self.audit.append(
            owner,
            "LISTING_CREATE",
            format!("listing={} rate={rate}", listing.id),
        );
        Ok(listing)
    }

    /// Flip a listing's active flag. Owners manage their own listings;
    /// admins may toggle any.
    ///
    /// # Errors
    /// - `NotListingOwner` for callers who neither own the listing nor
    ///   hold admin privileges
    /// - `ListingNotFound` for dangling ids
    pub fn toggle_listing(
        &self,
        caller: AccountId,
        listing_id: ListingId,
        active: bool,
    ) -> Result<Listing> {
        let listing = self.listings.get(listing_id)?;
        if listing.owner != caller && !self.config.is_admin(caller) {
            return Err(BrokerError::NotListingOwner(listing_id));
        }
        let updated = self.listings.set_active(listing_id, active)?;
        self.audit.append(
            caller,
            "LISTING_TOGGLE",
            format!("listing={listing_id} active={active}"),
        );
        Ok(updated)
    }

    /// All listings currently accepting trades, newest first.
    #[must_use]
    pub fn active_listings(&self) -> Vec<Listing> {
        self.listings.active()
    }

    /// All listings owned by `account`, newest first.
    #[must_use]
    pub fn listings_of(&self, account: AccountId) -> Vec<Listing> {
        self.listings.by_owner(account)
    }
}
