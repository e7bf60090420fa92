//! The listing store.

use std::collections::HashMap;

use openbroker_types::{AccountId, BrokerError, Listing, ListingId, Result};
use parking_lot::RwLock;

/// Persistent table of seller listings.
pub struct ListingStore {
    listings: RwLock<HashMap<ListingId, Listing>>,
}

impl ListingStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            listings: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, listing: Listing) {
        self.listings.write().insert(listing.id, listing);
    }

    /// Fetch a listing by id.
    ///
    /// # Errors
    /// Returns `ListingNotFound` if no such listing exists.
    pub fn get(&self, id: ListingId) -> Result<Listing> {
        self.listings
            .read()
            .get(&id)
            .cloned()
            .ok_or(BrokerError::ListingNotFound(id))
    }

    /// Flip a listing's active flag. Returns the updated listing.
    ///
    /// # Errors
    /// Returns `ListingNotFound` if no such listing exists.
    pub fn set_active(&self, id: ListingId, active: bool) -> Result<Listing> {
        let mut listings = self.listings.write();
        let listing = listings
            .get_mut(&id)
            .ok_or(BrokerError::ListingNotFound(id))?;
        listing.active = active;
        Ok(listing.clone())
    }

    /// All listings currently accepting trades, newest first.
    #[must_use]
    pub fn active(&self) -> Vec<Listing> {
        let mut active: Vec<Listing> = self
            .listings
            .read()
            .values()
            .filter(|l| l.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        active
    }

    /// All listings owned by `account`, newest first.
    #[must_use]
    pub fn by_owner(&self, account: AccountId) -> Vec<Listing> {
        let mut owned: Vec<Listing> = self
            .listings
            .read()
            .values()
            .filter(|l| l.owner == account)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        owned
    }
}

impl Default for ListingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn make_listing(owner: AccountId) -> Listing {
        Listing::new(owner, "t", Decimal::new(5, 1), 10, 0, "any", "")
    }

    #[test]
    fn insert_and_get() {
        let store = ListingStore::new();
        let listing = make_listing(AccountId::new());
        let id = listing.id;
        store.insert(listing);
        assert_eq!(store.get(id).unwrap().id, id);
    }

    #[test]
    fn missing_listing_fails() {
        let store = ListingStore::new();
        assert!(matches!(
            store.get(ListingId::new()).unwrap_err(),
            BrokerError::ListingNotFound(_)
        ));
    }

    #[test]
    fn toggle_active_filters_queries() {
        let store = ListingStore::new();
        let listing = make_listing(AccountId::new());
        let id = listing.id;
        store.insert(listing);
        assert_eq!(store.active().len(), 1);

        let updated = store.set_active(id, false).unwrap();
        assert!(!updated.active);
        assert!(store.active().is_empty());
    }

    #[test]
    fn by_owner_returns_only_owned() {
        let store = ListingStore::new();
        let owner = AccountId::new();
        store.insert(make_listing(owner));
        store.insert(make_listing(owner));
        store.insert(make_listing(AccountId::new()));
        assert_eq!(store.by_owner(owner).len(), 2);
    }
}
