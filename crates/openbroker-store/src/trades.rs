//! The trade record store.
//!
//! Keyed by trade id. Callers that need transition atomicity wrap access
//! in the engine's per-trade critical section; the store itself only
//! guards map consistency.

use std::collections::HashMap;

use openbroker_types::{AccountId, BrokerError, Result, Trade, TradeId, TradeStatus};
use parking_lot::RwLock;

/// Persistent table of trades.
pub struct TradeStore {
    trades: RwLock<HashMap<TradeId, Trade>>,
}

impl TradeStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            trades: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a newly created trade.
    ///
    /// # Errors
    /// Returns `DuplicateTrade` if the id is already present.
    pub fn insert(&self, trade: Trade) -> Result<()> {
        let mut trades = self.trades.write();
        if trades.contains_key(&trade.id) {
            return Err(BrokerError::DuplicateTrade(trade.id));
        }
        trades.insert(trade.id, trade);
        Ok(())
    }

    /// Fetch a trade by id.
    ///
    /// # Errors
    /// Returns `TradeNotFound` if no such trade exists.
    pub fn get(&self, id: TradeId) -> Result<Trade> {
        self.trades
            .read()
            .get(&id)
            .cloned()
            .ok_or(BrokerError::TradeNotFound(id))
    }

    /// Apply a mutation to a stored trade and return the updated copy.
    ///
    /// # Errors
    /// Returns `TradeNotFound` if no such trade exists, or whatever `f`
    /// returns.
    pub fn update<R>(
        &self,
        id: TradeId,
        f: impl FnOnce(&mut Trade) -> Result<R>,
    ) -> Result<(Trade, R)> {
        let mut trades = self.trades.write();
        let trade = trades.get_mut(&id).ok_or(BrokerError::TradeNotFound(id))?;
        let out = f(trade)?;
        Ok((trade.clone(), out))
    }

    /// Trades where `account` is the buyer, newest first.
    #[must_use]
    pub fn by_buyer(&self, account: AccountId, limit: usize) -> Vec<Trade> {
        self.by_party(|t| t.buyer == account, limit)
    }

    /// Trades where `account` is the seller, newest first.
    #[must_use]
    pub fn by_seller(&self, account: AccountId, limit: usize) -> Vec<Trade> {
        self.by_party(|t| t.seller == account, limit)
    }

    /// All currently open disputes, oldest first (arbiter work queue).
    #[must_use]
    pub fn open_disputes(&self) -> Vec<Trade> {
        let mut disputes: Vec<Trade> = self
            .trades
            .read()
            .values()
            .filter(|t| t.status == TradeStatus::Disputed)
            .cloned()
            .collect();
        disputes.sort_by_key(|t| t.created_at);
        disputes
    }

    /// Number of trades stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trades.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trades.read().is_empty()
    }

    fn by_party(&self, pred: impl Fn(&Trade) -> bool, limit: usize) -> Vec<Trade> {
        let mut matched: Vec<Trade> = self
            .trades
            .read()
            .values()
            .filter(|t| pred(t))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched.truncate(limit);
        matched
    }
}

impl Default for TradeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use openbroker_types::{DeliveryTarget, ListingId};
    use rust_decimal::Decimal;

    use super::*;

    fn make_trade(buyer: AccountId, seller: AccountId) -> Trade {
        Trade::new(
            buyer,
            seller,
            ListingId::new(),
            500,
            Decimal::new(5, 1),
            Decimal::ZERO,
            None,
            DeliveryTarget::new("target"),
        )
    }

    #[test]
    fn insert_and_get() {
        let store = TradeStore::new();
        let trade = make_trade(AccountId::new(), AccountId::new());
        let id = trade.id;
        store.insert(trade).unwrap();
        let got = store.get(id).unwrap();
        assert_eq!(got.id, id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_insert_blocked() {
        let store = TradeStore::new();
        let trade = make_trade(AccountId::new(), AccountId::new());
        store.insert(trade.clone()).unwrap();
        let err = store.insert(trade).unwrap_err();
        assert!(matches!(err, BrokerError::DuplicateTrade(_)));
    }

    #[test]
    fn get_missing_fails() {
        let store = TradeStore::new();
        let err = store.get(TradeId::new()).unwrap_err();
        assert!(matches!(err, BrokerError::TradeNotFound(_)));
    }

    #[test]
    fn update_mutates_in_place() {
        let store = TradeStore::new();
        let trade = make_trade(AccountId::new(), AccountId::new());
        let id = trade.id;
        store.insert(trade).unwrap();

        let (updated, ()) = store
            .update(id, |t| {
                t.status = TradeStatus::Cancelled;
                Ok(())
            })
            .unwrap();
        assert_eq!(updated.status, TradeStatus::Cancelled);
        assert_eq!(store.get(id).unwrap().status, TradeStatus::Cancelled);
    }

    #[test]
    fn update_error_leaves_trade_unchanged() {
        let store = TradeStore::new();
        let trade = make_trade(AccountId::new(), AccountId::new());
        let id = trade.id;
        let status_before = trade.status;
        store.insert(trade).unwrap();

        let result: Result<(Trade, ())> =
            store.update(id, |_| Err(BrokerError::Internal("nope".into())));
        assert!(result.is_err());
        assert_eq!(store.get(id).unwrap().status, status_before);
    }

    #[test]
    fn party_queries() {
        let store = TradeStore::new();
        let buyer = AccountId::new();
        let seller = AccountId::new();
        store.insert(make_trade(buyer, seller)).unwrap();
        store.insert(make_trade(buyer, AccountId::new())).unwrap();
        store.insert(make_trade(AccountId::new(), seller)).unwrap();

        assert_eq!(store.by_buyer(buyer, 10).len(), 2);
        assert_eq!(store.by_seller(seller, 10).len(), 2);
        assert_eq!(store.by_buyer(buyer, 1).len(), 1);
    }

    #[test]
    fn open_disputes_oldest_first() {
        let store = TradeStore::new();
        let mut first = make_trade(AccountId::new(), AccountId::new());
        first.status = TradeStatus::Disputed;
        let mut second = make_trade(AccountId::new(), AccountId::new());
        second.status = TradeStatus::Disputed;
        let first_id = first.id;

        store.insert(first).unwrap();
        store.insert(second).unwrap();
        store
            .insert(make_trade(AccountId::new(), AccountId::new()))
            .unwrap();

        let disputes = store.open_disputes();
        assert_eq!(disputes.len(), 2);
        assert_eq!(disputes[0].id, first_id);
    }
}
