//! The engine aggregate: stores, gateway handle, and per-key locks.
//!
//! Operations live in sibling modules (`lifecycle`, `reconciler`,
//! `coupon`, `disputes`, `withdrawals`, `reviews`, `listings`, `admin`),
//! all as inherent methods on [`BrokerEngine`].

use std::sync::Arc;

use openbroker_types::{
    Account, AccountId, BrokerConfig, BrokerError, CouponId, Notification, NotificationPayload,
    Result, Trade, TradeId,
};
use openbroker_store::{
    AccountStore, AuditLog, CouponStore, KeyedMutex, LedgerStore, ListingStore, ReviewStore,
    TradeStore, WithdrawalStore,
};

use crate::gateway::PaymentGateway;

/// The brokerage core. Safe to share behind an `Arc` across concurrent
/// callers: chat sessions, the gateway's webhook handler, and manual
/// status polls all call into the same instance.
pub struct BrokerEngine {
    pub(crate) config: BrokerConfig,
    pub(crate) accounts: AccountStore,
    pub(crate) listings: ListingStore,
    pub(crate) trades: TradeStore,
    pub(crate) coupons: CouponStore,
    pub(crate) ledger: LedgerStore,
    pub(crate) reviews: ReviewStore,
    pub(crate) withdrawals: WithdrawalStore,
    pub(crate) audit: AuditLog,
    pub(crate) gateway: Arc<dyn PaymentGateway>,
    /// Serializes state transitions per trade (webhook vs. poll race).
    pub(crate) trade_locks: KeyedMutex<TradeId>,
    /// Serializes limit-sensitive coupon check-then-record sequences.
    pub(crate) coupon_locks: KeyedMutex<CouponId>,
}

impl BrokerEngine {
    /// Build an engine with fresh stores.
    #[must_use]
    pub fn new(config: BrokerConfig, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            config,
            accounts: AccountStore::new(),
            listings: ListingStore::new(),
            trades: TradeStore::new(),
            coupons: CouponStore::new(),
            ledger: LedgerStore::new(),
            reviews: ReviewStore::new(),
            withdrawals: WithdrawalStore::new(),
            audit: AuditLog::new(),
            gateway,
            trade_locks: KeyedMutex::new(),
            coupon_locks: KeyedMutex::new(),
        }
    }

    /// Register an account if it is not known yet.
    pub fn register_account(&self, id: AccountId, username: &str) -> Account {
        self.accounts.create_if_missing(id, username)
    }

    /// Fetch a trade by id.
    ///
    /// # Errors
    /// Returns `TradeNotFound` if no such trade exists.
    pub fn trade(&self, id: TradeId) -> Result<Trade> {
        self.trades.get(id)
    }

    /// The cash ledger (read access for the embedding surface).
    #[must_use]
    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    /// The audit log (read access for dispute review).
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    #[must_use]
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub(crate) fn ensure_admin(&self, caller: AccountId) -> Result<()> {
        if self.config.is_admin(caller) {
            Ok(())
        } else {
            Err(BrokerError::NotArbiter(caller))
        }
    }

    /// One notification per configured admin.
    pub(crate) fn notify_admins(&self, payload: &NotificationPayload) -> Vec<Notification> {
        self.config
            .admins
            .iter()
            .map(|&admin| Notification::new(admin, payload.clone()))
            .collect()
    }
}
