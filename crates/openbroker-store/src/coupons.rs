//! Coupon records and committed usage tracking.
//!
//! Usage records enforce at-most-one-use per (coupon, user) independently
//! of the global usage counter. The engine wraps limit-sensitive
//! check-then-record sequences in a per-coupon critical section.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use openbroker_types::{AccountId, BrokerError, Coupon, CouponId, CouponUse, Result, TradeId};
use parking_lot::RwLock;

/// Outcome of recording a coupon use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordUseOutcome {
    Recorded,
    /// This (coupon, user) pair already has a usage record; nothing added.
    AlreadyUsed,
}

/// Persistent table of coupons plus their committed uses.
pub struct CouponStore {
    coupons: RwLock<HashMap<CouponId, Coupon>>,
    /// Code -> id index; codes are stored uppercase.
    by_code: RwLock<HashMap<String, CouponId>>,
    uses: RwLock<Vec<CouponUse>>,
    used_pairs: RwLock<HashSet<(CouponId, AccountId)>>,
}

impl CouponStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            coupons: RwLock::new(HashMap::new()),
            by_code: RwLock::new(HashMap::new()),
            uses: RwLock::new(Vec::new()),
            used_pairs: RwLock::new(HashSet::new()),
        }
    }

    /// Insert a new coupon.
    ///
    /// # Errors
    /// Returns `DuplicateCouponCode` if another coupon already owns the
    /// code (case-insensitive).
    pub fn insert(&self, coupon: Coupon) -> Result<CouponId> {
        let mut by_code = self.by_code.write();
        if by_code.contains_key(&coupon.code) {
            return Err(BrokerError::DuplicateCouponCode(coupon.code));
        }
        let id = coupon.id;
        by_code.insert(coupon.code.clone(), id);
        self.coupons.write().insert(id, coupon);
        Ok(id)
    }

    /// Fetch a coupon by id.
    ///
    /// # Errors
    /// Returns `CouponMissing` — a dangling id is a data-integrity fault,
    /// unlike an unknown user-typed code.
    pub fn get(&self, id: CouponId) -> Result<Coupon> {
        self.coupons
            .read()
            .get(&id)
            .cloned()
            .ok_or(BrokerError::CouponMissing(id))
    }

    /// Case-insensitive code lookup.
    #[must_use]
    pub fn get_by_code(&self, code: &str) -> Option<Coupon> {
        let normalized = code.trim().to_uppercase();
        let id = *self.by_code.read().get(&normalized)?;
        self.coupons.read().get(&id).cloned()
    }

    /// Flip a coupon's active flag. Returns the updated coupon.
    ///
    /// # Errors
    /// Returns `CouponMissing` if no such coupon exists.
    pub fn set_active(&self, id: CouponId, active: bool) -> Result<Coupon> {
        let mut coupons = self.coupons.write();
        let coupon = coupons.get_mut(&id).ok_or(BrokerError::CouponMissing(id))?;
        coupon.is_active = active;
        Ok(coupon.clone())
    }

    /// All coupons, newest first (admin listing).
    #[must_use]
    pub fn all(&self) -> Vec<Coupon> {
        let mut all: Vec<Coupon> = self.coupons.read().values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Number of committed uses for a coupon.
    #[must_use]
    pub fn use_count(&self, id: CouponId) -> u32 {
        u32::try_from(
            self.uses
                .read()
                .iter()
                .filter(|u| u.coupon_id == id)
                .count(),
        )
        .unwrap_or(u32::MAX)
    }

    /// Whether `account` already has a usage record for `coupon`.
    #[must_use]
    pub fn has_used(&self, account: AccountId, coupon: CouponId) -> bool {
        self.used_pairs.read().contains(&(coupon, account))
    }

    /// Record a committed use. Deduplicates per (coupon, user): a second
    /// call for the same pair — e.g. two paid trades racing on the same
    /// binding — adds nothing.
    pub fn record_use(
        &self,
        coupon: CouponId,
        account: AccountId,
        trade_id: TradeId,
    ) -> RecordUseOutcome {
        let mut pairs = self.used_pairs.write();
        if !pairs.insert((coupon, account)) {
            return RecordUseOutcome::AlreadyUsed;
        }
        self.uses.write().push(CouponUse {
            coupon_id: coupon,
            account,
            trade_id,
            used_at: Utc::now(),
        });
        RecordUseOutcome::Recorded
    }
}

impl Default for CouponStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use openbroker_types::DiscountKind;
    use rust_decimal::Decimal;

    use super::*;

    fn make_coupon(code: &str, limit: u32) -> Coupon {
        Coupon::new(code, DiscountKind::Percent, Decimal::TEN, limit, 0)
    }

    #[test]
    fn insert_and_lookup_by_code() {
        let store = CouponStore::new();
        store.insert(make_coupon("SAVE10", 0)).unwrap();
        assert!(store.get_by_code("save10").is_some());
        assert!(store.get_by_code(" Save10 ").is_some());
        assert!(store.get_by_code("OTHER").is_none());
    }

    #[test]
    fn duplicate_code_blocked() {
        let store = CouponStore::new();
        store.insert(make_coupon("SAVE10", 0)).unwrap();
        let err = store.insert(make_coupon("save10", 0)).unwrap_err();
        assert!(matches!(err, BrokerError::DuplicateCouponCode(_)));
    }

    #[test]
    fn record_use_counts_and_dedupes() {
        let store = CouponStore::new();
        let id = store.insert(make_coupon("SAVE10", 3)).unwrap();
        let user = AccountId::new();

        assert_eq!(
            store.record_use(id, user, TradeId::new()),
            RecordUseOutcome::Recorded
        );
        assert_eq!(store.use_count(id), 1);
        assert!(store.has_used(user, id));

        // A second commit for the same (coupon, user) adds nothing.
        assert_eq!(
            store.record_use(id, user, TradeId::new()),
            RecordUseOutcome::AlreadyUsed
        );
        assert_eq!(store.use_count(id), 1);
    }

    #[test]
    fn distinct_users_count_separately() {
        let store = CouponStore::new();
        let id = store.insert(make_coupon("SAVE10", 0)).unwrap();
        for _ in 0..3 {
            store.record_use(id, AccountId::new(), TradeId::new());
        }
        assert_eq!(store.use_count(id), 3);
    }

    #[test]
    fn set_active_toggles() {
        let store = CouponStore::new();
        let id = store.insert(make_coupon("SAVE10", 0)).unwrap();
        let off = store.set_active(id, false).unwrap();
        assert!(!off.is_active);
        let on = store.set_active(id, true).unwrap();
        assert!(on.is_active);
    }

    #[test]
    fn missing_coupon_is_integrity_error() {
        let store = CouponStore::new();
        assert!(matches!(
            store.get(CouponId::new()).unwrap_err(),
            BrokerError::CouponMissing(_)
        ));
    }
}
