//! Elevated-privilege operations.
//!
//! The admin surface is just another caller: every operation here runs
//! the same guards and audit appends as the rest of the engine, with an
//! admin check in front.

use openbroker_types::{
    AccountId, BrokerError, Coupon, CouponId, DiscountKind, Result,
};
use rust_decimal::Decimal;

use crate::engine::BrokerEngine;

impl BrokerEngine {
    /// Overwrite an account's ledger balance.
    ///
    /// # Errors
    /// - `NotArbiter` for non-admin callers
    /// - `AccountNotFound` / `NegativeBalance`
    pub fn admin_set_balance(
        &self,
        admin: AccountId,
        account: AccountId,
        value: Decimal,
    ) -> Result<Decimal> {
        self.ensure_admin(admin)?;
        self.accounts.get(account)?;
        let new_balance = self.ledger.set_balance(account, value)?;
        self.audit.append(
            admin,
            "BALANCE_SET",
            format!("account={account} balance={new_balance}"),
        );
        tracing::info!(%account, %new_balance, "balance overwritten by admin");
        Ok(new_balance)
    }

    /// Create a coupon.
    ///
    /// # Errors
    /// - `NotArbiter` for non-admin callers
    /// - `InvalidCoupon` for an empty code, non-positive value, or a
    ///   percentage above 100
    /// - `DuplicateCouponCode` if the code is taken (case-insensitive)
    pub fn admin_create_coupon(
        &self,
        admin: AccountId,
        code: &str,
        kind: DiscountKind,
        value: Decimal,
        uses_limit: u32,
        min_amount: u64,
    ) -> Result<Coupon> {
        self.ensure_admin(admin)?;
        if code.trim().is_empty() {
            return Err(BrokerError::InvalidCoupon {
                reason: "code must not be empty".into(),
            });
        }
        if value <= Decimal::ZERO {
            return Err(BrokerError::InvalidCoupon {
                reason: "value must be positive".into(),
            });
        }
        if kind == DiscountKind::Percent && value > Decimal::new(100, 0) {
            return Err(BrokerError::InvalidCoupon {
                reason: "percentage cannot exceed 100".into(),
            });
        }

        let coupon = Coupon::new(code, kind, value, uses_limit, min_amount);
        self.coupons.insert(coupon.clone())?;
        self.audit.append(
            admin,
            "COUPON_CREATE",
            format!(
                "code={} kind={} value={} limit={} min_amount={}",
                coupon.code, kind, value, uses_limit, min_amount
            ),
        );
        Ok(coupon)
    }

    /// Switch a coupon on or off.
    ///
    /// # Errors
    /// - `NotArbiter` for non-admin callers
    /// - `CouponMissing` for dangling ids
    pub fn admin_toggle_coupon(
        &self,
        admin: AccountId,
        coupon_id: CouponId,
        active: bool,
    ) -> Result<Coupon> {
        self.ensure_admin(admin)?;
        let coupon = self.coupons.set_active(coupon_id, active)?;
        self.audit.append(
            admin,
            "COUPON_TOGGLE",
            format!("code={} active={active}", coupon.code),
        );
        Ok(coupon)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use openbroker_types::BrokerConfig;

    use crate::gateway::StubGateway;

    use super::*;

    struct Fixture {
        engine: BrokerEngine,
        admin: AccountId,
    }

    fn fixture() -> Fixture {
        let admin = AccountId::new();
        let config = BrokerConfig::new(vec![admin], Decimal::new(100, 0));
        let engine = BrokerEngine::new(config, Arc::new(StubGateway::new()));
        Fixture { engine, admin }
    }

    #[test]
    fn set_balance_is_admin_gated() {
        let fx = fixture();
        let user = AccountId::new();
        fx.engine.register_account(user, "u");

        assert!(matches!(
            fx.engine
                .admin_set_balance(user, user, Decimal::ONE)
                .unwrap_err(),
            BrokerError::NotArbiter(_)
        ));

        fx.engine
            .admin_set_balance(fx.admin, user, Decimal::new(500, 0))
            .unwrap();
        assert_eq!(fx.engine.ledger.balance(user), Decimal::new(500, 0));
    }

    #[test]
    fn create_coupon_validations() {
        let fx = fixture();

        assert!(matches!(
            fx.engine
                .admin_create_coupon(fx.admin, "  ", DiscountKind::Fixed, Decimal::ONE, 0, 0)
                .unwrap_err(),
            BrokerError::InvalidCoupon { .. }
        ));
        assert!(matches!(
            fx.engine
                .admin_create_coupon(fx.admin, "X", DiscountKind::Fixed, Decimal::ZERO, 0, 0)
                .unwrap_err(),
            BrokerError::InvalidCoupon { .. }
        ));
        assert!(matches!(
            fx.engine
                .admin_create_coupon(
                    fx.admin,
                    "X",
                    DiscountKind::Percent,
                    Decimal::new(150, 0),
                    0,
                    0
                )
                .unwrap_err(),
            BrokerError::InvalidCoupon { .. }
        ));

        let coupon = fx
            .engine
            .admin_create_coupon(fx.admin, "save10", DiscountKind::Percent, Decimal::TEN, 3, 0)
            .unwrap();
        assert_eq!(coupon.code, "SAVE10");

        assert!(matches!(
            fx.engine
                .admin_create_coupon(fx.admin, "SAVE10", DiscountKind::Fixed, Decimal::ONE, 0, 0)
                .unwrap_err(),
            BrokerError::DuplicateCouponCode(_)
        ));
    }

    #[test]
    fn toggle_coupon_roundtrip() {
        let fx = fixture();
        let coupon = fx
            .engine
            .admin_create_coupon(fx.admin, "SAVE10", DiscountKind::Percent, Decimal::TEN, 0, 0)
            .unwrap();

        let off = fx
            .engine
            .admin_toggle_coupon(fx.admin, coupon.id, false)
            .unwrap();
        assert!(!off.is_active);

        assert!(matches!(
            fx.engine
                .admin_toggle_coupon(AccountId::new(), coupon.id, true)
                .unwrap_err(),
            BrokerError::NotArbiter(_)
        ));
    }
}
