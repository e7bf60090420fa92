//! The coupon engine.
//!
//! Activation is the hard gate (rejections surface to the user); the
//! trade-time evaluation is soft (a coupon that no longer qualifies is
//! skipped and the trade proceeds at full price); usage is committed only
//! when payment is confirmed, so an abandoned unpaid trade never burns a
//! single-use coupon.

use openbroker_types::{
    AccountId, BrokerError, Coupon, CouponBinding, CouponId, Result, TradeId,
};
use openbroker_store::RecordUseOutcome;
use rust_decimal::Decimal;

use crate::engine::BrokerEngine;

impl BrokerEngine {
    /// Activate a coupon code for an account.
    ///
    /// Rejections, in priority order: code not found, code inactive,
    /// usage limit reached, already used by this account. Selecting a new
    /// code silently replaces the previous selection without consuming it.
    /// Returns the coupon and the selection it replaced, if any.
    ///
    /// # Errors
    /// See rejection order above; also `AccountNotFound` for unregistered
    /// callers.
    pub fn activate_coupon(
        &self,
        account: AccountId,
        code: &str,
    ) -> Result<(Coupon, Option<CouponId>)> {
        self.accounts.get(account)?;
        let coupon = self
            .coupons
            .get_by_code(code)
            .ok_or_else(|| BrokerError::CouponNotFound(code.trim().to_uppercase()))?;
        if !coupon.is_active {
            return Err(BrokerError::CouponInactive(coupon.code.clone()));
        }
        self.coupon_locks.with_lock(&coupon.id, || {
            if coupon.uses_limit > 0 && self.coupons.use_count(coupon.id) >= coupon.uses_limit {
                return Err(BrokerError::CouponExhausted(coupon.code.clone()));
            }
            if self.coupons.has_used(account, coupon.id) {
                return Err(BrokerError::CouponAlreadyUsed(coupon.code.clone()));
            }
            let previous = self.accounts.set_active_coupon(account, Some(coupon.id))?;
            self.audit.append(
                account,
                "COUPON_ACTIVATE",
                format!("code={} min_amount={}", coupon.code, coupon.min_amount),
            );
            Ok((coupon.clone(), previous))
        })
    }

    /// Clear the account's active coupon selection without consuming it.
    /// Returns the cleared selection, if any.
    ///
    /// # Errors
    /// Returns `AccountNotFound` for unregistered callers.
    pub fn deactivate_coupon(&self, account: AccountId) -> Result<Option<CouponId>> {
        self.accounts.get(account)?;
        let previous = self.accounts.set_active_coupon(account, None)?;
        if previous.is_some() {
            self.audit.append(account, "COUPON_DEACTIVATE", String::new());
        }
        Ok(previous)
    }

    /// Evaluate the buyer's active coupon against a prospective trade.
    ///
    /// Returns the binding and discount to stamp onto the trade, or
    /// `(None, 0)` when no coupon applies. A selection that no longer
    /// qualifies (below minimum amount, deactivated, exhausted, or used
    /// in the meantime) is skipped, not rejected — the purchase proceeds
    /// at full price.
    ///
    /// # Errors
    /// Returns `CouponMissing` if the selection points at a coupon record
    /// that no longer exists.
    pub(crate) fn evaluate_active_coupon(
        &self,
        buyer: AccountId,
        unit_amount: u64,
        base_cash: Decimal,
    ) -> Result<(Option<CouponBinding>, Decimal)> {
        let Some(coupon_id) = self.accounts.active_coupon(buyer) else {
            return Ok((None, Decimal::ZERO));
        };
        let coupon = self.coupons.get(coupon_id)?;
        self.coupon_locks.with_lock(&coupon_id, || {
            if !coupon.is_active {
                tracing::debug!(code = %coupon.code, "coupon deactivated since selection, skipping");
                return Ok((None, Decimal::ZERO));
            }
            if coupon.uses_limit > 0 && self.coupons.use_count(coupon_id) >= coupon.uses_limit {
                tracing::debug!(code = %coupon.code, "coupon exhausted since selection, skipping");
                return Ok((None, Decimal::ZERO));
            }
            if self.coupons.has_used(buyer, coupon_id) {
                tracing::debug!(code = %coupon.code, "coupon already used by buyer, skipping");
                return Ok((None, Decimal::ZERO));
            }
            if !coupon.meets_minimum(unit_amount) {
                tracing::debug!(
                    code = %coupon.code,
                    unit_amount,
                    min_amount = coupon.min_amount,
                    "trade below coupon minimum, discount not applied"
                );
                return Ok((None, Decimal::ZERO));
            }
            let discount = coupon.discount_for(base_cash);
            let binding = CouponBinding {
                coupon_id,
                code: coupon.code.clone(),
            };
            Ok((Some(binding), discount))
        })
    }

    /// Commit a tentatively bound coupon as used. Called by the reconciler
    /// exactly once per confirmed trade, inside the trade's critical
    /// section.
    ///
    /// Deduplicates per (coupon, user) and refuses to over-record past the
    /// usage limit; both cases keep the paid trade intact and only log.
    pub(crate) fn commit_coupon_use(
        &self,
        binding: &CouponBinding,
        buyer: AccountId,
        trade_id: TradeId,
    ) {
        self.coupon_locks.with_lock(&binding.coupon_id, || {
            match self.coupons.get(binding.coupon_id) {
                Ok(coupon) => {
                    if coupon.uses_limit > 0
                        && self.coupons.use_count(binding.coupon_id) >= coupon.uses_limit
                    {
                        tracing::warn!(
                            code = %binding.code,
                            %trade_id,
                            "usage limit filled between binding and payment, not recording"
                        );
                    } else if self.coupons.record_use(binding.coupon_id, buyer, trade_id)
                        == RecordUseOutcome::AlreadyUsed
                    {
                        tracing::warn!(
                            code = %binding.code,
                            %trade_id,
                            "duplicate coupon commit ignored"
                        );
                    }
                }
                Err(_) => {
                    tracing::warn!(
                        code = %binding.code,
                        %trade_id,
                        "bound coupon record missing at commit time"
                    );
                }
            }
        });
        // The selection served its purpose; clear it unless the buyer has
        // already picked a different coupon meanwhile.
        if self.accounts.active_coupon(buyer) == Some(binding.coupon_id) {
            let _ = self.accounts.set_active_coupon(buyer, None);
        }
    }

    /// All coupons (admin listing).
    ///
    /// # Errors
    /// Returns `NotArbiter` for non-admin callers.
    pub fn list_coupons(&self, caller: AccountId) -> Result<Vec<Coupon>> {
        self.ensure_admin(caller)?;
        Ok(self.coupons.all())
    }

    /// Committed uses of a coupon (monitoring / admin view).
    #[must_use]
    pub fn coupon_use_count(&self, coupon: CouponId) -> u32 {
        self.coupons.use_count(coupon)
    }
}
