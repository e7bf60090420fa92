//! Error types for the OpenBroker brokerage core.
//!
//! All errors use the `BR_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Validation errors
//! - 2xx: Authorization errors
//! - 3xx: State conflict errors
//! - 4xx: Ledger errors
//! - 5xx: Coupon errors
//! - 6xx: Gateway / external service errors
//! - 7xx: Data integrity errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AccountId, CouponId, ListingId, TradeId, TradeStatus, WithdrawalId};

/// Central error enum for all OpenBroker operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// A unit or cash amount was zero or negative.
    #[error("BR_ERR_100: Amount must be positive")]
    NonPositiveAmount,

    /// The requested unit amount falls outside the listing's bounds.
    #[error("BR_ERR_101: Amount {amount} outside listing bounds {min}..={max}")]
    AmountOutOfBounds { amount: u64, min: u64, max: u64 },

    /// The referenced listing is not accepting trades.
    #[error("BR_ERR_102: Listing not active: {0}")]
    ListingInactive(ListingId),

    /// Buyer and seller would be the same account.
    #[error("BR_ERR_103: Self-trade blocked: buyer owns the listing")]
    SelfTradeBlocked,

    /// Review rating outside the accepted range.
    #[error("BR_ERR_104: Invalid rating {0}: must be between 1 and 5")]
    InvalidRating(u8),

    /// Withdrawal request below the configured minimum.
    #[error("BR_ERR_105: Withdrawal below minimum: requested {requested}, minimum {minimum}")]
    WithdrawBelowMinimum {
        requested: Decimal,
        minimum: Decimal,
    },

    /// The listing failed validation (bad rate, inverted bounds, etc.).
    #[error("BR_ERR_106: Invalid listing: {reason}")]
    InvalidListing { reason: String },

    /// A dispute must carry a non-empty reason.
    #[error("BR_ERR_107: Dispute reason must not be empty")]
    EmptyDisputeReason,

    /// A dispute can only be resolved in favour of the buyer or the seller.
    #[error("BR_ERR_108: Winner {winner} is not a party to trade {trade_id}")]
    WinnerNotParty {
        winner: AccountId,
        trade_id: TradeId,
    },

    /// The coupon failed validation on creation (bad value, empty code, etc.).
    #[error("BR_ERR_109: Invalid coupon: {reason}")]
    InvalidCoupon { reason: String },

    // =================================================================
    // Authorization Errors (2xx)
    // =================================================================
    /// The caller is not the buyer of the referenced trade.
    #[error("BR_ERR_200: Caller is not the buyer of trade {0}")]
    NotTradeBuyer(TradeId),

    /// The caller is not the seller of the referenced trade.
    #[error("BR_ERR_201: Caller is not the seller of trade {0}")]
    NotTradeSeller(TradeId),

    /// The caller is not a configured arbiter/admin.
    #[error("BR_ERR_202: Caller {0} is not an arbiter")]
    NotArbiter(AccountId),

    /// The caller does not own the referenced listing.
    #[error("BR_ERR_203: Caller does not own listing {0}")]
    NotListingOwner(ListingId),

    // =================================================================
    // State Conflict Errors (3xx)
    // =================================================================
    /// The operation is not valid for the trade's current status.
    #[error("BR_ERR_300: {action} not valid for trade {trade_id} in status {status}")]
    InvalidTransition {
        trade_id: TradeId,
        status: TradeStatus,
        action: &'static str,
    },

    /// A review already exists for this trade.
    #[error("BR_ERR_301: Review already left for trade {0}")]
    ReviewAlreadyLeft(TradeId),

    /// The withdrawal was already processed.
    #[error("BR_ERR_302: Withdrawal {0} already processed")]
    WithdrawalAlreadyProcessed(WithdrawalId),

    /// A trade with this ID already exists in the store.
    #[error("BR_ERR_303: Trade already exists: {0}")]
    DuplicateTrade(TradeId),

    // =================================================================
    // Ledger Errors (4xx)
    // =================================================================
    /// Not enough committed balance to perform the debit.
    #[error("BR_ERR_400: Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    /// A ledger operation would produce a negative balance.
    #[error("BR_ERR_401: Balance may not go negative")]
    NegativeBalance,

    // =================================================================
    // Coupon Errors (5xx)
    // =================================================================
    /// No coupon with this code exists.
    #[error("BR_ERR_500: Coupon code not found: {0}")]
    CouponNotFound(String),

    /// The coupon exists but is switched off.
    #[error("BR_ERR_501: Coupon not active: {0}")]
    CouponInactive(String),

    /// The coupon's global usage limit has been reached.
    #[error("BR_ERR_502: Coupon usage limit reached: {0}")]
    CouponExhausted(String),

    /// This account has already consumed this coupon.
    #[error("BR_ERR_503: Coupon already used by this account: {0}")]
    CouponAlreadyUsed(String),

    /// A coupon with this code already exists.
    #[error("BR_ERR_504: Coupon code already exists: {0}")]
    DuplicateCouponCode(String),

    // =================================================================
    // Gateway / External Errors (6xx)
    // =================================================================
    /// The payment gateway could not be reached or timed out.
    #[error("BR_ERR_600: Payment gateway unavailable: {reason}")]
    GatewayUnavailable { reason: String },

    /// The gateway answered with something the core cannot interpret.
    #[error("BR_ERR_601: Malformed gateway response: {reason}")]
    GatewayMalformed { reason: String },

    // =================================================================
    // Data Integrity Errors (7xx)
    // =================================================================
    /// The referenced trade does not exist.
    #[error("BR_ERR_700: Trade not found: {0}")]
    TradeNotFound(TradeId),

    /// The referenced listing does not exist.
    #[error("BR_ERR_701: Listing not found: {0}")]
    ListingNotFound(ListingId),

    /// The referenced account does not exist.
    #[error("BR_ERR_702: Account not found: {0}")]
    AccountNotFound(AccountId),

    /// A coupon referenced by id is missing from the store.
    #[error("BR_ERR_703: Coupon record missing: {0}")]
    CouponMissing(CouponId),

    /// The referenced withdrawal does not exist.
    #[error("BR_ERR_704: Withdrawal not found: {0}")]
    WithdrawalNotFound(WithdrawalId),

    /// The trade has no payment reference to poll the gateway with.
    #[error("BR_ERR_705: Trade {0} has no payment reference")]
    MissingPaymentRef(TradeId),

    /// The audit chain digest does not match at the given sequence number.
    #[error("BR_ERR_706: Audit chain broken at sequence {0}")]
    AuditChainBroken(u64),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("BR_ERR_900: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, BrokerError>;

/// Coarse classification of a [`BrokerError`], matching the request-level
/// taxonomy the embedding surface reports to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    StateConflict,
    InsufficientFunds,
    Coupon,
    ExternalService,
    DataIntegrity,
    Internal,
}

impl BrokerError {
    /// The taxonomy bucket this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        use BrokerError as E;
        match self {
            E::NonPositiveAmount
            | E::AmountOutOfBounds { .. }
            | E::ListingInactive(_)
            | E::SelfTradeBlocked
            | E::InvalidRating(_)
            | E::WithdrawBelowMinimum { .. }
            | E::InvalidListing { .. }
            | E::EmptyDisputeReason
            | E::WinnerNotParty { .. }
            | E::InvalidCoupon { .. } => ErrorKind::Validation,
            E::NotTradeBuyer(_) | E::NotTradeSeller(_) | E::NotArbiter(_) | E::NotListingOwner(_) => {
                ErrorKind::Authorization
            }
            E::InvalidTransition { .. }
            | E::ReviewAlreadyLeft(_)
            | E::WithdrawalAlreadyProcessed(_)
            | E::DuplicateTrade(_) => ErrorKind::StateConflict,
            E::InsufficientFunds { .. } | E::NegativeBalance => ErrorKind::InsufficientFunds,
            E::CouponNotFound(_)
            | E::CouponInactive(_)
            | E::CouponExhausted(_)
            | E::CouponAlreadyUsed(_)
            | E::DuplicateCouponCode(_) => ErrorKind::Coupon,
            E::GatewayUnavailable { .. } | E::GatewayMalformed { .. } => ErrorKind::ExternalService,
            E::TradeNotFound(_)
            | E::ListingNotFound(_)
            | E::AccountNotFound(_)
            | E::CouponMissing(_)
            | E::WithdrawalNotFound(_)
            | E::MissingPaymentRef(_)
            | E::AuditChainBroken(_) => ErrorKind::DataIntegrity,
            E::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether a caller may safely retry the originating request.
    ///
    /// Only external-service failures are retryable; the core guarantees
    /// retry-safety (idempotency) rather than retrying internally.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ExternalService
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = BrokerError::TradeNotFound(TradeId::new());
        let msg = format!("{err}");
        assert!(msg.starts_with("BR_ERR_700"), "Got: {msg}");
    }

    #[test]
    fn insufficient_funds_display() {
        let err = BrokerError::InsufficientFunds {
            requested: Decimal::new(100, 0),
            available: Decimal::new(50, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("BR_ERR_400"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn all_errors_have_br_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(BrokerError::NonPositiveAmount),
            Box::new(BrokerError::SelfTradeBlocked),
            Box::new(BrokerError::CouponNotFound("SAVE10".into())),
            Box::new(BrokerError::GatewayUnavailable {
                reason: "timeout".into(),
            }),
            Box::new(BrokerError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("BR_ERR_"),
                "Error missing BR_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn kinds_match_taxonomy() {
        assert_eq!(
            BrokerError::NonPositiveAmount.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            BrokerError::NotTradeBuyer(TradeId::new()).kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            BrokerError::InsufficientFunds {
                requested: Decimal::ONE,
                available: Decimal::ZERO,
            }
            .kind(),
            ErrorKind::InsufficientFunds
        );
        assert_eq!(
            BrokerError::GatewayUnavailable {
                reason: "down".into()
            }
            .kind(),
            ErrorKind::ExternalService
        );
    }

    #[test]
    fn only_gateway_errors_are_retryable() {
        assert!(
            BrokerError::GatewayUnavailable {
                reason: "timeout".into()
            }
            .is_retryable()
        );
        assert!(!BrokerError::NonPositiveAmount.is_retryable());
        assert!(!BrokerError::TradeNotFound(TradeId::new()).is_retryable());
    }
}
