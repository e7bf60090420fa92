//! # openbroker-types
//!
//! Shared types, errors, and configuration for the **OpenBroker**
//! trade brokerage core.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`TradeId`], [`ListingId`], [`CouponId`],
//!   [`ReviewId`], [`WithdrawalId`], plus the opaque [`PaymentRef`],
//!   [`ProofRef`] and [`DeliveryTarget`] references
//! - **Trade model**: [`Trade`], [`TradeStatus`]
//! - **Listing model**: [`Listing`]
//! - **Coupon model**: [`Coupon`], [`DiscountKind`], [`CouponBinding`], [`CouponUse`]
//! - **Account model**: [`Account`]
//! - **Review model**: [`Review`], [`RatingSummary`]
//! - **Withdrawal model**: [`Withdrawal`], [`WithdrawalStatus`]
//! - **Gateway boundary**: [`PaymentStatus`], [`PaymentIntent`]
//! - **Notifications**: [`Notification`], [`NotificationPayload`]
//! - **Audit model**: [`AuditEntry`]
//! - **Configuration**: [`BrokerConfig`]
//! - **Errors**: [`BrokerError`] with `BR_ERR_` prefix codes

pub mod account;
pub mod audit;
pub mod config;
pub mod constants;
pub mod coupon;
pub mod error;
pub mod event;
pub mod gateway;
pub mod ids;
pub mod listing;
pub mod review;
pub mod trade;
pub mod withdrawal;

// Re-export all primary types at crate root for ergonomic imports:
//   use openbroker_types::{Trade, TradeStatus, Coupon, BrokerError, ...};

pub use account::*;
pub use audit::*;
pub use config::*;
pub use coupon::*;
pub use error::*;
pub use event::*;
pub use gateway::*;
pub use ids::*;
pub use listing::*;
pub use review::*;
pub use trade::*;
pub use withdrawal::*;

// Constants are accessed via `openbroker_types::constants::FOO`
// (not re-exported to avoid name collisions).
