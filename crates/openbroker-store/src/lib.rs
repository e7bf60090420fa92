//! # openbroker-store
//!
//! **Persistence plane**: typed record stores for every entity the
//! brokerage core mutates, plus the locking primitive the engine builds
//! its per-key critical sections from.
//!
//! ## Stores
//!
//! - [`LedgerStore`] — account cash balances with atomic per-account
//!   debit/credit
//! - [`TradeStore`] — trades keyed by id with immutable terms
//! - [`ListingStore`] — sellers' standing offers
//! - [`CouponStore`] — coupons plus committed usage records
//! - [`AccountStore`] — user records and active coupon selection
//! - [`ReviewStore`] — one review per trade
//! - [`WithdrawalStore`] — pending/completed payout requests
//! - [`AuditLog`] — append-only, hash-chained audit trail
//!
//! All stores use interior mutability and are safe to share behind an
//! `Arc` across concurrent callers. Records cross the store boundary as
//! typed values — raw positional data never leaves this crate.

pub mod accounts;
pub mod audit;
pub mod coupons;
pub mod keyed_mutex;
pub mod ledger;
pub mod listings;
pub mod reviews;
pub mod trades;
pub mod withdrawals;

pub use accounts::AccountStore;
pub use audit::AuditLog;
pub use coupons::{CouponStore, RecordUseOutcome};
pub use keyed_mutex::KeyedMutex;
pub use ledger::LedgerStore;
pub use listings::ListingStore;
pub use reviews::ReviewStore;
pub use trades::TradeStore;
pub use withdrawals::WithdrawalStore;
