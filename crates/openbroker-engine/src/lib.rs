//! # openbroker-engine
//!
//! The brokerage core: the trade lifecycle state machine, the
//! payment-confirmation reconciler, the coupon engine, the dispute
//! arbiter interface, and the withdrawal/review handlers, all as
//! inherent methods on one shareable [`BrokerEngine`].
//!
//! ## Architecture
//!
//! ```text
//!  chat surface ----\                       /--> notifications (returned,
//!  webhook handler --+--> BrokerEngine ----+     delivered by the surface)
//!  status poll -----/        |              \--> audit log (appended)
//!                            v
//!                   openbroker-store
//!              (trades, ledger, coupons, ...)
//! ```
//!
//! Concurrency: every state transition on a trade runs inside that
//! trade's critical section ([`openbroker_store::KeyedMutex`]); ledger
//! mutations are serialized per account inside the store. The engine is
//! `Send + Sync` and meant to be shared behind an `Arc`.
//!
//! The external payment provider sits behind the [`PaymentGateway`]
//! trait; the core never moves money itself. Gateway failures are
//! fail-closed: they surface as errors with no state changed, and every
//! confirmation path is idempotent so callers may retry freely.

pub mod admin;
pub mod coupon;
pub mod disputes;
pub mod engine;
pub mod gateway;
pub mod lifecycle;
pub mod listings;
pub mod reconciler;
pub mod reviews;
pub mod withdrawals;

pub use engine::BrokerEngine;
pub use gateway::{PaymentGateway, StubGateway};
pub use lifecycle::TradeTicket;
pub use reconciler::PaymentOutcome;
