//! The payment-gateway boundary.
//!
//! The gateway is an opaque external service: the core asks it to mint a
//! payment and later asks for that payment's status, but never moves money
//! itself. Implementations wrap a real provider's client and must enforce
//! their own bounded timeouts; an ambiguous answer is reported as an
//! error, never as a guessed status — the core treats gateway errors as
//! fail-closed and leaves trade state unchanged.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use openbroker_types::{
    BrokerError, PaymentIntent, PaymentRef, PaymentStatus, Result, TradeId,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;

/// Outbound boundary to the external payment provider.
pub trait PaymentGateway: Send + Sync {
    /// Create a payment for `amount`, tagged with the trade id so the
    /// provider's callbacks can be routed back to the right trade.
    ///
    /// # Errors
    /// `GatewayUnavailable` / `GatewayMalformed` on transport or protocol
    /// failure. The caller persists nothing when this fails.
    fn create_payment(&self, amount: Decimal, trade_id: TradeId) -> Result<PaymentIntent>;

    /// Query the current status of a previously created payment.
    ///
    /// # Errors
    /// Same failure modes as [`PaymentGateway::create_payment`]; the
    /// reconciler leaves the trade untouched on error.
    fn payment_status(&self, payment_ref: &PaymentRef) -> Result<PaymentStatus>;
}

/// In-memory gateway for tests and local development.
///
/// Payments start out `Pending`; tests flip them with
/// [`StubGateway::set_status`] to simulate webhook/poll signals.
pub struct StubGateway {
    statuses: Mutex<HashMap<PaymentRef, PaymentStatus>>,
    counter: AtomicU64,
    fail_create: AtomicBool,
    fail_status: AtomicBool,
}

impl StubGateway {
    #[must_use]
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
            fail_create: AtomicBool::new(false),
            fail_status: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `create_payment` fail (simulated outage).
    pub fn set_create_failure(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `payment_status` fail (simulated outage).
    pub fn set_status_failure(&self, fail: bool) {
        self.fail_status.store(fail, Ordering::SeqCst);
    }

    /// Set the status the gateway will report for a payment.
    pub fn set_status(&self, payment_ref: &PaymentRef, status: PaymentStatus) {
        self.statuses.lock().insert(payment_ref.clone(), status);
    }
}

impl Default for StubGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentGateway for StubGateway {
    fn create_payment(&self, _amount: Decimal, trade_id: TradeId) -> Result<PaymentIntent> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BrokerError::GatewayUnavailable {
                reason: "stub outage".into(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let payment_ref = PaymentRef::new(format!("stub-{trade_id}-{n}"));
        self.statuses
            .lock()
            .insert(payment_ref.clone(), PaymentStatus::Pending);
        Ok(PaymentIntent {
            payment_ref,
            redirect_url: format!("https://pay.invalid/checkout/{n}"),
        })
    }

    fn payment_status(&self, payment_ref: &PaymentRef) -> Result<PaymentStatus> {
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(BrokerError::GatewayUnavailable {
                reason: "stub outage".into(),
            });
        }
        self.statuses
            .lock()
            .get(payment_ref)
            .cloned()
            .ok_or_else(|| BrokerError::GatewayMalformed {
                reason: format!("unknown payment reference {payment_ref}"),
            })
    }
}
