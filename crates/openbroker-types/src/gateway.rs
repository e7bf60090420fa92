//! Types crossing the payment-gateway boundary.
//!
//! The gateway is an opaque external service. It mints payment references
//! and reports payment status; the core interprets the status but never
//! performs payment transport itself.

use serde::{Deserialize, Serialize};

use crate::PaymentRef;

/// Status of an external payment, as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Still in flight. Yields no transition; safe to poll again.
    Pending,
    /// Funds captured. Drives the `awaiting_payment -> paid_awaiting_proof`
    /// transition.
    Succeeded,
    /// Terminal failure (cancelled, expired, declined).
    Failed,
    /// Any other gateway-specific terminal code. Treated like `Failed`.
    Other(String),
}

impl PaymentStatus {
    /// Whether this status should cancel the trade.
    #[must_use]
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Other(_))
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Other(code) => write!(f, "{code}"),
        }
    }
}

/// The gateway's answer to a payment-creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Reference the core stores on the trade and polls with.
    pub payment_ref: PaymentRef,
    /// Where the buyer completes the payment.
    pub redirect_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_failure_classification() {
        assert!(!PaymentStatus::Pending.is_terminal_failure());
        assert!(!PaymentStatus::Succeeded.is_terminal_failure());
        assert!(PaymentStatus::Failed.is_terminal_failure());
        assert!(PaymentStatus::Other("waiting_for_capture".into()).is_terminal_failure());
    }

    #[test]
    fn status_display() {
        assert_eq!(format!("{}", PaymentStatus::Succeeded), "succeeded");
        assert_eq!(
            format!("{}", PaymentStatus::Other("expired".into())),
            "expired"
        );
    }
}
