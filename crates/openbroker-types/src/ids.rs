//! Globally unique identifiers used throughout OpenBroker.
//!
//! All entity IDs use UUIDv7 for time-ordered lexicographic sorting.
//! References handed out by external systems (payment gateway, delivery
//! platform) are opaque string newtypes — the core never parses them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
        )]
        pub struct $name(pub Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            #[must_use]
            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Uuid::from_bytes(bytes))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a user account (buyer, seller, or arbiter).
    AccountId
);

uuid_id!(
    /// Globally unique trade identifier.
    TradeId
);

uuid_id!(
    /// Unique identifier for a seller's standing listing.
    ListingId
);

uuid_id!(
    /// Unique identifier for a discount coupon.
    CouponId
);

uuid_id!(
    /// Unique identifier for a review record.
    ReviewId
);

uuid_id!(
    /// Unique identifier for a withdrawal request.
    WithdrawalId
);

/// Opaque reference to a payment held by the external gateway.
///
/// Minted by the gateway when a payment is created; the core only stores
/// it and hands it back when polling for status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentRef(pub String);

impl PaymentRef {
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pay:{}", self.0)
    }
}

/// Opaque reference to buyer-submitted proof of payment (e.g. a file id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofRef(pub String);

impl ProofRef {
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }
}

impl fmt::Display for ProofRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proof:{}", self.0)
    }
}

/// Opaque delivery target — where the seller delivers the purchased units
/// (e.g. a profile link on the delivery platform).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryTarget(pub String);

impl DeliveryTarget {
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
