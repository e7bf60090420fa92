//! System-wide limits and defaults.

/// Lowest accepted review rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted review rating.
pub const MAX_RATING: u8 = 5;

/// Dispute reasons longer than this are truncated by the surface before
/// reaching the core; the core still accepts anything non-empty.
pub const MAX_DISPUTE_REASON_LEN: usize = 500;

/// Domain prefix for audit chain digests.
pub const AUDIT_DIGEST_DOMAIN: &[u8] = b"openbroker:audit:v1:";
