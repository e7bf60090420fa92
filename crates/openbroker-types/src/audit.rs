//! Audit trail records.
//!
//! Every mutating core operation appends one entry. The log is
//! append-only and hash-chained; the chaining itself lives in the store
//! crate, this is just the record shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// One immutable audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in the chain, starting at 0.
    pub seq: u64,
    /// The account that performed the action.
    pub actor: AccountId,
    /// Machine-grepable action tag, e.g. `TRADE_PAID`.
    pub action: String,
    /// Free-form detail payload.
    pub details: String,
    pub at: DateTime<Utc>,
    /// Digest of the previous entry (all-zero hex for the first entry).
    pub prev_digest: String,
    /// Digest over this entry's fields plus `prev_digest`.
    pub digest: String,
}
