//! Append-only, hash-chained audit log.
//!
//! Every mutating core operation appends one entry. Each entry's digest
//! covers its fields plus the previous entry's digest, so any rewrite of
//! history is detectable during later dispute review.

use chrono::Utc;
use openbroker_types::{constants::AUDIT_DIGEST_DOMAIN, AccountId, AuditEntry, BrokerError, Result};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

/// Digest used for the first entry's `prev_digest`.
fn genesis_digest() -> String {
    "0".repeat(64)
}

fn entry_digest(
    seq: u64,
    actor: AccountId,
    action: &str,
    details: &str,
    at_rfc3339: &str,
    prev_digest: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(AUDIT_DIGEST_DOMAIN);
    hasher.update(seq.to_le_bytes());
    hasher.update(actor.0.as_bytes());
    hasher.update(action.as_bytes());
    hasher.update(details.as_bytes());
    hasher.update(at_rfc3339.as_bytes());
    hasher.update(prev_digest.as_bytes());
    hex::encode(hasher.finalize())
}

/// The append-only audit log. Entries are never rewritten.
pub struct AuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl AuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Append one entry and return a copy of it.
    pub fn append(&self, actor: AccountId, action: &str, details: impl Into<String>) -> AuditEntry {
        let details = details.into();
        let mut entries = self.entries.lock();
        let seq = entries.len() as u64;
        let prev_digest = entries
            .last()
            .map_or_else(genesis_digest, |e| e.digest.clone());
        let at = Utc::now();
        let at_str = at.to_rfc3339();
        let digest = entry_digest(seq, actor, action, &details, &at_str, &prev_digest);
        let entry = AuditEntry {
            seq,
            actor,
            action: action.to_string(),
            details,
            at,
            prev_digest,
            digest,
        };
        entries.push(entry.clone());
        entry
    }

    /// Recompute every digest and check the chain links.
    ///
    /// # Errors
    /// Returns `AuditChainBroken` at the first sequence number whose
    /// digest or back-link does not verify.
    pub fn verify_chain(&self) -> Result<()> {
        let entries = self.entries.lock();
        let mut expected_prev = genesis_digest();
        for entry in entries.iter() {
            if entry.prev_digest != expected_prev {
                tracing::warn!(seq = entry.seq, "audit chain back-link mismatch");
                return Err(BrokerError::AuditChainBroken(entry.seq));
            }
            let recomputed = entry_digest(
                entry.seq,
                entry.actor,
                &entry.action,
                &entry.details,
                &entry.at.to_rfc3339(),
                &entry.prev_digest,
            );
            if recomputed != entry.digest {
                tracing::warn!(seq = entry.seq, "audit entry digest mismatch");
                return Err(BrokerError::AuditChainBroken(entry.seq));
            }
            expected_prev = entry.digest.clone();
        }
        Ok(())
    }

    /// Entries performed by `actor`, in append order.
    #[must_use]
    pub fn entries_for(&self, actor: AccountId) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.actor == actor)
            .cloned()
            .collect()
    }

    /// Full snapshot of the log, in append order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
