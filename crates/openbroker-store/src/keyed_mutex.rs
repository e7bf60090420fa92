//! Per-key critical sections.
//!
//! The engine serializes state transitions per trade and the ledger
//! serializes mutations per account. Keys never nest, so there is no lock
//! ordering concern across key domains.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

/// A registry of mutexes keyed by an arbitrary hashable key.
///
/// `with_lock` runs a closure while holding the key's exclusive lock.
/// Different keys proceed in parallel; the same key is fully serialized.
pub struct KeyedMutex<K> {
    slots: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedMutex<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` inside the critical section for `key`.
    ///
    /// Once entered, the section runs to completion; cancellation of the
    /// caller happens outside, never mid-commit.
    pub fn with_lock<R>(&self, key: &K, f: impl FnOnce() -> R) -> R {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key.clone()).or_default())
        };
        let _guard = slot.lock();
        f()
    }

    /// Drop the slot for a key nobody is waiting on (e.g. a trade that
    /// reached a terminal status), keeping the registry bounded.
    pub fn discard(&self, key: &K) {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get(key) {
            if Arc::strong_count(slot) == 1 {
                slots.remove(key);
            }
        }
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedMutex<K> {
    fn default() -> Self {
        Self::new()
    }
}
