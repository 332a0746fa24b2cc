//! In-memory slot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::DurableSlot;
use crate::error::StorageError;

/// Non-persistent slot backed by a map.
///
/// Cheap to clone; clones share the same map, so a test can hand one clone
/// to a store and inspect the other. Counts every `set` call and can be told
/// to fail reads or writes.
#[derive(Clone, Default)]
pub struct MemorySlot {
    inner: Arc<MemorySlotInner>,
}

#[derive(Default)]
struct MemorySlotInner {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemorySlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot holding `value` under `key`.
    #[must_use]
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let slot = Self::new();
        if let Ok(mut values) = slot.inner.values.lock() {
            values.insert(key.to_owned(), value.into());
        }
        slot
    }

    /// Current value under `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.inner
            .values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    /// Number of `set` calls so far, including failed ones.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Make subsequent `get` calls fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `set` calls fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for MemorySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySlot")
            .field("writes", &self.write_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DurableSlot for MemorySlot {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("read rejected".to_string()));
        }

        let values = self
            .inner
            .values
            .lock()
            .map_err(|_| StorageError::Backend("Lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("write rejected".to_string()));
        }

        self.inner
            .values
            .lock()
            .map_err(|_| StorageError::Backend("Lock poisoned".to_string()))?
            .insert(key.to_owned(), value);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
