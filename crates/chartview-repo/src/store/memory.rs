//! In-memory cache store
//!
//! Useful for unit tests and one-shot CLI runs that should not touch disk.
//! Reads and writes can be made to fail on demand, and every operation is
//! counted so tests can assert on cache traffic.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::{CacheStore, StoreError};

/// Counts of operations performed, for test assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub sets: usize,
}

/// In-memory cache store
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    operations: Arc<RwLock<OperationCounts>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated entries
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(map)),
            ..Self::default()
        }
    }

    /// Make every subsequent read fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations
            .read()
            .map(|ops| ops.clone())
            .unwrap_or_default()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        if let Ok(mut ops) = self.operations.write() {
            *ops = OperationCounts::default();
        }
    }

    /// Read a value without counting it
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn count(&self, update: impl FnOnce(&mut OperationCounts)) {
        if let Ok(mut ops) = self.operations.write() {
            update(&mut ops);
        }
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable {
        message: "memory store lock poisoned".to_string(),
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.count(|ops| ops.gets += 1);

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: format!("read of {key} refused"),
            });
        }

        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.count(|ops| ops.sets += 1);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: format!("write of {key} refused"),
            });
        }

        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
