//! Cache stores
//!
//! A cache store is a shared string key/value map with no expiry. Values are
//! JSON documents written by the catalog service; the store never looks
//! inside them.
//!
//! - **SQLite** ([`SqliteStore`]): on-disk, survives restarts (default)
//! - **Memory** ([`MemoryStore`]): process-local, for tests and one-shot runs

mod memory;
mod sqlite;

pub use memory::{MemoryStore, OperationCounts};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use thiserror::Error;

/// Cache store failures
///
/// A missing key is not an error; it reads as `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store backend error: {message}")]
    Backend { message: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Unavailable {
            message: e.to_string(),
        }
    }
}

/// Shared key/value cache
///
/// Implementations must give read-after-write consistency for a single key
/// and be safe to share across tasks.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a key; `Ok(None)` when it was never written
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a key, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
