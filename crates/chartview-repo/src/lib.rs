//! chartview Repository Collaborators
//!
//! Everything the catalog service talks to, each behind a trait so the
//! service can be exercised with in-memory fakes:
//!
//! - **Cache stores** ([`CacheStore`]): string key/value storage with no
//!   expiry, backed by SQLite ([`SqliteStore`]) or memory ([`MemoryStore`])
//! - **Index fetching** ([`IndexFetcher`]): Helm-style `index.yaml` over HTTP
//! - **Chart sources** ([`ChartSource`]): download a chart archive, read its
//!   defaults and templates, render it through the engine
//!
//! Service configuration ([`ServiceConfig`]) lives here as well.

pub mod config;
pub mod error;
pub mod http;
pub mod index;
pub mod source;
pub mod store;

pub use config::ServiceConfig;
pub use error::{RepoError, Result};
pub use http::{HttpClient, HttpIndexFetcher, IndexFetcher};
pub use index::{ChartEntry, RepositoryIndex};
pub use source::{ChartSource, HttpChartSource};
pub use store::{CacheStore, MemoryStore, OperationCounts, SqliteStore, StoreError};
