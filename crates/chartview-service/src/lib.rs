//! chartview Service - the catalog and rendering core
//!
//! [`CatalogService`] answers every catalog question cache-first: it reads
//! the shared [`CacheStore`](chartview_repo::CacheStore), and on a miss calls
//! out to the repository index or the chart source, post-processes the
//! result and writes it back. Rendered manifests are content-addressed by
//! the hash of their override payload so they can be fetched again later.
//!
//! [`Seeder`] loads the static repository list and API catalogs and
//! pre-warms the cache by walking every repository.

pub mod analyzer;
pub mod error;
pub mod seed;
pub mod service;

#[cfg(test)]
mod testing;

pub use analyzer::{AnalysisError, Analyzer, ApiVersionAnalyzer};
pub use error::{CatalogError, Result, SeedError};
pub use seed::{SeedReport, Seeder, load_api_versions, load_repos};
pub use service::{API_VERSIONS_KEY, CatalogService, REPOS_KEY, manifest_key, retrieval_url};
