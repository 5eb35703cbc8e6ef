//! Catalog error types

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by [`CatalogService`](crate::CatalogService)
///
/// Nothing is retried; every collaborator failure reaches the caller.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cache unavailable reading {key}: {message}")]
    CacheUnavailable { key: String, message: String },

    #[error("Upstream fetch failed for {target}: {message}")]
    UpstreamFetchFailed { target: String, message: String },

    #[error("Cached value under {key} could not be decoded: {message}")]
    DecodeFailed { key: String, message: String },

    #[error("Cache write failed for {key}: {message}")]
    CacheWriteFailed { key: String, message: String },

    #[error("Analysis failed: {message}")]
    AnalysisFailed { message: String },

    #[error("Repository not found: {name}")]
    RepositoryNotFound { name: String },

    #[error("No rendered manifests under {key}")]
    ManifestNotFound { key: String },

    #[error("Repository name {name} is reserved")]
    ReservedRepositoryName { name: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Failures while loading seed files
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Cannot read seed file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid seed file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
