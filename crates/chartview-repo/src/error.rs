//! Error types for repository operations

use thiserror::Error;

/// Errors raised while talking to chart repositories
#[derive(Debug, Error)]
pub enum RepoError {
    // Configuration
    #[error("Repository URL {url:?} is not usable: {reason}")]
    InvalidRepositoryUrl { url: String, reason: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // Transport
    #[error("{url} answered HTTP {status}")]
    HttpError { status: u16, url: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("No answer within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Repository index is unreadable: {message}")]
    IndexParseError { message: String },

    // Chart lookup and content
    #[error("Chart {name} is not listed in {url}")]
    ChartNotFound { name: String, url: String },

    #[error("Chart {name} has no version {version}")]
    VersionNotFound { name: String, version: String },

    #[error("Index entry {name}@{version} lists no archive URL")]
    NoDownloadUrl { name: String, version: String },

    #[error("Archive digest mismatch for {name}: index says {expected}, download is {actual}")]
    IntegrityCheckFailed {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Chart archive rejected: {0}")]
    InvalidChart(#[from] chartview_core::CoreError),

    #[error("Invalid override values: {message}")]
    InvalidValues { message: String },

    #[error("Render failed: {0}")]
    Render(#[from] chartview_engine::EngineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot encode or decode: {0}")]
    Serialization(String),

    #[error("Background task failed: {message}")]
    Task { message: String },
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepoError>;

impl From<reqwest::Error> for RepoError {
    /// Timeouts are mapped by [`HttpClient`](crate::HttpClient), which knows the deadline
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => RepoError::HttpError {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None if e.is_connect() => RepoError::NetworkError {
                message: format!("cannot connect: {e}"),
            },
            None => RepoError::NetworkError {
                message: e.to_string(),
            },
        }
    }
}

impl From<serde_yaml::Error> for RepoError {
    fn from(e: serde_yaml::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}

impl From<url::ParseError> for RepoError {
    fn from(e: url::ParseError) -> Self {
        RepoError::InvalidRepositoryUrl {
            url: String::new(),
            reason: e.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for RepoError {
    fn from(e: tokio::task::JoinError) -> Self {
        RepoError::Task {
            message: e.to_string(),
        }
    }
}
