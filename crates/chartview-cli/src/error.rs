//! CLI error types with exit code handling

use chartview_service::{CatalogError, SeedError};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Cache store could not be used
    #[error("Cache error: {message}")]
    #[diagnostic(code(chartview::cli::store))]
    Store {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Repository index or chart archive unavailable
    #[error("Upstream error: {message}")]
    #[diagnostic(code(chartview::cli::upstream))]
    Upstream { message: String },

    #[error("{message}")]
    #[diagnostic(code(chartview::cli::not_found))]
    NotFound {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Configuration, seed or values input rejected
    #[error("Invalid input: {message}")]
    #[diagnostic(code(chartview::cli::input))]
    Input { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(chartview::cli::io))]
    Io { message: String },

    #[error("Internal error: {message}")]
    #[diagnostic(code(chartview::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Store { .. } => exit_codes::STORE_ERROR,
            CliError::Upstream { .. } => exit_codes::UPSTREAM_ERROR,
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::Input { .. } => exit_codes::CONFIG_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            help: Some("Check the --store path or the storePath configuration key".to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::CacheUnavailable { .. }
            | CatalogError::CacheWriteFailed { .. }
            | CatalogError::DecodeFailed { .. } => CliError::Store {
                message,
                help: None,
            },
            CatalogError::UpstreamFetchFailed { .. } => CliError::Upstream { message },
            CatalogError::RepositoryNotFound { .. } => CliError::NotFound {
                message,
                help: Some("Run 'chartview seed' to load the repository list".to_string()),
            },
            CatalogError::ManifestNotFound { .. } => CliError::NotFound {
                message,
                help: Some("Render the chart first; its output names the hash".to_string()),
            },
            CatalogError::ReservedRepositoryName { .. } => CliError::Input { message },
            CatalogError::AnalysisFailed { .. } => CliError::Internal { message },
        }
    }
}

impl From<SeedError> for CliError {
    fn from(err: SeedError) -> Self {
        match err {
            SeedError::Catalog(e) => e.into(),
            SeedError::Read { .. } => CliError::Io {
                message: err.to_string(),
            },
            SeedError::Parse { .. } => CliError::input(err.to_string()),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
