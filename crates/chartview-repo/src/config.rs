//! Service configuration
//!
//! Read from `~/.config/chartview/config.yaml` unless a path is given.
//! Every field has a default, so an absent file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RepoError, Result};

/// chartview configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    /// SQLite cache location; defaults to the user cache directory
    pub store_path: Option<PathBuf>,

    /// Limit on each HTTP request to a chart repository
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Deadline on each store, upstream and analyzer call of the service
    ///
    /// One chart load is an index request, an archive request and a render,
    /// so this defaults to three request timeouts.
    #[serde(with = "humantime_serde")]
    pub deadline: Option<Duration>,

    /// Address the HTTP server binds to
    pub listen: String,

    /// JSON array of repositories loaded by `seed`
    pub repo_seed: PathBuf,

    /// JSON array of Kubernetes API catalogs loaded by `seed`
    pub kube_version_seed: PathBuf,

    /// Chart versions warmed concurrently per repository while seeding
    pub seed_concurrency: usize,

    /// Fail renders on undefined template variables
    pub strict_templates: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            timeout: Duration::from_secs(30),
            deadline: None,
            listen: "0.0.0.0:9999".to_string(),
            repo_seed: PathBuf::from("seed.json"),
            kube_version_seed: PathBuf::from("api_versions.json"),
            seed_concurrency: 4,
            strict_templates: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the default location, if present
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Service call deadline, configured or derived from `timeout`
    pub fn deadline(&self) -> Duration {
        self.deadline.unwrap_or(self.timeout * 3)
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("chartview").join("config.yaml"))
    }

    /// Cache database location, falling back to the user cache directory
    pub fn resolved_store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        let cache_dir = dirs::cache_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "Could not determine cache directory".to_string(),
        })?;
        Ok(cache_dir.join("chartview").join("cache.db"))
    }

    fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(RepoError::InvalidConfig {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        if self.deadline() < self.timeout {
            return Err(RepoError::InvalidConfig {
                message: format!(
                    "deadline ({:?}) must not be shorter than timeout ({:?})",
                    self.deadline(),
                    self.timeout
                ),
            });
        }
        if self.seed_concurrency == 0 {
            return Err(RepoError::InvalidConfig {
                message: "seedConcurrency must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
