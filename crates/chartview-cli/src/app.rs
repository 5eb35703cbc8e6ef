//! Wiring of configuration, store and collaborators into a service

use chartview_engine::Engine;
use chartview_repo::{HttpChartSource, HttpClient, HttpIndexFetcher, ServiceConfig, SqliteStore};
use chartview_service::{ApiVersionAnalyzer, CatalogService};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CliError, Result};

/// Resolved settings plus the service built from them
pub struct App {
    pub config: ServiceConfig,
    pub service: Arc<CatalogService>,
}

/// Load configuration, letting `--store` win over the file
pub fn load_config(config_path: Option<&Path>, store: Option<PathBuf>) -> Result<ServiceConfig> {
    let mut config = match config_path {
        Some(path) => ServiceConfig::load_from(path),
        None => ServiceConfig::load(),
    }
    .map_err(|e| CliError::input(e.to_string()))?;

    if store.is_some() {
        config.store_path = store;
    }
    Ok(config)
}

impl App {
    pub fn open(config: ServiceConfig) -> Result<Self> {
        let store_path = config
            .resolved_store_path()
            .map_err(|e| CliError::input(e.to_string()))?;
        let store = SqliteStore::open_at(&store_path).map_err(|e| CliError::store(e.to_string()))?;

        let client =
            HttpClient::new(config.timeout).map_err(|e| CliError::internal(e.to_string()))?;
        let index = Arc::new(HttpIndexFetcher::new(client.clone()));
        let engine = Engine::builder().strict(config.strict_templates).build();
        let charts = HttpChartSource::new(client, engine).with_index_fetcher(index.clone());

        let service = CatalogService::new(
            Arc::new(store),
            index,
            Arc::new(charts),
            Arc::new(ApiVersionAnalyzer::new()),
        )
        .with_deadline(config.deadline());

        tracing::debug!(
            store = %store_path.display(),
            timeout = ?config.timeout,
            deadline = ?config.deadline(),
            "service ready"
        );
        Ok(Self {
            config,
            service: Arc::new(service),
        })
    }
}
