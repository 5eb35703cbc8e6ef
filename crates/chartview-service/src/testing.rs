//! In-memory collaborators for service tests

use async_trait::async_trait;
use chartview_core::{AnalyticsResult, KubernetesApiVersion, Template, Values};
use chartview_repo::{
    CacheStore, ChartSource, IndexFetcher, MemoryStore, RepoError, RepositoryIndex,
    Result as RepoResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::analyzer::{AnalysisError, Analyzer, ApiVersionAnalyzer};
use crate::service::CatalogService;

#[derive(Clone)]
enum Behavior {
    Succeed,
    Fail,
    Hang,
}

/// Serves one fixed index, recording every requested URL
#[derive(Clone)]
pub struct FakeIndexFetcher {
    index: String,
    behavior: Behavior,
    urls: Arc<Mutex<Vec<String>>>,
}

impl FakeIndexFetcher {
    pub fn new(index: &str) -> Self {
        Self {
            index: index.to_string(),
            behavior: Behavior::Succeed,
            urls: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            behavior: Behavior::Fail,
            ..Self::new("")
        }
    }

    pub fn hanging() -> Self {
        Self {
            behavior: Behavior::Hang,
            ..Self::new("")
        }
    }

    pub fn fetches(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IndexFetcher for FakeIndexFetcher {
    async fn fetch(&self, repository_url: &str) -> RepoResult<RepositoryIndex> {
        self.urls.lock().unwrap().push(repository_url.to_string());
        match self.behavior {
            Behavior::Succeed => RepositoryIndex::from_yaml(&self.index),
            Behavior::Fail => Err(RepoError::HttpError {
                status: 503,
                url: repository_url.to_string(),
            }),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

/// Chart source with canned defaults, templates and render output
#[derive(Clone)]
pub struct FakeChartSource {
    rendered: String,
    latency: Duration,
    calls: Arc<AtomicUsize>,
    renders: Arc<AtomicUsize>,
    last_overrides: Arc<Mutex<Option<String>>>,
}

impl Default for FakeChartSource {
    fn default() -> Self {
        Self::rendering("")
    }
}

impl FakeChartSource {
    pub fn rendering(output: &str) -> Self {
        Self {
            rendered: output.to_string(),
            latency: Duration::ZERO,
            calls: Arc::default(),
            renders: Arc::default(),
            last_overrides: Arc::default(),
        }
    }

    /// Every render takes `latency` to answer
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Defaults and templates calls
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn last_overrides(&self) -> Option<String> {
        self.last_overrides.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChartSource for FakeChartSource {
    async fn defaults(&self, _: &str, _: &str, _: &str) -> RepoResult<Values> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Values::from_yaml("replicaCount: 1\nimage:\n  tag: latest\n")?)
    }

    async fn templates(&self, _: &str, chart: &str, _: &str) -> RepoResult<Vec<Template>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            Template::new(
                "templates/deployment.yaml",
                format!("apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: {chart}\n"),
            ),
            Template::new("templates/service.yaml", "apiVersion: v1\nkind: Service\n"),
        ])
    }

    async fn render(&self, _: &str, _: &str, _: &str, overrides: &str) -> RepoResult<String> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        *self.last_overrides.lock().unwrap() = Some(overrides.to_string());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.rendered.clone())
    }
}

pub struct FailingAnalyzer;

#[async_trait]
impl Analyzer for FailingAnalyzer {
    async fn analyze(
        &self,
        _: &[Template],
        _: &KubernetesApiVersion,
    ) -> Result<Vec<AnalyticsResult>, AnalysisError> {
        Err(AnalysisError::Template {
            template: "templates/broken.yaml".to_string(),
            message: "unreadable".to_string(),
        })
    }
}

/// A service over clones of the given fakes, so tests keep their handles
pub fn service_with(
    store: &MemoryStore,
    index: &FakeIndexFetcher,
    charts: &FakeChartSource,
) -> CatalogService {
    let store: Arc<dyn CacheStore> = Arc::new(store.clone());
    CatalogService::new(
        store,
        Arc::new(index.clone()),
        Arc::new(charts.clone()),
        Arc::new(ApiVersionAnalyzer::new()),
    )
}
