//! Cache-aside catalog reads and content-addressed manifest rendering

use chartview_core::{
    AnalyticsResult, Chart, ChartAnalysis, ChartDetail, KubernetesApiVersion, ManifestResponse,
    Repo, Template, Values, content_hash, post_process, stringify_manifests,
};
use chartview_repo::{CacheStore, ChartSource, IndexFetcher};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::analyzer::Analyzer;
use crate::error::{CatalogError, Result};

/// Store key holding the seeded repository list
pub const REPOS_KEY: &str = "repos";

/// Store key holding the seeded Kubernetes API catalogs
pub const API_VERSIONS_KEY: &str = "api-versions";

const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Store key of a rendered manifest set
pub fn manifest_key(repo: &str, chart: &str, version: &str, hash: &str) -> String {
    format!("manifests-{repo}-{chart}-{version}-{hash}")
}

/// API path a rendered manifest set can be fetched from again
pub fn retrieval_url(repo: &str, chart: &str, version: &str, hash: &str) -> String {
    format!("/api/v1/charts/manifests/{repo}/{chart}/{version}/{hash}")
}

fn values_key(repo: &str, chart: &str, version: &str) -> String {
    format!("value-{repo}-{chart}-{version}")
}

fn templates_key(repo: &str, chart: &str, version: &str) -> String {
    format!("template-{repo}-{chart}-{version}")
}

/// Decode a cached entry; blank or undecodable entries are misses
fn decode_cached<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "undecodable cache entry, treating as a miss");
            None
        }
    }
}

/// The catalog and rendering core
///
/// Every collaborator call runs under the same deadline. Concurrent misses
/// on one key may both fetch and both write; the writes carry the same
/// value, so the last one winning is harmless.
pub struct CatalogService {
    store: Arc<dyn CacheStore>,
    index: Arc<dyn IndexFetcher>,
    charts: Arc<dyn ChartSource>,
    analyzer: Arc<dyn Analyzer>,
    deadline: Duration,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn CacheStore>,
        index: Arc<dyn IndexFetcher>,
        charts: Arc<dyn ChartSource>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        Self {
            store,
            index,
            charts,
            analyzer,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Deadline applied to each store, upstream and analyzer call
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    async fn read(&self, key: &str) -> Result<Option<String>> {
        match timeout(self.deadline, self.store.get(key)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CatalogError::CacheUnavailable {
                key: key.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(CatalogError::CacheUnavailable {
                key: key.to_string(),
                message: format!("no answer within {:?}", self.deadline),
            }),
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value).map_err(|e| CatalogError::CacheWriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        match timeout(self.deadline, self.store.set(key, &encoded)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(CatalogError::CacheWriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(CatalogError::CacheWriteFailed {
                key: key.to_string(),
                message: format!("no answer within {:?}", self.deadline),
            }),
        }
    }

    async fn upstream<T, F>(&self, target: String, call: F) -> Result<T>
    where
        F: Future<Output = chartview_repo::Result<T>>,
    {
        tracing::info!(%target, "outgoing call");
        match timeout(self.deadline, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CatalogError::UpstreamFetchFailed {
                target,
                message: e.to_string(),
            }),
            Err(_) => Err(CatalogError::UpstreamFetchFailed {
                target,
                message: format!("no answer within {:?}", self.deadline),
            }),
        }
    }

    /// Seeded repositories; an absent or undecodable list is empty
    pub async fn list_repos(&self) -> Result<Vec<Repo>> {
        let raw = self.read(REPOS_KEY).await?;
        Ok(decode_cached(REPOS_KEY, raw).unwrap_or_default())
    }

    async fn repository_url(&self, name: &str) -> Result<String> {
        self.list_repos()
            .await?
            .into_iter()
            .find(|r| r.name == name)
            .map(|r| r.url)
            .ok_or_else(|| CatalogError::RepositoryNotFound {
                name: name.to_string(),
            })
    }

    /// Charts of a repository, from its index on a miss
    pub async fn list_charts(&self, repo: &str) -> Result<Vec<Chart>> {
        let raw = self.read(repo).await?;
        if let Some(charts) = decode_cached::<Vec<Chart>>(repo, raw).filter(|c| !c.is_empty()) {
            tracing::debug!(repo, "charts served from cache");
            return Ok(charts);
        }

        let url = self.repository_url(repo).await?;
        let index = self.upstream(url.clone(), self.index.fetch(&url)).await?;
        let charts = index.to_charts();

        self.write(repo, &charts).await?;
        Ok(charts)
    }

    /// Default values of one chart version
    pub async fn get_values(&self, repo: &str, chart: &str, version: &str) -> Result<Values> {
        let key = values_key(repo, chart, version);
        let raw = self.read(&key).await?;
        if let Some(values) = decode_cached::<Values>(&key, raw).filter(|v| !v.is_empty()) {
            tracing::debug!(%key, "values served from cache");
            return Ok(values);
        }

        let url = self.repository_url(repo).await?;
        let values = self
            .upstream(
                format!("{repo}/{chart}:{version}"),
                self.charts.defaults(&url, chart, version),
            )
            .await?;

        self.write(&key, &values).await?;
        Ok(values)
    }

    /// Template files of one chart version
    pub async fn get_templates(
        &self,
        repo: &str,
        chart: &str,
        version: &str,
    ) -> Result<Vec<Template>> {
        let key = templates_key(repo, chart, version);
        let raw = self.read(&key).await?;
        let cached = decode_cached::<Vec<Template>>(&key, raw);
        if let Some(templates) = cached.filter(|t| !t.is_empty()) {
            tracing::debug!(%key, "templates served from cache");
            return Ok(templates);
        }

        let url = self.repository_url(repo).await?;
        let templates = self
            .upstream(
                format!("{repo}/{chart}:{version}"),
                self.charts.templates(&url, chart, version),
            )
            .await?;

        self.write(&key, &templates).await?;
        Ok(templates)
    }

    /// Values then templates; the first failure wins
    pub async fn get_chart_detail(
        &self,
        repo: &str,
        chart: &str,
        version: &str,
    ) -> Result<ChartDetail> {
        let values = self.get_values(repo, chart, version).await?;
        let templates = self.get_templates(repo, chart, version).await?;
        Ok(ChartDetail { values, templates })
    }

    /// Render with `overrides`, at most once per distinct payload
    ///
    /// The SHA-256 of the payload names both the cache entry and the
    /// retrieval URL, so byte-identical payloads share one render.
    pub async fn render(
        &self,
        repo: &str,
        chart: &str,
        version: &str,
        overrides: &str,
    ) -> Result<ManifestResponse> {
        let hash = content_hash(overrides);
        let key = manifest_key(repo, chart, version, &hash);

        let raw = self.read(&key).await?;
        if let Some(response) = decode_cached::<ManifestResponse>(&key, raw) {
            tracing::debug!(%key, "manifests served from cache");
            return Ok(response);
        }

        let url = self.repository_url(repo).await?;
        let rendered = self
            .upstream(
                format!("{repo}/{chart}:{version}"),
                self.charts.render(&url, chart, version, overrides),
            )
            .await?;

        let response = ManifestResponse {
            url: retrieval_url(repo, chart, version, &hash),
            manifests: post_process(&rendered),
        };
        tracing::info!(%key, manifests = response.manifests.len(), "rendered manifests");

        self.write(&key, &response).await?;
        Ok(response)
    }

    /// A previous render as one `---`-separated text
    pub async fn get_rendered_text(
        &self,
        repo: &str,
        chart: &str,
        version: &str,
        hash: &str,
    ) -> Result<String> {
        let key = manifest_key(repo, chart, version, hash);
        let raw = self
            .read(&key)
            .await?
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| CatalogError::ManifestNotFound { key: key.clone() })?;

        let response: ManifestResponse =
            serde_json::from_str(&raw).map_err(|e| CatalogError::DecodeFailed {
                key: key.clone(),
                message: e.to_string(),
            })?;
        Ok(stringify_manifests(&response.manifests))
    }

    /// Check templates against the API catalog of `kube_version`
    ///
    /// A version with no seeded catalog is analyzed against an empty one.
    pub async fn analyze(
        &self,
        templates: &[Template],
        kube_version: &str,
    ) -> Result<Vec<AnalyticsResult>> {
        let raw = self.read(API_VERSIONS_KEY).await?;
        let catalog = decode_cached::<Vec<KubernetesApiVersion>>(API_VERSIONS_KEY, raw)
            .unwrap_or_default()
            .into_iter()
            .rfind(|c| c.kube_version == kube_version)
            .unwrap_or_else(|| {
                tracing::debug!(kube_version, "no API catalog seeded for version");
                KubernetesApiVersion {
                    kube_version: kube_version.to_string(),
                    api_versions: Vec::new(),
                }
            });

        match timeout(self.deadline, self.analyzer.analyze(templates, &catalog)).await {
            Ok(Ok(results)) => Ok(results),
            Ok(Err(e)) => Err(CatalogError::AnalysisFailed {
                message: e.to_string(),
            }),
            Err(_) => Err(CatalogError::AnalysisFailed {
                message: format!("no answer within {:?}", self.deadline),
            }),
        }
    }

    /// Chart defaults with a compatibility verdict per template
    pub async fn get_chart_analysis(
        &self,
        repo: &str,
        chart: &str,
        version: &str,
        kube_version: &str,
    ) -> Result<ChartAnalysis> {
        let detail = self.get_chart_detail(repo, chart, version).await?;
        let templates = self.analyze(&detail.templates, kube_version).await?;
        Ok(ChartAnalysis {
            values: detail.values,
            templates,
        })
    }

    /// Replace the seeded repository list
    ///
    /// A repository's chart list is stored under its bare name, so names that
    /// collide with the service's own keys are refused before anything is
    /// written.
    pub async fn seed_repos(&self, repos: &[Repo]) -> Result<()> {
        if let Some(repo) = repos
            .iter()
            .find(|r| r.name == REPOS_KEY || r.name == API_VERSIONS_KEY)
        {
            return Err(CatalogError::ReservedRepositoryName {
                name: repo.name.clone(),
            });
        }
        self.write(REPOS_KEY, repos).await
    }

    /// Replace the seeded Kubernetes API catalogs
    pub async fn seed_api_versions(&self, catalogs: &[KubernetesApiVersion]) -> Result<()> {
        self.write(API_VERSIONS_KEY, catalogs).await
    }
}
