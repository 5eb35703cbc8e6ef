//! Chart sources: defaults, templates and rendered output of one chart version

use async_trait::async_trait;
use chartview_core::digest::{content_hash, digest_matches};
use chartview_core::{ChartArchive, Template, Values};
use chartview_engine::{Engine, RenderOptions};
use std::sync::Arc;

use crate::error::{RepoError, Result};
use crate::http::{HttpClient, HttpIndexFetcher, IndexFetcher, resolve_download_url};

/// Reads chart content from a repository
#[async_trait]
pub trait ChartSource: Send + Sync {
    /// Default configuration (`values.yaml`)
    async fn defaults(&self, repository_url: &str, chart: &str, version: &str) -> Result<Values>;

    /// Template files, named relative to the chart root
    async fn templates(
        &self,
        repository_url: &str,
        chart: &str,
        version: &str,
    ) -> Result<Vec<Template>>;

    /// Raw multi-document manifest text for the given YAML overrides
    async fn render(
        &self,
        repository_url: &str,
        chart: &str,
        version: &str,
        overrides: &str,
    ) -> Result<String>;
}

/// Downloads archives over HTTP and renders them with the chartview engine
pub struct HttpChartSource {
    client: HttpClient,
    index: Arc<dyn IndexFetcher>,
    engine: Engine,
    options: RenderOptions,
}

impl HttpChartSource {
    pub fn new(client: HttpClient, engine: Engine) -> Self {
        let index = Arc::new(HttpIndexFetcher::new(client.clone()));
        Self {
            client,
            index,
            engine,
            options: RenderOptions::default(),
        }
    }

    /// Locate charts through a different index fetcher
    pub fn with_index_fetcher(mut self, index: Arc<dyn IndexFetcher>) -> Self {
        self.index = index;
        self
    }

    /// Release name, namespace and Kubernetes version used for renders
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Download, verify and unpack one chart version
    pub async fn load(
        &self,
        repository_url: &str,
        chart: &str,
        version: &str,
    ) -> Result<ChartArchive> {
        let index = self.index.fetch(repository_url).await?;
        if !index.entries.contains_key(chart) {
            return Err(RepoError::ChartNotFound {
                name: chart.to_string(),
                url: repository_url.to_string(),
            });
        }
        let entry = index
            .get_version(chart, version)
            .ok_or_else(|| RepoError::VersionNotFound {
                name: chart.to_string(),
                version: version.to_string(),
            })?;

        let url = entry.download_url().ok_or_else(|| RepoError::NoDownloadUrl {
            name: chart.to_string(),
            version: version.to_string(),
        })?;
        let url = resolve_download_url(repository_url, url)?;

        tracing::info!(chart, version, %url, "downloading chart archive");
        let data = self.client.get_bytes(&url).await?;

        if let Some(expected) = &entry.digest {
            let actual = content_hash(&data);
            if !digest_matches(expected, &actual) {
                return Err(RepoError::IntegrityCheckFailed {
                    name: format!("{chart}@{version}"),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let archive = tokio::task::spawn_blocking(move || ChartArchive::from_tgz(&data)).await??;
        Ok(archive)
    }
}

#[async_trait]
impl ChartSource for HttpChartSource {
    async fn defaults(&self, repository_url: &str, chart: &str, version: &str) -> Result<Values> {
        let archive = self.load(repository_url, chart, version).await?;
        Ok(archive.values()?)
    }

    async fn templates(
        &self,
        repository_url: &str,
        chart: &str,
        version: &str,
    ) -> Result<Vec<Template>> {
        let archive = self.load(repository_url, chart, version).await?;
        Ok(archive.templates()?)
    }

    async fn render(
        &self,
        repository_url: &str,
        chart: &str,
        version: &str,
        overrides: &str,
    ) -> Result<String> {
        let overrides = Values::from_yaml(overrides).map_err(|e| RepoError::InvalidValues {
            message: e.to_string(),
        })?;
        let archive = self.load(repository_url, chart, version).await?;

        let engine = self.engine.clone();
        let options = self.options.clone();
        let rendered = tokio::task::spawn_blocking(move || {
            engine.render_chart(&archive, &overrides, &options)
        })
        .await??;

        Ok(rendered.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn archive() -> Vec<u8> {
        let files = [
            ("Chart.yaml", "name: web\nversion: 1.0.0\n"),
            ("values.yaml", "replicaCount: 1\n"),
            (
                "templates/deployment.yaml",
                concat!(
                    "apiVersion: apps/v1\nkind: Deployment\n",
                    "spec:\n  replicas: {{ values.replicaCount }}\n",
                ),
            ),
            (
                "templates/tests/test-connection.yaml",
                "apiVersion: v1\nkind: Pod\n",
            ),
        ]
        .into_iter()
        .map(|(p, c)| (p.to_string(), c.as_bytes().to_vec()));

        ChartArchive::from_files("web", files).unwrap().to_tgz().unwrap()
    }

    async fn serve(digest: Option<String>) -> MockServer {
        let data = archive();
        let digest = digest.unwrap_or_else(|| content_hash(&data));
        let index = format!(
            "entries:\n  web:\n    - version: 1.0.0\n      digest: \"{digest}\"\n      \
             urls:\n        - charts/web-1.0.0.tgz\n"
        );

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repo/index.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(index))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repo/charts/web-1.0.0.tgz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(data))
            .mount(&server)
            .await;
        server
    }

    fn source() -> HttpChartSource {
        HttpChartSource::new(
            HttpClient::new(Duration::from_secs(5)).unwrap(),
            Engine::default(),
        )
    }

    #[tokio::test]
    async fn test_defaults_and_templates() {
        let server = serve(None).await;
        let url = format!("{}/repo", server.uri());
        let source = source();

        let values = source.defaults(&url, "web", "1.0.0").await.unwrap();
        assert_eq!(values.get("replicaCount"), Some(&serde_json::json!(1)));

        let templates = source.templates(&url, "web", "1.0.0").await.unwrap();
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["templates/deployment.yaml", "templates/tests/test-connection.yaml"]
        );
    }

    #[tokio::test]
    async fn test_render_applies_overrides() {
        let server = serve(None).await;
        let url = format!("{}/repo", server.uri());

        let text = source()
            .render(&url, "web", "1.0.0", "replicaCount: 4\n")
            .await
            .unwrap();

        assert!(text.contains("# Source: web/templates/deployment.yaml"));
        assert!(text.contains("replicas: 4"));
    }

    #[tokio::test]
    async fn test_digest_mismatch() {
        let server = serve(Some("sha256:deadbeef".to_string())).await;
        let url = format!("{}/repo", server.uri());

        let err = source().defaults(&url, "web", "1.0.0").await.unwrap_err();
        assert!(matches!(err, RepoError::IntegrityCheckFailed { .. }));
    }

    #[tokio::test]
    async fn test_unknown_chart_and_version() {
        let server = serve(None).await;
        let url = format!("{}/repo", server.uri());
        let source = source();

        assert!(matches!(
            source.defaults(&url, "missing", "1.0.0").await,
            Err(RepoError::ChartNotFound { .. })
        ));
        assert!(matches!(
            source.defaults(&url, "web", "9.9.9").await,
            Err(RepoError::VersionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_overrides() {
        let server = serve(None).await;
        let url = format!("{}/repo", server.uri());

        let err = source()
            .render(&url, "web", "1.0.0", "replicaCount: [unclosed")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidValues { .. }));
    }
}
