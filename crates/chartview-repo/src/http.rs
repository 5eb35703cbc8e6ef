//! HTTP access to Helm-style repositories
//!
//! A repository is a base URL serving `index.yaml` plus the chart archives it
//! references.

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::error::{RepoError, Result};
use crate::index::RepositoryIndex;

const INDEX_FILE: &str = "index.yaml";

/// Fetches and parses a repository's index
#[async_trait]
pub trait IndexFetcher: Send + Sync {
    async fn fetch(&self, repository_url: &str) -> Result<RepositoryIndex>;
}

/// `{url}/index.yaml`, tolerating a trailing slash on the base URL
pub fn index_url(repository_url: &str) -> String {
    format!("{}/{}", repository_url.trim_end_matches('/'), INDEX_FILE)
}

/// Resolve an archive URL from the index against the repository URL
///
/// Absolute URLs are used as-is; relative ones are joined onto the
/// repository base.
pub fn resolve_download_url(repository_url: &str, url: &str) -> Result<String> {
    if let Ok(absolute) = Url::parse(url) {
        return Ok(absolute.to_string());
    }

    let base = format!("{}/", repository_url.trim_end_matches('/'));
    let base = Url::parse(&base).map_err(|e| RepoError::InvalidRepositoryUrl {
        url: repository_url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(base.join(url)?.to_string())
}

/// Thin reqwest wrapper with a per-request deadline
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("chartview/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, timeout })
    }

    /// GET a URL and return the body; non-2xx statuses are errors
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "GET");

        let response = self.client.get(url).send().await.map_err(|e| self.map_err(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepoError::HttpError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.map_err(e))?;
        Ok(body.to_vec())
    }

    fn map_err(&self, e: reqwest::Error) -> RepoError {
        if e.is_timeout() {
            RepoError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            e.into()
        }
    }
}

/// Reads `index.yaml` over HTTP
#[derive(Clone)]
pub struct HttpIndexFetcher {
    client: HttpClient,
}

impl HttpIndexFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self::new(HttpClient::new(timeout)?))
    }
}

#[async_trait]
impl IndexFetcher for HttpIndexFetcher {
    async fn fetch(&self, repository_url: &str) -> Result<RepositoryIndex> {
        let url = index_url(repository_url);
        tracing::info!(%url, "fetching repository index");

        let data = self.client.get_bytes(&url).await?;
        RepositoryIndex::from_bytes(&data)
    }
}
