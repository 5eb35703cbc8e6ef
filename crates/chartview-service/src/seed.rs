//! Seed loading and cache warming

use chartview_core::{KubernetesApiVersion, Repo};
use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

use crate::error::SeedError;
use crate::service::CatalogService;

/// Outcome of a warming run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub repositories: usize,
    pub charts: usize,
    pub versions: usize,
    pub failures: usize,
}

impl SeedReport {
    fn absorb(&mut self, other: SeedReport) {
        self.repositories += other.repositories;
        self.charts += other.charts;
        self.versions += other.versions;
        self.failures += other.failures;
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, SeedError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Repository list seed file
pub fn load_repos(path: &Path) -> Result<Vec<Repo>, SeedError> {
    load_json(path)
}

/// Kubernetes API catalog seed file
pub fn load_api_versions(path: &Path) -> Result<Vec<KubernetesApiVersion>, SeedError> {
    load_json(path)
}

/// Pre-warms the cache through the service's read paths
pub struct Seeder {
    service: Arc<CatalogService>,
    concurrency: usize,
}

impl Seeder {
    pub fn new(service: Arc<CatalogService>) -> Self {
        Self {
            service,
            concurrency: 4,
        }
    }

    /// Chart versions warmed at once per repository
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Store both seed files, then warm every repository
    ///
    /// A bad API catalog seed only costs analysis accuracy and is logged; a
    /// bad repository seed stops the run.
    pub async fn run(
        &self,
        repo_seed: &Path,
        kube_version_seed: &Path,
    ) -> Result<SeedReport, SeedError> {
        match load_api_versions(kube_version_seed) {
            Ok(catalogs) => {
                if let Err(e) = self.service.seed_api_versions(&catalogs).await {
                    tracing::warn!(error = %e, "cannot store API catalogs");
                } else {
                    tracing::info!(count = catalogs.len(), "seeded API catalogs");
                }
            }
            Err(e) => tracing::warn!(error = %e, "skipping API catalog seed"),
        }

        let repos = load_repos(repo_seed)?;
        self.service.seed_repos(&repos).await?;
        tracing::info!(count = repos.len(), "seeded repositories");

        Ok(self.warm(&repos).await)
    }

    /// Warm charts, defaults and templates of every repository
    pub async fn warm(&self, repos: &[Repo]) -> SeedReport {
        let reports = futures::future::join_all(repos.iter().map(|r| self.warm_repo(r))).await;

        let mut total = SeedReport::default();
        for report in reports {
            total.absorb(report);
        }
        total
    }

    async fn warm_repo(&self, repo: &Repo) -> SeedReport {
        let mut report = SeedReport {
            repositories: 1,
            ..SeedReport::default()
        };

        let charts = match self.service.list_charts(&repo.name).await {
            Ok(charts) => charts,
            Err(e) => {
                tracing::warn!(repo = %repo.name, error = %e, "cannot list charts");
                report.failures += 1;
                return report;
            }
        };
        report.charts = charts.len();

        let pairs: Vec<(&str, &str)> = charts
            .iter()
            .flat_map(|c| c.versions.iter().map(move |v| (c.name.as_str(), v.as_str())))
            .collect();

        let outcomes: Vec<bool> = stream::iter(pairs)
            .map(|(chart, version)| async move {
                match self.service.get_chart_detail(&repo.name, chart, version).await {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::warn!(
                            repo = %repo.name,
                            chart,
                            version,
                            error = %e,
                            "cannot warm chart"
                        );
                        false
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        report.versions = outcomes.iter().filter(|ok| **ok).count();
        report.failures += outcomes.len() - report.versions;
        tracing::debug!(repo = %repo.name, ?report, "warmed repository");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeChartSource, FakeIndexFetcher, service_with};
    use chartview_repo::MemoryStore;
    use tempfile::TempDir;

    const INDEX: &str = concat!(
        "entries:\n",
        "  web:\n    - version: 1.1.0\n    - version: 1.0.0\n",
        "  db:\n    - version: 0.1.0\n",
    );

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_run_seeds_and_warms() {
        let dir = TempDir::new().unwrap();
        let repos = r#"[{"name":"stable","url":"https://charts.example.com"}]"#;
        let repos = write(&dir, "seed.json", repos);
        let kube = r#"[{"kubeVersion":"1.16","apiVersions":["v1"]}]"#;
        let kube = write(&dir, "api_versions.json", kube);

        let store = MemoryStore::new();
        let charts = FakeChartSource::default();
        let service = service_with(&store, &FakeIndexFetcher::new(INDEX), &charts);

        let report = Seeder::new(Arc::new(service)).run(&repos, &kube).await.unwrap();

        assert_eq!(
            report,
            SeedReport {
                repositories: 1,
                charts: 2,
                versions: 3,
                failures: 0
            }
        );
        assert!(store.peek("api-versions").unwrap().contains("1.16"));
        assert!(store.peek("value-stable-web-1.0.0").is_some());
        assert!(store.peek("template-stable-db-0.1.0").is_some());
        assert_eq!(charts.calls(), 6);
    }

    #[tokio::test]
    async fn test_bad_api_catalog_seed_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let repos = write(&dir, "seed.json", "[]");
        let kube = write(&dir, "api_versions.json", "{ nope");

        let store = MemoryStore::new();
        let service = service_with(&store, &FakeIndexFetcher::new(""), &FakeChartSource::default());

        let report = Seeder::new(Arc::new(service)).run(&repos, &kube).await.unwrap();
        assert_eq!(report, SeedReport::default());
        assert_eq!(store.peek("repos").as_deref(), Some("[]"));
        assert_eq!(store.peek("api-versions"), None);
    }

    #[tokio::test]
    async fn test_missing_repo_seed_is_fatal() {
        let dir = TempDir::new().unwrap();
        let kube = write(&dir, "api_versions.json", "[]");
        let store = MemoryStore::new();
        let service = service_with(&store, &FakeIndexFetcher::new(""), &FakeChartSource::default());

        let err = Seeder::new(Arc::new(service))
            .run(&dir.path().join("missing.json"), &kube)
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::Read { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_repository_counts_as_failure() {
        let store = MemoryStore::new();
        let index = FakeIndexFetcher::failing();
        let service = service_with(&store, &index, &FakeChartSource::default());
        let repos = vec![Repo::new("stable", "https://charts.example.com")];
        service.seed_repos(&repos).await.unwrap();

        let report = Seeder::new(Arc::new(service)).with_concurrency(2).warm(&repos).await;
        assert_eq!(report.repositories, 1);
        assert_eq!(report.failures, 1);
        assert_eq!(report.versions, 0);
    }
}
