//! Kubernetes API compatibility analysis
//!
//! The analyzer looks for literal `apiVersion:` lines in each template and
//! checks them against the API catalog of one Kubernetes release.

use async_trait::async_trait;
use chartview_core::{AnalyticsResult, KubernetesApiVersion, Template};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Cannot analyze {template}: {message}")]
    Template { template: String, message: String },
}

/// Produces one compatibility verdict per template
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        templates: &[Template],
        catalog: &KubernetesApiVersion,
    ) -> Result<Vec<AnalyticsResult>, AnalysisError>;
}

static API_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?:-[ \t]+)?apiVersion:[ \t]*["']?([^\s"'#]+)"#).expect("valid regex")
});

/// Literal API versions declared in a template
///
/// Templated values (`{{ ... }}`) cannot be resolved without rendering and
/// are skipped.
pub fn declared_api_versions(content: &str) -> Vec<&str> {
    API_VERSION
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|v| !v.starts_with('{'))
        .collect()
}

/// Checks declared `apiVersion`s against the catalog
///
/// An empty catalog says nothing about the cluster, so every template is
/// reported compatible.
#[derive(Debug, Default, Clone)]
pub struct ApiVersionAnalyzer;

impl ApiVersionAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn verdict(template: &Template, catalog: &KubernetesApiVersion) -> bool {
        catalog.is_empty()
            || declared_api_versions(&template.content)
                .into_iter()
                .all(|v| catalog.supports(v))
    }
}

#[async_trait]
impl Analyzer for ApiVersionAnalyzer {
    async fn analyze(
        &self,
        templates: &[Template],
        catalog: &KubernetesApiVersion,
    ) -> Result<Vec<AnalyticsResult>, AnalysisError> {
        let results: Vec<AnalyticsResult> = templates
            .iter()
            .map(|template| AnalyticsResult {
                template: template.clone(),
                compatible: Self::verdict(template, catalog),
            })
            .collect();

        let incompatible = results.iter().filter(|r| !r.compatible).count();
        tracing::debug!(
            kube_version = %catalog.kube_version,
            templates = results.len(),
            incompatible,
            "analyzed templates"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> KubernetesApiVersion {
        KubernetesApiVersion {
            kube_version: "1.16".to_string(),
            api_versions: vec!["v1".to_string(), "apps/v1".to_string()],
        }
    }

    #[test]
    fn test_declared_api_versions() {
        let content = r#"
apiVersion: "apps/v1"
kind: Deployment
---
  apiVersion: {{ values.apiVersion }}
---
- apiVersion: 'v1' # comment
"#;
        assert_eq!(declared_api_versions(content), vec!["apps/v1", "v1"]);
    }

    #[tokio::test]
    async fn test_flags_removed_api() {
        let templates = vec![
            Template::new(
                "templates/deployment.yaml",
                "apiVersion: extensions/v1beta1\nkind: Deployment\n",
            ),
            Template::new("templates/service.yaml", "apiVersion: v1\nkind: Service\n"),
            Template::new("templates/_helpers.tpl", "{% macro name() %}x{% endmacro %}"),
        ];

        let results = ApiVersionAnalyzer::new()
            .analyze(&templates, &catalog())
            .await
            .unwrap();

        let verdicts: Vec<bool> = results.iter().map(|r| r.compatible).collect();
        assert_eq!(verdicts, vec![false, true, true]);
        assert_eq!(results[0].template.name, "templates/deployment.yaml");
    }

    #[tokio::test]
    async fn test_empty_catalog_is_compatible() {
        let templates = vec![Template::new("templates/x.yaml", "apiVersion: batch/v2alpha1\n")];
        let results = ApiVersionAnalyzer::new()
            .analyze(&templates, &KubernetesApiVersion::default())
            .await
            .unwrap();
        assert!(results[0].compatible);
    }
}
