//! Catalog data model
//!
//! These are the shapes that travel through the cache (as JSON strings) and
//! out of the HTTP API, so the serde field names are part of the contract.

use serde::{Deserialize, Serialize};

use crate::values::Values;

/// A named chart repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    /// Unique repository name (e.g. `stable`)
    pub name: String,

    /// Base URL hosting `index.yaml`
    pub url: String,
}

impl Repo {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A chart and every version published for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    pub name: String,

    /// Versions in repository index order
    #[serde(default)]
    pub versions: Vec<String>,
}

/// A source template file of a chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Path relative to the chart root, e.g. `templates/deployment.yaml`
    pub name: String,
    pub content: String,
}

impl Template {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Default values and templates of one chart version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDetail {
    pub values: Values,
    pub templates: Vec<Template>,
}

/// One rendered document, named after the template it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub content: String,
}

/// Rendered manifests for one override payload, plus where to fetch them again
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestResponse {
    pub url: String,
    #[serde(default)]
    pub manifests: Vec<Manifest>,
}

/// Compatibility verdict for one template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    pub template: Template,
    pub compatible: bool,
}

/// Chart defaults alongside a verdict for every template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartAnalysis {
    pub values: Values,
    pub templates: Vec<AnalyticsResult>,
}

/// API group/versions served by one Kubernetes release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesApiVersion {
    /// Kubernetes version this catalog describes (e.g. `1.22`)
    pub kube_version: String,

    /// Served `group/version` strings (e.g. `apps/v1`, `v1`)
    #[serde(default)]
    pub api_versions: Vec<String>,
}

impl KubernetesApiVersion {
    /// Whether the catalog lists any API at all
    pub fn is_empty(&self) -> bool {
        self.api_versions.is_empty()
    }

    /// Whether `api_version` is served by this release
    pub fn supports(&self, api_version: &str) -> bool {
        self.api_versions.iter().any(|v| v == api_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_json_shape() {
        let json = r#"[{"name":"discourse","versions":["0.3.5","0.3.4"]}]"#;
        let charts: Vec<Chart> = serde_json::from_str(json).unwrap();
        assert_eq!(charts[0].name, "discourse");
        assert_eq!(charts[0].versions, vec!["0.3.5", "0.3.4"]);
        assert_eq!(serde_json::to_string(&charts).unwrap(), json);
    }

    #[test]
    fn test_kubernetes_api_version_camel_case() {
        let json = r#"{"kubeVersion":"1.22","apiVersions":["apps/v1","v1"]}"#;
        let catalog: KubernetesApiVersion = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.kube_version, "1.22");
        assert!(catalog.supports("apps/v1"));
        assert!(!catalog.supports("extensions/v1beta1"));
    }

    #[test]
    fn test_manifest_response_missing_manifests() {
        let response: ManifestResponse = serde_json::from_str(r#"{"url":"/x"}"#).unwrap();
        assert!(response.manifests.is_empty());
    }
}
