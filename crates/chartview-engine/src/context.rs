//! Values visible to templates while rendering

use chartview_core::{ChartMetadata, Values};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_KUBE_VERSION: &str = "1.28";

/// Caller-chosen knobs for a render
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Release name; defaults to the chart name
    pub release_name: Option<String>,

    /// Target namespace; defaults to `default`
    pub namespace: Option<String>,

    /// Kubernetes version exposed as `capabilities.kubeVersion`
    pub kube_version: Option<String>,
}

/// Release information (`release.*` in templates)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    pub name: String,
    pub namespace: String,
    pub service: String,
    pub revision: u32,
    pub is_install: bool,
    pub is_upgrade: bool,
}

impl ReleaseInfo {
    /// A first install, which is what a dry-run preview renders as
    pub fn for_install(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            service: "chartview".to_string(),
            revision: 1,
            is_install: true,
            is_upgrade: false,
        }
    }
}

/// Chart information (`chart.*` in templates)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartInfo {
    pub name: String,
    pub version: String,
    pub app_version: Option<String>,
    pub description: Option<String>,
}

impl From<&ChartMetadata> for ChartInfo {
    fn from(meta: &ChartMetadata) -> Self {
        Self {
            name: meta.name.clone(),
            version: meta.version.clone(),
            app_version: meta.app_version.clone(),
            description: meta.description.clone(),
        }
    }
}

/// Kubernetes version split into its parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubeVersion {
    pub version: String,
    pub major: String,
    pub minor: String,
}

impl KubeVersion {
    pub fn parse(version: &str) -> Self {
        let bare = version.trim().trim_start_matches('v');
        let mut parts = bare.split('.');
        let major = parts.next().filter(|p| !p.is_empty()).unwrap_or("1");
        let minor = parts.next().unwrap_or("0");

        Self {
            version: format!("v{bare}"),
            major: major.to_string(),
            minor: minor.to_string(),
        }
    }
}

/// Cluster capabilities (`capabilities.*` in templates)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub kube_version: KubeVersion,
}

/// Everything a template can see
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderContext {
    /// Chart defaults merged with the caller's overrides
    pub values: JsonValue,
    pub release: ReleaseInfo,
    pub chart: ChartInfo,
    pub capabilities: Capabilities,
}

impl RenderContext {
    pub fn new(values: Values, chart: &ChartMetadata, options: &RenderOptions) -> Self {
        let release_name = options
            .release_name
            .clone()
            .unwrap_or_else(|| chart.name.clone());
        let namespace = options
            .namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let kube_version = options
            .kube_version
            .as_deref()
            .unwrap_or(DEFAULT_KUBE_VERSION);

        Self {
            values: values.into_inner(),
            release: ReleaseInfo::for_install(release_name, namespace),
            chart: ChartInfo::from(chart),
            capabilities: Capabilities {
                kube_version: KubeVersion::parse(kube_version),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ChartMetadata {
        serde_yaml::from_str("name: discourse\nversion: 0.3.5\nappVersion: 2.5.0\n").unwrap()
    }

    #[test]
    fn test_release_defaults_to_chart_name() {
        let ctx = RenderContext::new(Values::new(), &metadata(), &RenderOptions::default());
        assert_eq!(ctx.release.name, "discourse");
        assert_eq!(ctx.release.namespace, "default");
        assert!(ctx.release.is_install);
        assert_eq!(ctx.chart.app_version.as_deref(), Some("2.5.0"));
    }

    #[test]
    fn test_kube_version_parse() {
        let v = KubeVersion::parse("v1.22.3");
        assert_eq!(v.version, "v1.22.3");
        assert_eq!(v.major, "1");
        assert_eq!(v.minor, "22");

        let v = KubeVersion::parse("1.16");
        assert_eq!(v.version, "v1.16");
        assert_eq!(v.minor, "16");
    }
}
