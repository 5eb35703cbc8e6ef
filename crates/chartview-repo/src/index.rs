//! Repository index types
//!
//! Helm-compatible `index.yaml`. Entries keep their document order, which is
//! the order charts are listed in.

use chartview_core::Chart;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{RepoError, Result};

/// Repository index (Helm-compatible)
///
/// Only the fields the catalog reads are kept; everything else in the
/// document is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryIndex {
    /// Chart versions keyed by chart name
    #[serde(default)]
    pub entries: IndexMap<String, Vec<ChartEntry>>,
}

impl RepositoryIndex {
    /// Parse index from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| RepoError::IndexParseError {
            message: e.to_string(),
        })
    }

    /// Parse index from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let yaml = std::str::from_utf8(bytes).map_err(|e| RepoError::IndexParseError {
            message: format!("Invalid UTF-8: {}", e),
        })?;
        Self::from_yaml(yaml)
    }

    /// Get a specific version of a chart
    pub fn get_version(&self, name: &str, version: &str) -> Option<&ChartEntry> {
        self.entries
            .get(name)?
            .iter()
            .find(|e| e.version == version)
    }

    /// Catalog view: one [`Chart`] per entry, versions in index order
    pub fn to_charts(&self) -> Vec<Chart> {
        self.entries
            .iter()
            .map(|(name, versions)| Chart {
                name: name.clone(),
                versions: versions.iter().map(|v| v.version.clone()).collect(),
            })
            .collect()
    }
}

/// One chart version in the index
///
/// The chart name is the entry's key in [`RepositoryIndex::entries`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartEntry {
    pub version: String,

    /// Archive locations, absolute or relative to the repository URL
    #[serde(default)]
    pub urls: Vec<String>,

    /// SHA256 digest of the archive
    #[serde(default)]
    pub digest: Option<String>,
}

impl ChartEntry {
    /// Get the primary download URL
    pub fn download_url(&self) -> Option<&str> {
        self.urls.first().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
apiVersion: v1
entries:
  zookeeper:
    - name: zookeeper
      version: 2.1.0
      urls:
        - https://charts.example.com/zookeeper-2.1.0.tgz
  acs-engine-autoscaler:
    - name: acs-engine-autoscaler
      version: 2.2.2
      appVersion: 2.1.1
      digest: sha256:abc123
      urls:
        - acs-engine-autoscaler-2.2.2.tgz
  discourse:
    - name: discourse
      version: 0.3.5
      urls: []
    - name: discourse
      version: 0.3.4
generated: "2020-11-19T18:35:17.598447386Z"
"#;

    #[test]
    fn test_to_charts_keeps_document_order() {
        let index = RepositoryIndex::from_yaml(INDEX).unwrap();
        let charts = index.to_charts();

        let names: Vec<&str> = charts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zookeeper", "acs-engine-autoscaler", "discourse"]);
        assert_eq!(charts[2].versions, vec!["0.3.5", "0.3.4"]);
    }

    #[test]
    fn test_entries_without_name_field() {
        let yaml = "entries:\n  acs-engine-autoscaler:\n    - version: 2.2.2\n";
        let charts = RepositoryIndex::from_yaml(yaml).unwrap().to_charts();
        assert_eq!(
            serde_json::to_string(&charts).unwrap(),
            r#"[{"name":"acs-engine-autoscaler","versions":["2.2.2"]}]"#
        );
    }

    #[test]
    fn test_get_version() {
        let index = RepositoryIndex::from_yaml(INDEX).unwrap();
        let entry = index.get_version("acs-engine-autoscaler", "2.2.2").unwrap();
        assert_eq!(entry.digest.as_deref(), Some("sha256:abc123"));
        assert_eq!(entry.download_url(), Some("acs-engine-autoscaler-2.2.2.tgz"));
        assert!(index.get_version("discourse", "9.9.9").is_none());
        assert!(index.get_version("missing", "1.0.0").is_none());
    }

    #[test]
    fn test_invalid_index() {
        assert!(matches!(
            RepositoryIndex::from_yaml("entries: [unclosed"),
            Err(RepoError::IndexParseError { .. })
        ));
    }
}
