//! In-memory chart archives
//!
//! Chart repositories serve charts as `.tgz` files whose entries all live
//! under a single top-level directory named after the chart:
//!
//! ```text
//! mychart/Chart.yaml
//! mychart/values.yaml
//! mychart/templates/deployment.yaml
//! ```
//!
//! Archives are read fully into memory; nothing is unpacked to disk.

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use tar::{Archive, Builder, Header};

use crate::error::{CoreError, Result};
use crate::model::Template;
use crate::values::Values;

const CHART_FILE: &str = "Chart.yaml";
const VALUES_FILE: &str = "values.yaml";
const TEMPLATES_DIR: &str = "templates/";

/// Chart.yaml contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    #[serde(default)]
    pub api_version: Option<String>,

    pub name: String,

    pub version: String,

    #[serde(default)]
    pub app_version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// `application` or `library`
    #[serde(default)]
    pub r#type: Option<String>,
}

/// A chart archive held in memory
#[derive(Debug, Clone)]
pub struct ChartArchive {
    /// Top-level directory of the archive
    pub root: String,

    /// Parsed Chart.yaml
    pub metadata: ChartMetadata,

    /// File contents keyed by path relative to `root`
    files: BTreeMap<String, Vec<u8>>,
}

impl ChartArchive {
    /// Read a gzipped tarball
    pub fn from_tgz(data: &[u8]) -> Result<Self> {
        let mut archive = Archive::new(GzDecoder::new(data));
        let mut entries = Vec::new();

        for entry in archive.entries()? {
            let mut entry = entry?;
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let path = entry.path()?.to_string_lossy().to_string();
            let mut content = Vec::new();
            entry.read_to_end(&mut content)?;
            entries.push((path, content));
        }

        let root = entries
            .first()
            .and_then(|(path, _)| path.split('/').next())
            .map(str::to_string)
            .ok_or_else(|| CoreError::Archive {
                message: "archive is empty".to_string(),
            })?;

        let prefix = format!("{root}/");
        let mut files = BTreeMap::new();
        for (path, content) in entries {
            let relative = path.strip_prefix(&prefix).ok_or_else(|| CoreError::Archive {
                message: format!("{path} is outside the chart directory {root}"),
            })?;
            files.insert(relative.to_string(), content);
        }

        Self::from_files(root, files)
    }

    /// Build from files keyed by root-relative path
    pub fn from_files(
        root: impl Into<String>,
        files: impl IntoIterator<Item = (String, Vec<u8>)>,
    ) -> Result<Self> {
        let root = root.into();
        let files: BTreeMap<String, Vec<u8>> = files.into_iter().collect();

        let chart_file = files.get(CHART_FILE).ok_or_else(|| CoreError::InvalidChart {
            message: format!("{CHART_FILE} not found in {root}"),
        })?;
        let metadata: ChartMetadata = serde_yaml::from_slice(chart_file)?;

        if metadata.name.is_empty() {
            return Err(CoreError::InvalidChart {
                message: "chart name must not be empty".to_string(),
            });
        }

        Ok(Self {
            root,
            metadata,
            files,
        })
    }

    /// Chart name used in rendered `# Source:` markers
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Raw contents of a root-relative file
    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Default values; a chart without values.yaml has empty defaults
    pub fn values(&self) -> Result<Values> {
        match self.file(VALUES_FILE) {
            Some(data) => Values::from_yaml(&utf8(VALUES_FILE, data)?),
            None => Ok(Values::new()),
        }
    }

    /// Every file under `templates/`, in path order
    pub fn templates(&self) -> Result<Vec<Template>> {
        self.files
            .iter()
            .filter(|(path, _)| path.starts_with(TEMPLATES_DIR))
            .map(|(path, data)| Ok(Template::new(path.clone(), utf8(path, data)?)))
            .collect()
    }

    /// Write the archive back out as a gzipped tarball
    pub fn to_tgz(&self) -> Result<Vec<u8>> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = Builder::new(encoder);

        for (path, content) in &self.files {
            let mut header = Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(0);
            header.set_cksum();
            builder.append_data(
                &mut header,
                format!("{}/{}", self.root, path),
                content.as_slice(),
            )?;
        }

        let encoder = builder.into_inner()?;
        Ok(encoder.finish()?)
    }
}

fn utf8(path: &str, data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec()).map_err(|e| CoreError::Archive {
        message: format!("{path} is not valid UTF-8: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_files() -> Vec<(String, Vec<u8>)> {
        [
            ("Chart.yaml", "apiVersion: v2\nname: mychart\nversion: 0.1.0\n"),
            ("values.yaml", "replicaCount: 2\n"),
            ("templates/service.yaml", "kind: Service\n"),
            ("templates/_helpers.tpl", "{% macro name() %}x{% endmacro %}\n"),
            ("templates/deployment.yaml", "kind: Deployment\n"),
            ("charts/redis/Chart.yaml", "name: redis\nversion: 1.0.0\n"),
        ]
        .into_iter()
        .map(|(p, c)| (p.to_string(), c.as_bytes().to_vec()))
        .collect()
    }

    #[test]
    fn test_templates_sorted_and_scoped() {
        let chart = ChartArchive::from_files("mychart", sample_files()).unwrap();
        let names: Vec<String> = chart.templates().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "templates/_helpers.tpl",
                "templates/deployment.yaml",
                "templates/service.yaml"
            ]
        );
    }

    #[test]
    fn test_values_default_to_empty() {
        let files = sample_files()
            .into_iter()
            .filter(|(p, _)| p != "values.yaml");
        let chart = ChartArchive::from_files("mychart", files).unwrap();
        assert!(chart.values().unwrap().is_empty());
    }

    #[test]
    fn test_missing_chart_yaml() {
        let files = vec![("values.yaml".to_string(), b"a: 1\n".to_vec())];
        let err = ChartArchive::from_files("mychart", files).unwrap_err();
        assert!(matches!(err, CoreError::InvalidChart { .. }));
    }

    #[test]
    fn test_tgz_round_trip() {
        let chart = ChartArchive::from_files("mychart", sample_files()).unwrap();
        let data = chart.to_tgz().unwrap();

        let loaded = ChartArchive::from_tgz(&data).unwrap();
        assert_eq!(loaded.root, "mychart");
        assert_eq!(loaded.name(), "mychart");
        assert_eq!(loaded.metadata.version, "0.1.0");
        assert_eq!(
            loaded.values().unwrap().get("replicaCount"),
            Some(&serde_json::json!(2))
        );
        assert_eq!(loaded.templates().unwrap().len(), 3);
    }

    #[test]
    fn test_empty_archive_is_rejected() {
        let builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let data = builder.into_inner().unwrap().finish().unwrap();
        assert!(matches!(
            ChartArchive::from_tgz(&data),
            Err(CoreError::Archive { .. })
        ));
    }
}
