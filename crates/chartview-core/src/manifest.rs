//! Post-processing of rendered manifest text
//!
//! A render produces one text blob holding every document, each introduced by
//! a `# Source: <chart>/<path>` marker line, with lifecycle hooks appended
//! after the regular manifests. This module turns that blob into individually
//! addressable [`Manifest`]s:
//!
//! 1. split on YAML document separators, keying each document by position
//! 2. order by that position, so renderer order is kept as-is
//! 3. name each document after its source template, minus the chart root
//! 4. drop documents without a source marker and chart test templates

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Manifest;

/// Document separator as emitted by the renderer
pub const DOCUMENT_SEPARATOR: &str = "---";

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s*\n)---\s*").expect("valid regex"));

static SOURCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"# Source: [^/\n]+/(.+)").expect("valid regex"));

const KEY_PREFIX: &str = "manifest-";

/// Split a rendered blob into its documents
///
/// Blank documents are skipped; the rest are trimmed and keyed
/// `manifest-{n}` where `n` counts the kept documents from zero.
pub fn split_manifests(raw: &str) -> IndexMap<String, String> {
    SEPARATOR
        .split(raw)
        .map(str::trim)
        .filter(|doc| !doc.is_empty())
        .enumerate()
        .map(|(n, doc)| (format!("{KEY_PREFIX}{n}"), doc.to_string()))
        .collect()
}

/// Position encoded in a `manifest-{n}` key
///
/// Unknown keys sort last.
fn manifest_index(key: &str) -> usize {
    key.strip_prefix(KEY_PREFIX)
        .and_then(|n| n.parse().ok())
        .unwrap_or(usize::MAX)
}

/// Template path of a document with the chart root stripped
///
/// `# Source: mychart/templates/deployment.yaml` yields
/// `templates/deployment.yaml`.
pub fn source_path(document: &str) -> Option<String> {
    let captures = SOURCE_MARKER.captures(document)?;
    let path = captures.get(1)?.as_str().trim();
    let cleaned: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join("/"))
    }
}

/// Whether a root-relative template path belongs to the chart's tests
///
/// Chart tests live in `tests/` directly under the chart root or, as charts
/// usually lay them out, in `templates/tests/`.
pub fn is_test_path(path: &str) -> bool {
    let mut segments = path.split('/');
    match segments.next() {
        Some("tests") => true,
        Some("templates") => segments.next() == Some("tests"),
        _ => false,
    }
}

/// Turn raw rendered output into named manifests in renderer order
pub fn post_process(raw: &str) -> Vec<Manifest> {
    let documents = split_manifests(raw);

    let mut keys: Vec<&String> = documents.keys().collect();
    keys.sort_by_key(|key| manifest_index(key));

    keys.into_iter()
        .filter_map(|key| {
            let content = &documents[key];
            let name = source_path(content)?;
            if is_test_path(&name) {
                return None;
            }
            Some(Manifest {
                name,
                content: content.clone(),
            })
        })
        .collect()
}

/// Join manifests back into a single multi-document text
pub fn stringify_manifests(manifests: &[Manifest]) -> String {
    let mut buffer = String::new();
    for manifest in manifests {
        buffer.push_str(DOCUMENT_SEPARATOR);
        buffer.push('\n');
        buffer.push_str(&manifest.content);
        buffer.push('\n');
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED: &str = r#"---
# Source: mychart/templates/service.yaml
apiVersion: v1
kind: Service
metadata:
  name: web
---
# Source: mychart/templates/deployment.yaml
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
---
# Source: mychart/templates/tests/connection-test.yaml
apiVersion: v1
kind: Pod
metadata:
  name: web-test
"#;

    #[test]
    fn test_split_keys_by_position() {
        let docs = split_manifests(RENDERED);
        assert_eq!(docs.len(), 3);
        let keys: Vec<&str> = docs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["manifest-0", "manifest-1", "manifest-2"]);
        assert!(docs["manifest-0"].starts_with("# Source: mychart/templates/service.yaml"));
    }

    #[test]
    fn test_split_skips_blank_documents() {
        let docs = split_manifests("\n\n---\n# Source: a/b.yaml\nkind: A\n---\n   \n");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs["manifest-0"], "# Source: a/b.yaml\nkind: A");
    }

    #[test]
    fn test_post_process_names_and_filters_tests() {
        let manifests = post_process(RENDERED);
        let names: Vec<&str> = manifests.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["templates/service.yaml", "templates/deployment.yaml"]
        );
        assert!(manifests[1].content.contains("kind: Deployment"));
    }

    #[test]
    fn test_post_process_drops_unmarked_documents() {
        let raw = concat!(
            "apiVersion: v1\nkind: ConfigMap\n",
            "---\n# Source: mychart/templates/cm.yaml\nkind: ConfigMap\n",
        );
        let manifests = post_process(raw);
        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].name, "templates/cm.yaml");
    }

    #[test]
    fn test_post_process_keeps_renderer_order_past_ten() {
        let raw: String = (0..12)
            .rev()
            .map(|i| format!("---\n# Source: mychart/templates/doc-{i}.yaml\nkind: ConfigMap\n"))
            .collect();

        let names: Vec<String> = post_process(&raw).into_iter().map(|m| m.name).collect();
        let expected: Vec<String> = (0..12)
            .rev()
            .map(|i| format!("templates/doc-{i}.yaml"))
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_post_process_hooks_after_manifests() {
        let raw = concat!(
            "# Source: mychart/templates/deployment.yaml\nkind: Deployment\n",
            "---\n # Source: mychart/templates/job.yaml\nkind: Job\n",
        );
        let manifests = post_process(raw);
        assert_eq!(manifests.len(), 2);
        assert_eq!(manifests[1].name, "templates/job.yaml");
    }

    #[test]
    fn test_source_path_cleans_segments() {
        assert_eq!(
            source_path("# Source: mychart/templates//x.yaml\n").as_deref(),
            Some("templates/x.yaml")
        );
        assert_eq!(source_path("kind: Service"), None);
    }

    #[test]
    fn test_is_test_path() {
        assert!(is_test_path("templates/tests/connection-test.yaml"));
        assert!(is_test_path("tests/fixture.yaml"));
        assert!(!is_test_path("templates/deployment.yaml"));
        assert!(!is_test_path("templates/latests/x.yaml"));
        assert!(!is_test_path("charts/redis/templates/tests/x.yaml"));
    }

    #[test]
    fn test_stringify_round_trip() {
        let manifests = post_process(RENDERED);
        let text = stringify_manifests(&manifests);

        let expected = format!(
            "---\n{}\n---\n{}\n",
            manifests[0].content, manifests[1].content
        );
        assert_eq!(text, expected);

        let again = post_process(&text);
        assert_eq!(again, manifests);
    }

    #[test]
    fn test_stringify_empty() {
        assert_eq!(stringify_manifests(&[]), "");
    }
}
