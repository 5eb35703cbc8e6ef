//! Render command and retrieval of earlier renders

use chartview_service::CatalogService;
use console::style;
use std::path::Path;

use crate::error::{CliError, Result};

/// Render with the overrides in `values_file`, empty when absent
pub async fn run(
    service: &CatalogService,
    repo: &str,
    chart: &str,
    version: &str,
    values_file: Option<&Path>,
    json: bool,
) -> Result<()> {
    let overrides = match values_file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| CliError::Io {
            message: format!("cannot read {}: {e}", path.display()),
        })?,
        None => String::new(),
    };

    let response = service.render(repo, chart, version, &overrides).await?;

    if json {
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| CliError::internal(e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    for manifest in &response.manifests {
        println!("---");
        println!("{}", manifest.content);
    }
    eprintln!(
        "{} {} manifest(s), retrievable at {}",
        style("✓").green().bold(),
        response.manifests.len(),
        style(&response.url).cyan()
    );
    Ok(())
}

pub async fn manifest(
    service: &CatalogService,
    repo: &str,
    chart: &str,
    version: &str,
    hash: &str,
) -> Result<()> {
    let text = service.get_rendered_text(repo, chart, version, hash).await?;
    print!("{text}");
    Ok(())
}
