//! Read-only catalog commands

use chartview_service::CatalogService;

use crate::display;
use crate::error::{CliError, Result};

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::internal(e.to_string()))?;
    println!("{json}");
    Ok(())
}

pub async fn repos(service: &CatalogService, json: bool) -> Result<()> {
    let repos = service.list_repos().await?;
    if json {
        return print_json(&repos);
    }
    display::print_repos(&repos);
    Ok(())
}

pub async fn charts(service: &CatalogService, repo: &str, json: bool) -> Result<()> {
    let charts = service.list_charts(repo).await?;
    if json {
        return print_json(&charts);
    }
    display::print_charts(&charts);
    Ok(())
}

/// Default values, printed as YAML unless `json` is set
pub async fn values(
    service: &CatalogService,
    repo: &str,
    chart: &str,
    version: &str,
    json: bool,
) -> Result<()> {
    let values = service.get_values(repo, chart, version).await?;
    if json {
        return print_json(&values);
    }
    let yaml = serde_yaml::to_string(&values).map_err(|e| CliError::internal(e.to_string()))?;
    print!("{yaml}");
    Ok(())
}

/// Template sources, each under a `# Source:` header
pub async fn templates(
    service: &CatalogService,
    repo: &str,
    chart: &str,
    version: &str,
    json: bool,
) -> Result<()> {
    let templates = service.get_templates(repo, chart, version).await?;
    if json {
        return print_json(&templates);
    }
    for template in &templates {
        println!("---");
        println!("# Source: {}/{}", chart, template.name);
        println!("{}", template.content.trim_end());
    }
    Ok(())
}
