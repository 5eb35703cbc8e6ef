//! API compatibility analysis of one chart version

use chartview_service::CatalogService;

use crate::display;
use crate::error::{CliError, Result};

pub async fn run(
    service: &CatalogService,
    repo: &str,
    chart: &str,
    version: &str,
    kube_version: &str,
    json: bool,
) -> Result<()> {
    let analysis = service
        .get_chart_analysis(repo, chart, version, kube_version)
        .await?;

    if json {
        let json = serde_json::to_string_pretty(&analysis)
            .map_err(|e| CliError::internal(e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    display::print_analysis(kube_version, &analysis.templates);
    Ok(())
}
