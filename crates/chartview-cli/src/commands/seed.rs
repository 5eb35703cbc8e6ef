//! Seed command - load seed files and warm the cache

use chartview_service::Seeder;
use std::path::Path;

use crate::app::App;
use crate::display;
use crate::error::Result;

pub async fn run(
    app: &App,
    repo_seed: Option<&Path>,
    kube_version_seed: Option<&Path>,
) -> Result<()> {
    let repo_seed = repo_seed.unwrap_or(app.config.repo_seed.as_path());
    let kube_version_seed = kube_version_seed.unwrap_or(app.config.kube_version_seed.as_path());

    tracing::info!(
        repos = %repo_seed.display(),
        api_versions = %kube_version_seed.display(),
        "seeding"
    );

    let report = Seeder::new(app.service.clone())
        .with_concurrency(app.config.seed_concurrency)
        .run(repo_seed, kube_version_seed)
        .await?;

    display::print_seed_report(&report);
    Ok(())
}
