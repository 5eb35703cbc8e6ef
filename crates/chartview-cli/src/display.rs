//! Terminal formatting for catalog listings

use chartview_core::{AnalyticsResult, Chart, Repo};
use chartview_service::SeedReport;
use console::style;

pub fn print_repos(repos: &[Repo]) {
    if repos.is_empty() {
        println!("No repositories seeded.");
        println!();
        println!("Load some with: chartview seed --repo-seed seed.json");
        return;
    }

    println!("{:<20} URL", "NAME");
    println!("{}", "-".repeat(80));
    for repo in repos {
        println!("{:<20} {}", repo.name, repo.url);
    }
}

pub fn print_charts(charts: &[Chart]) {
    println!("{:<40} {:<15} VERSIONS", "NAME", "LATEST");
    println!("{}", "-".repeat(80));
    for chart in charts {
        let latest = chart.versions.first().map(String::as_str).unwrap_or("-");
        println!("{:<40} {:<15} {}", chart.name, latest, chart.versions.len());
    }
}

pub fn print_analysis(kube_version: &str, results: &[AnalyticsResult]) {
    println!(
        "{} Kubernetes {}",
        style("API compatibility with").bold(),
        style(kube_version).cyan()
    );
    for result in results {
        let marker = if result.compatible {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {} {}", marker, result.template.name);
    }

    let incompatible = results.iter().filter(|r| !r.compatible).count();
    if incompatible == 0 {
        println!("{} All templates compatible", style("✓").green().bold());
    } else {
        println!(
            "{} {} template(s) use APIs not served by {}",
            style("✗").red().bold(),
            incompatible,
            kube_version
        );
    }
}

pub fn print_seed_report(report: &SeedReport) {
    println!(
        "{} Warmed {} chart version(s) across {} chart(s) in {} repositories",
        style("✓").green().bold(),
        report.versions,
        report.charts,
        report.repositories
    );
    if report.failures > 0 {
        println!(
            "{} {} item(s) could not be warmed; see the log for details",
            style("⚠").yellow().bold(),
            report.failures
        );
    }
}
