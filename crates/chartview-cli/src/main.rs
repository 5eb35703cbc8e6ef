//! chartview CLI - browse, analyze and render chart repositories from a shared cache

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod display;
mod error;
mod exit_codes;
mod server;

use app::App;
use error::Result;

#[derive(Parser)]
#[command(name = "chartview")]
#[command(version)]
#[command(about = "Browse, analyze and render Helm-style chart repositories", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ~/.config/chartview/config.yaml)
    #[arg(long, global = true, env = "CHARTVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Cache database path
    #[arg(long, global = true, env = "CHARTVIEW_STORE")]
    store: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load seed files and pre-warm the cache
    Seed {
        /// Repository list (JSON array of {name, url})
        #[arg(long)]
        repo_seed: Option<PathBuf>,

        /// Kubernetes API catalogs (JSON array of {kubeVersion, apiVersions})
        #[arg(long)]
        kube_version_seed: Option<PathBuf>,
    },

    /// Run the HTTP API
    Serve {
        /// Listen address
        #[arg(long)]
        listen: Option<String>,
    },

    /// List seeded repositories
    Repos {
        #[arg(long)]
        json: bool,
    },

    /// List charts of a repository
    Charts {
        repo: String,

        #[arg(long)]
        json: bool,
    },

    /// Show default values of a chart version
    Values {
        repo: String,
        chart: String,
        #[arg(id = "chart_version", value_name = "VERSION")]
        version: String,

        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Show template sources of a chart version
    Templates {
        repo: String,
        chart: String,
        #[arg(id = "chart_version", value_name = "VERSION")]
        version: String,

        #[arg(long)]
        json: bool,
    },

    /// Render a chart version with override values
    Render {
        repo: String,
        chart: String,
        #[arg(id = "chart_version", value_name = "VERSION")]
        version: String,

        /// YAML overrides file
        #[arg(short = 'f', long = "values")]
        values: Option<PathBuf>,

        /// Print the full response including the retrieval URL
        #[arg(long)]
        json: bool,
    },

    /// Print a previous render by its hash
    Manifest {
        repo: String,
        chart: String,
        #[arg(id = "chart_version", value_name = "VERSION")]
        version: String,
        hash: String,
    },

    /// Check templates against the APIs of a Kubernetes version
    Analyze {
        repo: String,
        chart: String,
        #[arg(id = "chart_version", value_name = "VERSION")]
        version: String,

        #[arg(long)]
        kube_version: String,

        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = app::load_config(cli.config.as_deref(), cli.store)?;
    let app = App::open(config)?;
    let service = app.service.as_ref();

    match cli.command {
        Commands::Seed {
            repo_seed,
            kube_version_seed,
        } => commands::seed::run(&app, repo_seed.as_deref(), kube_version_seed.as_deref()).await,

        Commands::Serve { listen } => commands::serve::run(&app, listen.as_deref()).await,

        Commands::Repos { json } => commands::catalog::repos(service, json).await,

        Commands::Charts { repo, json } => commands::catalog::charts(service, &repo, json).await,

        Commands::Values {
            repo,
            chart,
            version,
            json,
        } => commands::catalog::values(service, &repo, &chart, &version, json).await,

        Commands::Templates {
            repo,
            chart,
            version,
            json,
        } => commands::catalog::templates(service, &repo, &chart, &version, json).await,

        Commands::Render {
            repo,
            chart,
            version,
            values,
            json,
        } => {
            commands::render::run(service, &repo, &chart, &version, values.as_deref(), json).await
        }

        Commands::Manifest {
            repo,
            chart,
            version,
            hash,
        } => commands::render::manifest(service, &repo, &chart, &version, &hash).await,

        Commands::Analyze {
            repo,
            chart,
            version,
            kube_version,
            json,
        } => {
            commands::analyze::run(service, &repo, &chart, &version, &kube_version, json).await
        }
    }
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = dispatch(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
