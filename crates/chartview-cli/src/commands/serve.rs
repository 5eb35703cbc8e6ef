//! Serve command - run the HTTP API

use console::style;
use tokio::net::TcpListener;

use crate::app::App;
use crate::error::{CliError, Result};
use crate::server;

pub async fn run(app: &App, listen: Option<&str>) -> Result<()> {
    let address = listen.unwrap_or(app.config.listen.as_str());
    let listener = TcpListener::bind(address).await.map_err(|e| CliError::Io {
        message: format!("cannot listen on {address}: {e}"),
    })?;

    println!(
        "{} server running on {}",
        style("✓").green().bold(),
        style(format!("http://{address}")).cyan()
    );
    tracing::info!(%address, "server started");

    server::serve(listener, app.service.clone()).await?;
    Ok(())
}
