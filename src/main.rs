//! hubberbot CLI entry point.

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hubberbot")]
#[command(about = "Chat extension that looks up people by GitHub handle")]
struct Cli {
    /// Path to config file (optional)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Port to listen on, overriding config and PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = if let Some(config_path) = &cli.config {
        hubberbot::config::Config::load_from_path(config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?
    } else {
        hubberbot::config::Config::load()
            .with_context(|| "failed to load configuration from environment")?
    };

    if let Some(port) = cli.port {
        config.port = port;
    }

    let bind = config.socket_addr().context("invalid listen address")?;
    tracing::info!(
        %bind,
        api_url = %config.github.api_url,
        directory = %format!("{}/{}", config.github.directory_repo, config.github.directory_path),
        "configuration loaded"
    );

    let state = Arc::new(
        hubberbot::api::ApiState::from_config(&config)
            .context("failed to initialize API state")?,
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let server = hubberbot::api::start_http_server(bind, state, shutdown_rx).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received");

    let _ = shutdown_tx.send(true);
    server.await.context("HTTP server task panicked")?;

    tracing::info!("hubberbot stopped");
    Ok(())
}
