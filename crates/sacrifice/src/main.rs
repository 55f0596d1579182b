//! Sacrifice - shared chess board server CLI.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use sacrifice_server::ServerConfig;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sacrifice_server=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => run_server(config, host, port).await,
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Run the game server
#[instrument]
async fn run_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => ServerConfig::from_file(path)?,
        None => {
            info!("No config file given, using defaults");
            ServerConfig::default()
        }
    }
    .with_env_port()?;

    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    config.validate()?;

    info!(
        bind = %config.bind_address(),
        reaper_interval_secs = config.reaper_interval_secs(),
        inactivity_timeout_secs = config.inactivity_timeout_secs(),
        "Starting sacrifice server"
    );

    sacrifice_server::run(config).await?;
    Ok(())
}

/// Validate a config file
#[instrument]
fn check_config(path: &Path) -> Result<()> {
    let config = ServerConfig::from_file(path)?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
