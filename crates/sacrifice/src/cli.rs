//! Command-line interface for sacrifice.

use clap::{Parser, Subcommand};

/// Sacrifice - one shared chess board for everyone who connects
#[derive(Parser, Debug)]
#[command(name = "sacrifice")]
#[command(about = "Real-time shared chess board server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Path to a TOML config file (defaults are used if absent)
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Host to bind to (overrides config and environment)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate a config file and print the effective settings
    CheckConfig {
        /// Path to the TOML config file
        #[arg(short, long)]
        config: std::path::PathBuf,
    },
}
