//! CLI command definitions for the `automater` binary.

pub mod config;
pub mod sign;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Signed-request trigger for GitHub workflow dispatch.
#[derive(Parser)]
#[command(name = "automater", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Path to a TOML configuration file (falls back to AUTOMATER_CONFIG).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP trigger service.
    Serve {
        /// Bind address (overrides AUTOMATER_HOST).
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides AUTOMATER_PORT / PORT).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Compute the headers a caller must send for a request body.
    Sign(sign::SignArgs),

    /// Show the effective configuration with secrets redacted.
    Config,
}
