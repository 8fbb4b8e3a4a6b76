//! cccdctl (cccd) - command-line tool for CCCD numbers
//!
//! Analyzes, batch-validates and generates Vietnamese citizen identity
//! card numbers without a running server.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

use commands::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so JSON output stays clean (prefer RUST_LOG, fallback to CCCD_LOG_LEVEL)
    let default_level = std::env::var("CCCD_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Run the command
    if let Err(e) = cli.run() {
        // Print error in a user-friendly way
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
