//! CLI commands.

mod analyze;
mod batch;
mod config;
mod generate;

use anyhow::Result;
use cccd_codec::Limits;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::output::OutputFormat;

/// cccd - Analyze and generate Vietnamese citizen identity card numbers.
#[derive(Debug, Parser)]
#[command(name = "cccd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (table or json).
    #[arg(long, global = true, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate CCCD numbers matching the given constraints.
    Generate(generate::GenerateCommand),

    /// Analyze a single CCCD number.
    Analyze(analyze::AnalyzeCommand),

    /// Analyze every CCCD number in a file.
    BatchAnalyze(batch::BatchAnalyzeCommand),

    /// Show the effective configuration and limits.
    Config(config::ConfigCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        let format = OutputFormat::parse(&self.format);

        if let Commands::Version = self.command {
            println!("cccd {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }

        let ctx = CommandContext {
            config: Config::load()?,
            format,
            limits: Limits::default(),
        };

        match self.command {
            Commands::Generate(cmd) => cmd.run(ctx),
            Commands::Analyze(cmd) => cmd.run(ctx),
            Commands::BatchAnalyze(cmd) => cmd.run(ctx),
            Commands::Config(cmd) => cmd.run(ctx),
            Commands::Version => Ok(()),
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    pub limits: Limits,
}
