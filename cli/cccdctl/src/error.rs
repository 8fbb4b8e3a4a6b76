//! Error handling and display for the CLI.

use std::path::PathBuf;

use cccd_codec::{CodeError, Rejection};
use colored::Colorize;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("CCCD không hợp lệ: {0}")]
    InvalidCccd(#[from] CodeError),

    #[error("CCCD {cccd} có trường không hợp lệ (điểm {score:.0}%)")]
    InvalidFields { cccd: String, score: f64 },

    #[error("{0}")]
    Rejected(#[from] Rejection),

    #[error("Không tìm thấy CCCD nào trong file {path:?}")]
    EmptyBatch { path: PathBuf },

    #[error("Khoảng năm sinh không hợp lệ: {0}")]
    InvalidYearRange(String),

    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    // Check for specific error types and provide hints
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        match cli_err {
            CliError::InvalidCccd(e) if e.is_format_error() => {
                eprintln!(
                    "\n{}",
                    "Hint: A CCCD number is exactly 12 digits, e.g. 001010101678.".yellow()
                );
            }
            CliError::InvalidFields { .. } => {
                eprintln!(
                    "\n{}",
                    "Hint: Fields marked ✗ in the breakdown failed validation.".yellow()
                );
            }
            CliError::Rejected(rejection) if rejection.is_limit_error() => {
                eprintln!(
                    "\n{}",
                    format!(
                        "Hint: Split the input into chunks of at most {} items.",
                        rejection.max_limit
                    )
                    .yellow()
                );
            }
            CliError::EmptyBatch { .. } => {
                eprintln!(
                    "\n{}",
                    "Hint: Use a JSON array of strings or one 12-digit number per line.".yellow()
                );
            }
            CliError::InvalidYearRange(_) => {
                eprintln!("\n{}", "Hint: Use the form START-END, e.g. 1990-2000.".yellow());
            }
            _ => {}
        }
    }
}
