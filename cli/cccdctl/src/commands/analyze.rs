//! `cccd analyze`.

use std::path::PathBuf;

use anyhow::Result;
use cccd_codec::{AnalysisResult, AnalyzeOptions, Analyzer};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{self, print_output, print_success, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct AnalyzeCommand {
    /// The 12-digit CCCD number.
    cccd: String,

    /// Omit legal basis and structure notes.
    #[arg(long)]
    no_detailed: bool,

    /// Omit location information.
    #[arg(long)]
    no_location: bool,

    /// Save the analysis as JSON (relative paths land in the output directory).
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize, Tabled)]
struct FieldRow {
    #[tabled(rename = "Trường")]
    field: &'static str,

    #[tabled(rename = "Giá trị")]
    value: String,

    #[tabled(rename = "Hợp lệ")]
    valid: &'static str,
}

fn mark(valid: bool) -> &'static str {
    if valid {
        "✓"
    } else {
        "✗"
    }
}

fn field_rows(result: &AnalysisResult) -> Vec<FieldRow> {
    let s = &result.structure;
    vec![
        FieldRow {
            field: "Tỉnh/Thành phố",
            value: format!("{} - {} ({})", s.province.code, s.province.name, s.province.region),
            valid: mark(s.province.valid),
        },
        FieldRow {
            field: "Giới tính/Thế kỷ",
            value: format!("{} - {}", s.gender_century.code, s.gender_century.description),
            valid: mark(s.gender_century.valid),
        },
        FieldRow {
            field: "Năm sinh",
            value: format!(
                "{} ({} tuổi)",
                s.birth_year.full_year, s.birth_year.current_age
            ),
            valid: mark(s.birth_year.valid),
        },
        FieldRow {
            field: "Dãy số ngẫu nhiên",
            value: s.random_sequence.code.clone(),
            valid: mark(s.random_sequence.valid),
        },
    ]
}

impl AnalyzeCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let options = AnalyzeOptions {
            detailed: !self.no_detailed,
            location: !self.no_location,
        };
        let result = Analyzer::new(ctx.limits.clone())
            .analyze(self.cccd.trim(), options)
            .map_err(CliError::from)?;

        match ctx.format {
            OutputFormat::Table => {
                if result.valid {
                    print_success(&format!("CCCD {} hợp lệ", result.cccd));
                }
                println!("{}", result.summary.description);
                print_output(&field_rows(&result), ctx.format);
            }
            OutputFormat::Json => output::print_single(&result),
        }

        if let Some(file) = &self.output {
            let path = ctx.config.resolve_output(file);
            output::write_json(&path, &result)?;
            print_success(&format!("Đã lưu kết quả phân tích vào {}", path.display()));
        }

        ensure_valid(&result)?;
        Ok(())
    }
}

/// Turns a well-formed but invalid code into a failing exit status.
fn ensure_valid(result: &AnalysisResult) -> Result<(), CliError> {
    if result.valid {
        return Ok(());
    }
    Err(CliError::InvalidFields {
        cccd: result.cccd.to_string(),
        score: result.validation.validation_score,
    })
}
