//! `cccd batch-analyze`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use cccd_codec::{BatchEntry, BatchReport, CODE_LEN};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use crate::error::CliError;
use crate::output::{self, print_info, print_output, print_success, print_warning, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct BatchAnalyzeCommand {
    /// File with a JSON array of strings, or one CCCD per line.
    file: PathBuf,

    /// Save the report as JSON (relative paths land in the output directory).
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    #[tabled(rename = "CCCD")]
    cccd: String,

    #[tabled(rename = "Hợp lệ")]
    valid: &'static str,

    #[tabled(rename = "Tỉnh/Thành phố")]
    province: String,

    #[tabled(rename = "Giới tính")]
    gender: String,

    #[tabled(rename = "Năm sinh")]
    birth_year: String,

    #[tabled(rename = "Ghi chú")]
    note: String,
}

impl From<&BatchEntry> for EntryRow {
    fn from(entry: &BatchEntry) -> Self {
        match entry {
            BatchEntry::Analyzed(result) => Self {
                cccd: result.cccd.to_string(),
                valid: if result.valid { "Có" } else { "Không" },
                province: result.province_name().to_string(),
                gender: result.sex().to_string(),
                birth_year: result.birth_year().to_string(),
                note: format!("{:.0}%", result.validation.validation_score),
            },
            BatchEntry::Rejected(rejected) => Self {
                cccd: rejected.cccd.clone(),
                valid: "Không",
                province: "-".to_string(),
                gender: "-".to_string(),
                birth_year: "-".to_string(),
                note: rejected.error.clone(),
            },
        }
    }
}

/// Extracts codes from file contents.
///
/// A JSON array of strings is taken as-is. Anything else is read line by
/// line, keeping only lines that are exactly 12 digits.
pub(crate) fn parse_codes(contents: &str) -> Vec<String> {
    if let Ok(codes) = serde_json::from_str::<Vec<String>>(contents) {
        return codes;
    }
    contents
        .lines()
        .map(str::trim)
        .filter(|line| line.len() == CODE_LEN && line.bytes().all(|b| b.is_ascii_digit()))
        .map(str::to_string)
        .collect()
}

pub(crate) fn read_codes(path: &Path) -> Result<Vec<String>, CliError> {
    let contents = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    let codes = parse_codes(&contents);
    debug!(path = %path.display(), count = codes.len(), "Read batch input");
    if codes.is_empty() {
        return Err(CliError::EmptyBatch {
            path: path.to_path_buf(),
        });
    }
    Ok(codes)
}

fn print_report(report: &BatchReport, format: OutputFormat) {
    print_info(&format!(
        "Đã phân tích {} CCCD: {} hợp lệ, {} không hợp lệ ({:.1}%)",
        report.total_analyzed, report.valid_count, report.invalid_count, report.validity_rate
    ));
    if report.limits.truncated {
        print_warning(&format!(
            "Kết quả đã bị cắt theo giới hạn {}",
            report.limits.output_limit
        ));
    }

    let summary = &report.summary;
    println!(
        "Tỉnh phổ biến nhất: {} ({})",
        summary.most_common_province.name, summary.most_common_province.count
    );
    let ages = &summary.age_distribution;
    println!(
        "Độ tuổi: 0-17: {}, 18-30: {}, 31-45: {}, 46-60: {}, 61+: {}",
        ages.minors, ages.from_18_to_30, ages.from_31_to_45, ages.from_46_to_60, ages.over_60
    );
    println!(
        "Giới tính: Nam: {}, Nữ: {}",
        summary.gender_distribution.male, summary.gender_distribution.female
    );

    let rows: Vec<EntryRow> = report.results.iter().map(EntryRow::from).collect();
    print_output(&rows, format);
}

impl BatchAnalyzeCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let codes = read_codes(&self.file)?;
        let report = cccd_codec::Analyzer::new(ctx.limits.clone())
            .batch_analyze(&codes)
            .map_err(CliError::from)?;

        match ctx.format {
            OutputFormat::Table => print_report(&report, ctx.format),
            OutputFormat::Json => output::print_single(&report),
        }

        if let Some(file) = &self.output {
            let path = ctx.config.resolve_output(file);
            output::write_json(&path, &report)?;
            print_success(&format!("Đã lưu báo cáo vào {}", path.display()));
        }

        Ok(())
    }
}
