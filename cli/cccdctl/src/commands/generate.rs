//! `cccd generate`.

use std::path::PathBuf;

use anyhow::Result;
use cccd_codec::{GeneratedItem, GenerationRequest, Generator};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{self, print_info, print_output, print_success, print_warning, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Province codes to draw from, comma separated (default 001).
    #[arg(short = 'p', long = "provinces", value_delimiter = ',')]
    provinces: Vec<String>,

    /// Sex of the generated holders: Nam or Nữ.
    #[arg(short = 'g', long)]
    gender: Option<String>,

    /// Exact birth year.
    #[arg(short = 'b', long)]
    birth_year: Option<i32>,

    /// Birth year range, e.g. 1990-2000. Ignored when --birth-year is set.
    #[arg(short = 'y', long, value_parser = parse_year_range)]
    year_range: Option<[i32; 2]>,

    /// Number of codes to generate.
    #[arg(short = 'q', long, default_value_t = 10, allow_negative_numbers = true)]
    quantity: i64,

    /// Export the batch as JSON (relative paths land in the output directory).
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize, Tabled)]
struct GeneratedRow {
    #[tabled(rename = "CCCD")]
    cccd: String,

    #[tabled(rename = "Tỉnh/Thành phố")]
    province: &'static str,

    #[tabled(rename = "Giới tính")]
    gender: &'static str,

    #[tabled(rename = "Năm sinh")]
    birth_year: i32,

    #[tabled(rename = "Thế kỷ")]
    century: u8,
}

impl From<&GeneratedItem> for GeneratedRow {
    fn from(item: &GeneratedItem) -> Self {
        Self {
            cccd: item.cccd_number.to_string(),
            province: item.province_name,
            gender: item.gender.as_str(),
            birth_year: item.birth_year,
            century: item.century,
        }
    }
}

/// Parses `START-END` into an inclusive year range.
pub(crate) fn parse_year_range(s: &str) -> Result<[i32; 2], CliError> {
    let invalid = || CliError::InvalidYearRange(s.to_string());
    let (start, end) = s.split_once('-').ok_or_else(invalid)?;
    let start = start.trim().parse().map_err(|_| invalid())?;
    let end = end.trim().parse().map_err(|_| invalid())?;
    Ok([start, end])
}

impl GenerateCommand {
    fn request(&self) -> GenerationRequest {
        GenerationRequest {
            province_codes: (!self.provinces.is_empty()).then(|| self.provinces.clone()),
            gender: self.gender.clone(),
            birth_year: self.birth_year,
            birth_year_range: self.year_range,
            quantity: self.quantity,
        }
    }

    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let generator = Generator::new(ctx.limits.clone());
        let request = self.request();

        let batch = match &self.output {
            Some(_) => generator.generate_export(&request),
            None => generator.generate(&request),
        }
        .map_err(CliError::from)?;

        match ctx.format {
            OutputFormat::Table => {
                let rows: Vec<GeneratedRow> = batch.items.iter().map(GeneratedRow::from).collect();
                print_output(&rows, ctx.format);
                print_info(&format!(
                    "Đã tạo {}/{} CCCD (giới hạn đầu vào {}, đầu ra {})",
                    batch.metadata.actual_quantity,
                    batch.metadata.requested_quantity,
                    batch.metadata.input_limit,
                    batch.metadata.output_limit
                ));
                if batch.metadata.truncated {
                    print_warning("Số lượng yêu cầu đã bị cắt theo giới hạn");
                }
            }
            OutputFormat::Json => output::print_single(&batch),
        }

        if let Some(file) = &self.output {
            let path = ctx.config.resolve_output(file);
            output::write_json(&path, &batch)?;
            print_success(&format!("Đã lưu {} CCCD vào {}", batch.len(), path.display()));
        }

        Ok(())
    }
}
