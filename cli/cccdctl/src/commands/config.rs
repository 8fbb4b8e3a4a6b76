//! `cccd config`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use cccd_codec::{ConfigSummary, ConfigValidation};

use crate::output::{self, print_info, print_success, print_warning, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub struct ConfigCommand {
    /// Save a new default export directory.
    #[arg(long)]
    set_output_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigReport<'a> {
    summary: ConfigSummary,
    validation: ConfigValidation,
    output_dir: &'a std::path::Path,
}

impl ConfigCommand {
    pub fn run(self, mut ctx: CommandContext) -> Result<()> {
        if let Some(dir) = self.set_output_dir {
            ctx.config.output_dir = dir;
            let path = ctx.config.save()?;
            print_success(&format!("Đã lưu cấu hình vào {}", path.display()));
        }

        let report = ConfigReport {
            summary: ctx.limits.summary(),
            validation: ctx.limits.validate(),
            output_dir: &ctx.config.output_dir,
        };

        match ctx.format {
            OutputFormat::Json => output::print_single(&report),
            OutputFormat::Table => {
                output::print_single(&report.summary);
                print_info(&format!("Thư mục xuất: {}", report.output_dir.display()));
                if report.validation.valid {
                    print_success("Cấu hình hợp lệ");
                }
                for error in &report.validation.errors {
                    print_warning(error);
                }
                for warning in &report.validation.warnings {
                    print_warning(warning);
                }
            }
        }

        Ok(())
    }
}
