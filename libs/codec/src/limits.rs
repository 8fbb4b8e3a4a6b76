//! Ceilings and year bounds consumed by the analyzer and generator.

use serde::Serialize;

use crate::error::{RejectReason, Rejection};
use crate::tables::{self, LegalBasis, LEGAL_BASIS};

/// Operations that accept a caller-chosen count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOperation {
    SingleAnalysis,
    BatchAnalysis,
    GenerationSingle,
    GenerationBatch,
}

/// Result lists that are capped before being returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputOperation {
    MaxResultsPerRequest,
    MaxExportRecords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputLimits {
    pub single_analysis: usize,
    pub batch_analysis: usize,
    pub generation_single: usize,
    pub generation_batch: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            single_analysis: 1,
            batch_analysis: 50,
            generation_single: 100,
            generation_batch: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputLimits {
    pub max_results_per_request: usize,
    pub max_export_records: usize,
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self {
            max_results_per_request: 1000,
            max_export_records: 10_000,
        }
    }
}

/// Outcome of an output-ceiling check. Never an error: callers truncate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputCheck {
    pub max_limit: usize,
    pub exceeded: bool,
}

/// Every tunable the codec reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    pub min_birth_year: i32,
    pub max_birth_year: i32,
    pub default_quantity: usize,
    pub max_quantity: usize,
    pub input: InputLimits,
    pub output: OutputLimits,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_birth_year: 1920,
            max_birth_year: 2025,
            default_quantity: 100,
            max_quantity: 1000,
            input: InputLimits::default(),
            output: OutputLimits::default(),
        }
    }
}

impl Limits {
    pub fn input_ceiling(&self, op: InputOperation) -> usize {
        match op {
            InputOperation::SingleAnalysis => self.input.single_analysis,
            InputOperation::BatchAnalysis => self.input.batch_analysis,
            InputOperation::GenerationSingle => self.input.generation_single,
            InputOperation::GenerationBatch => self.input.generation_batch,
        }
    }

    pub fn output_ceiling(&self, op: OutputOperation) -> usize {
        match op {
            OutputOperation::MaxResultsPerRequest => self.output.max_results_per_request,
            OutputOperation::MaxExportRecords => self.output.max_export_records,
        }
    }

    /// Checks a requested count against an input ceiling.
    ///
    /// Returns the ceiling on success so callers can report it.
    pub fn check_input(&self, op: InputOperation, count: usize) -> Result<usize, Rejection> {
        let max = self.input_ceiling(op);
        if count > max {
            return Err(Rejection::new(
                RejectReason::InputLimitExceeded { max },
                max,
                i64::try_from(count).unwrap_or(i64::MAX),
            ));
        }
        Ok(max)
    }

    pub fn check_output(&self, op: OutputOperation, count: usize) -> OutputCheck {
        let max_limit = self.output_ceiling(op);
        OutputCheck {
            max_limit,
            exceeded: count > max_limit,
        }
    }

    pub fn birth_year_in_range(&self, year: i32) -> bool {
        (self.min_birth_year..=self.max_birth_year).contains(&year)
    }

    /// Sanity-checks the configured values.
    pub fn validate(&self) -> ConfigValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.default_quantity > self.max_quantity {
            errors.push("Default quantity limit cannot be greater than max limit".to_string());
        }
        if self.min_birth_year >= self.max_birth_year {
            errors.push("Min birth year must be less than max birth year".to_string());
        }

        let ceilings = [
            ("single_analysis", self.input.single_analysis),
            ("batch_analysis", self.input.batch_analysis),
            ("generation_single", self.input.generation_single),
            ("generation_batch", self.input.generation_batch),
            ("max_results_per_request", self.output.max_results_per_request),
            ("max_export_records", self.output.max_export_records),
        ];
        for (name, value) in ceilings {
            if value == 0 {
                errors.push(format!("Limit '{name}' must be positive"));
            }
        }

        if self.input.generation_single > self.output.max_results_per_request {
            warnings.push(format!(
                "generation_single ({}) exceeds max_results_per_request ({}); results will be truncated",
                self.input.generation_single, self.output.max_results_per_request
            ));
        }

        ConfigValidation {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            module: "CCCD Analysis & Generation",
            version: env!("CARGO_PKG_VERSION"),
            total_provinces: tables::provinces().len(),
            quantity_limits: QuantityLimits {
                default: self.default_quantity,
                max: self.max_quantity,
            },
            birth_year_range: YearRange {
                min: self.min_birth_year,
                max: self.max_birth_year,
            },
            input_limits: self.input,
            output_limits: self.output,
            features: Features {
                analysis: true,
                generation: true,
                validation: true,
                export: true,
            },
            legal_compliance: LEGAL_BASIS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub module: &'static str,
    pub version: &'static str,
    pub total_provinces: usize,
    pub quantity_limits: QuantityLimits,
    pub birth_year_range: YearRange,
    pub input_limits: InputLimits,
    pub output_limits: OutputLimits,
    pub features: Features,
    pub legal_compliance: LegalBasis,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuantityLimits {
    pub default: usize,
    pub max: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Features {
    pub analysis: bool,
    pub generation: bool,
    pub validation: bool,
    pub export: bool,
}
