//! Decoding and validation of identity codes.
//!
//! [`Analyzer::analyze`] turns one code into an [`AnalysisResult`];
//! [`Analyzer::batch_analyze`] runs it over a caller-supplied list and
//! aggregates the outcome.

use std::ops::RangeInclusive;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::code::{IdentityCode, SEQUENCE_LEN};
use crate::error::{CodeError, Rejection};
use crate::limits::{InputOperation, Limits, OutputOperation};
use crate::tables::{
    self, LegalBasis, Region, Sex, ACCURACY_NOTES, LEGAL_BASIS, STRUCTURE_BREAKDOWN,
};

/// Sex/century digits the decoder accepts (centuries 20 and 21).
///
/// The digit table itself covers 0-9; digits above 3 are refused here.
pub const SUPPORTED_SEX_CENTURY_DIGITS: RangeInclusive<u8> = 0..=3;

/// Earliest birth year considered plausible.
pub const EARLIEST_BIRTH_YEAR: i32 = 1900;

/// Label used for the most common province when no entry was valid.
const NO_PROVINCE: &str = "Không có";

/// Which optional views to attach to an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeOptions {
    pub detailed: bool,
    pub location: bool,
}

impl AnalyzeOptions {
    /// Core fields only, as used by batch analysis.
    pub const BARE: Self = Self {
        detailed: false,
        location: false,
    };
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            detailed: true,
            location: true,
        }
    }
}

// =============================================================================
// Analysis result
// =============================================================================

/// Full decoding of one code. Created once, never mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub cccd: IdentityCode,
    /// True when every field is individually valid.
    pub valid: bool,
    pub structure: Structure,
    pub summary: Summary,
    pub validation: Validation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_analysis: Option<DetailedAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_info: Option<LocationInfo>,
}

impl AnalysisResult {
    pub fn province_name(&self) -> &'static str {
        self.structure.province.name
    }

    pub fn sex(&self) -> Sex {
        self.structure.gender_century.gender
    }

    pub fn birth_year(&self) -> i32 {
        self.structure.birth_year.full_year
    }

    pub fn current_age(&self) -> u32 {
        self.structure.birth_year.current_age
    }

    pub fn region(&self) -> Region {
        self.structure.province.region
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub province: ProvinceField,
    pub gender_century: SexCenturyField,
    pub birth_year: BirthYearField,
    pub random_sequence: SequenceField,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvinceField {
    pub code: String,
    pub name: &'static str,
    pub region: Region,
    pub valid: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SexCenturyField {
    pub code: u8,
    pub gender: Sex,
    pub century: u8,
    pub valid: bool,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthYearField {
    pub year_code: String,
    pub full_year: i32,
    pub century: u8,
    pub valid: bool,
    pub current_age: u32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SequenceField {
    pub code: String,
    pub number: u32,
    pub valid: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub province_name: &'static str,
    pub gender: Sex,
    pub birth_year: i32,
    pub current_age: u32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub province_valid: bool,
    pub gender_century_valid: bool,
    pub birth_year_valid: bool,
    pub random_sequence_valid: bool,
    pub overall_valid: bool,
    /// Percentage of the four fields that are valid.
    pub validation_score: f64,
}

impl Validation {
    fn from_flags(province: bool, sex_century: bool, birth_year: bool, sequence: bool) -> Self {
        let flags = [province, sex_century, birth_year, sequence];
        let passed = flags.iter().filter(|&&f| f).count();
        Self {
            province_valid: province,
            gender_century_valid: sex_century,
            birth_year_valid: birth_year,
            random_sequence_valid: sequence,
            overall_valid: passed == flags.len(),
            validation_score: passed as f64 / flags.len() as f64 * 100.0,
        }
    }
}

/// Reference material attached on request. Identical for every code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    pub legal_basis: LegalBasis,
    pub structure_breakdown: StructureBreakdown,
    pub accuracy_notes: [&'static str; 4],
}

impl DetailedAnalysis {
    pub fn reference() -> Self {
        Self {
            legal_basis: LEGAL_BASIS,
            structure_breakdown: StructureBreakdown,
            accuracy_notes: ACCURACY_NOTES,
        }
    }
}

/// Serializes as a map from position range to meaning.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureBreakdown;

impl Serialize for StructureBreakdown {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(STRUCTURE_BREAKDOWN.iter().copied())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LocationInfo {
    Known(ProvinceLocation),
    Invalid { error: &'static str },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceLocation {
    pub province_code: String,
    pub province_name: &'static str,
    pub region: Region,
    pub description: String,
}

// =============================================================================
// Batch report
// =============================================================================

/// One entry of a batch: either a full analysis or the reason it failed.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Analyzed(Box<AnalysisResult>),
    Rejected(RejectedEntry),
}

impl BatchEntry {
    pub fn is_valid(&self) -> bool {
        match self {
            BatchEntry::Analyzed(result) => result.valid,
            BatchEntry::Rejected(_) => false,
        }
    }

    pub fn cccd(&self) -> &str {
        match self {
            BatchEntry::Analyzed(result) => result.cccd.as_str(),
            BatchEntry::Rejected(entry) => &entry.cccd,
        }
    }

    /// The analysis, when the entry passed format and field decoding and
    /// every field is valid.
    pub fn valid_analysis(&self) -> Option<&AnalysisResult> {
        match self {
            BatchEntry::Analyzed(result) if result.valid => Some(result),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedEntry {
    pub cccd: String,
    pub valid: bool,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total_analyzed: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub validity_rate: f64,
    pub results: Vec<BatchEntry>,
    pub limits: BatchLimits,
    pub summary: BatchSummary,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchLimits {
    pub input_limit: usize,
    pub output_limit: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub most_common_province: ProvinceCount,
    pub age_distribution: AgeDistribution,
    pub gender_distribution: SexDistribution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvinceCount {
    pub name: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgeDistribution {
    #[serde(rename = "0-17")]
    pub minors: usize,
    #[serde(rename = "18-30")]
    pub from_18_to_30: usize,
    #[serde(rename = "31-45")]
    pub from_31_to_45: usize,
    #[serde(rename = "46-60")]
    pub from_46_to_60: usize,
    #[serde(rename = "61+")]
    pub over_60: usize,
}

impl AgeDistribution {
    fn record(&mut self, age: u32) {
        match age {
            0..=17 => self.minors += 1,
            18..=30 => self.from_18_to_30 += 1,
            31..=45 => self.from_31_to_45 += 1,
            46..=60 => self.from_46_to_60 += 1,
            _ => self.over_60 += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SexDistribution {
    #[serde(rename = "Nam")]
    pub male: usize,
    #[serde(rename = "Nữ")]
    pub female: usize,
}

// =============================================================================
// Analyzer
// =============================================================================

/// Decodes codes against the static tables as of a fixed "today".
#[derive(Debug, Clone)]
pub struct Analyzer {
    limits: Limits,
    today: NaiveDate,
}

impl Analyzer {
    /// Creates an analyzer dated with the local calendar date.
    pub fn new(limits: Limits) -> Self {
        Self::with_today(limits, Local::now().date_naive())
    }

    pub fn with_today(limits: Limits, today: NaiveDate) -> Self {
        Self { limits, today }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Parses and decodes a single code.
    ///
    /// Format problems and an unsupported sex/century digit are errors.
    /// Anything past that yields a result whose `valid` flag reports whether
    /// every field checked out.
    pub fn analyze(&self, input: &str, options: AnalyzeOptions) -> Result<AnalysisResult, CodeError> {
        let code = IdentityCode::parse(input)?;
        self.analyze_code(code, options)
    }

    pub fn analyze_code(
        &self,
        code: IdentityCode,
        options: AnalyzeOptions,
    ) -> Result<AnalysisResult, CodeError> {
        let digit = code.sex_century_digit();
        if !SUPPORTED_SEX_CENTURY_DIGITS.contains(&digit) {
            return Err(CodeError::UnsupportedSexCentury { digit });
        }
        let sex_century =
            tables::sex_century_of(digit).ok_or(CodeError::UnsupportedSexCentury { digit })?;

        let province = province_field(code.province_code());

        let year_value = code.year_value();
        let full_year = sex_century.base_year() + i32::from(year_value);
        let birth_year_valid = year_value <= 99
            && (EARLIEST_BIRTH_YEAR..=self.today.year()).contains(&full_year);
        let current_age = self.age_on_first_of_january(full_year);
        let birth_year = BirthYearField {
            year_code: code.year_code().to_string(),
            full_year,
            century: sex_century.century,
            valid: birth_year_valid,
            current_age,
            description: format!("Năm sinh: {full_year} (thế kỷ {})", sex_century.century),
        };

        let sequence = code.random_sequence();
        let random_sequence = SequenceField {
            code: sequence.to_string(),
            number: sequence.parse().unwrap_or_default(),
            valid: sequence.len() == SEQUENCE_LEN && sequence.bytes().all(|b| b.is_ascii_digit()),
            description: "Dãy số ngẫu nhiên 6 chữ số để đảm bảo tính duy nhất",
        };

        let gender_century = SexCenturyField {
            code: digit,
            gender: sex_century.sex,
            century: sex_century.century,
            valid: true,
            description: sex_century.description(),
        };

        let validation = Validation::from_flags(
            province.valid,
            gender_century.valid,
            birth_year.valid,
            random_sequence.valid,
        );

        let summary = Summary {
            province_name: province.name,
            gender: sex_century.sex,
            birth_year: full_year,
            current_age,
            description: format!(
                "{}, sinh năm {} tại {}, hiện khoảng {} tuổi",
                sex_century.sex, full_year, province.name, current_age
            ),
        };

        let location_info = options.location.then(|| location_info(&province));
        let detailed_analysis = options.detailed.then(DetailedAnalysis::reference);

        debug!(
            cccd = %code,
            valid = validation.overall_valid,
            score = validation.validation_score,
            "Analyzed CCCD"
        );

        Ok(AnalysisResult {
            cccd: code,
            valid: validation.overall_valid,
            structure: Structure {
                province,
                gender_century,
                birth_year,
                random_sequence,
            },
            summary,
            validation,
            detailed_analysis,
            location_info,
        })
    }

    /// Analyzes a list of codes and aggregates the results.
    ///
    /// A list longer than the batch-analysis ceiling is refused outright.
    /// The result list is then capped at the per-request output ceiling.
    pub fn batch_analyze<S: AsRef<str>>(&self, codes: &[S]) -> Result<BatchReport, Rejection> {
        let input_limit = self
            .limits
            .check_input(InputOperation::BatchAnalysis, codes.len())?;
        let retained = &codes[..codes.len().min(input_limit)];

        let mut results: Vec<BatchEntry> = retained
            .iter()
            .map(|code| self.batch_entry(code.as_ref()))
            .collect();

        // Counts and statistics cover every retained entry, not just the returned page.
        let valid_count = results.iter().filter(|entry| entry.is_valid()).count();
        let invalid_count = results.len() - valid_count;
        let total_analyzed = retained.len();
        let summary = summarize(&results);

        let produced = results.len();
        let output = self
            .limits
            .check_output(OutputOperation::MaxResultsPerRequest, produced);
        if output.exceeded {
            results.truncate(output.max_limit);
        }

        let validity_rate = if total_analyzed == 0 {
            0.0
        } else {
            valid_count as f64 / total_analyzed as f64 * 100.0
        };
        let truncated = codes.len() > input_limit || produced > output.max_limit;

        info!(
            total = total_analyzed,
            valid = valid_count,
            invalid = invalid_count,
            truncated,
            "Batch analysis complete"
        );

        Ok(BatchReport {
            total_analyzed,
            valid_count,
            invalid_count,
            validity_rate,
            results,
            limits: BatchLimits {
                input_limit,
                output_limit: output.max_limit,
                truncated,
            },
            summary,
        })
    }

    fn batch_entry(&self, input: &str) -> BatchEntry {
        match self.analyze(input, AnalyzeOptions::BARE) {
            Ok(result) => BatchEntry::Analyzed(Box::new(result)),
            Err(e) => BatchEntry::Rejected(RejectedEntry {
                cccd: input.to_string(),
                valid: false,
                error: e.to_string(),
            }),
        }
    }

    /// Age estimate taking 1 January of the birth year as the birthday.
    fn age_on_first_of_january(&self, birth_year: i32) -> u32 {
        age_on(self.today, birth_year, 1, 1)
    }
}

fn age_on(today: NaiveDate, birth_year: i32, birth_month: u32, birth_day: u32) -> u32 {
    let mut age = today.year() - birth_year;
    if (today.month(), today.day()) < (birth_month, birth_day) {
        age -= 1;
    }
    u32::try_from(age).unwrap_or(0)
}

fn province_field(code: &str) -> ProvinceField {
    let known = tables::lookup_province(code);
    ProvinceField {
        code: code.to_string(),
        name: known.map_or(tables::UNKNOWN_LABEL, |p| p.name),
        region: tables::region_of(code),
        valid: known.is_some(),
        description: "Mã tỉnh/thành phố nơi đăng ký khai sinh",
    }
}

fn location_info(province: &ProvinceField) -> LocationInfo {
    if !province.valid {
        return LocationInfo::Invalid {
            error: "Mã tỉnh không hợp lệ",
        };
    }
    LocationInfo::Known(ProvinceLocation {
        province_code: province.code.clone(),
        province_name: province.name,
        region: province.region,
        description: format!("Tỉnh/thành phố {} - nơi đăng ký khai sinh", province.name),
    })
}

fn summarize(results: &[BatchEntry]) -> BatchSummary {
    let mut province_counts: Vec<(&'static str, usize)> = Vec::new();
    let mut ages = AgeDistribution::default();
    let mut sexes = SexDistribution::default();

    for analysis in results.iter().filter_map(BatchEntry::valid_analysis) {
        let name = analysis.province_name();
        match province_counts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => province_counts.push((name, 1)),
        }

        ages.record(analysis.current_age());

        match analysis.sex() {
            Sex::Male => sexes.male += 1,
            Sex::Female => sexes.female += 1,
        }
    }

    // Stable sort: ties keep first-encountered order.
    province_counts.sort_by(|a, b| b.1.cmp(&a.1));
    let most_common_province = province_counts.first().map_or(
        ProvinceCount {
            name: NO_PROVINCE,
            count: 0,
        },
        |&(name, count)| ProvinceCount { name, count },
    );

    BatchSummary {
        most_common_province,
        age_distribution: ages,
        gender_distribution: sexes,
    }
}
