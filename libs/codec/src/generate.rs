//! Synthesis of syntactically valid identity codes.
//!
//! Generated codes are unique within one call only. Nothing is shared between
//! calls, so a [`Generator`] can be used from any number of threads.

use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::code::IdentityCode;
use crate::error::{ItemError, RejectReason, Rejection};
use crate::limits::{InputOperation, Limits, OutputOperation};
use crate::tables::{self, Sex, DEFAULT_PROVINCE};

/// Retry budget for drawing a sequence not yet used in the current batch.
pub const MAX_ATTEMPTS: u32 = 10_000;

/// Largest six-digit random sequence.
const MAX_SEQUENCE: u32 = 999_999;

fn default_quantity() -> i64 {
    10
}

/// Caller input for a generation call, as received on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub province_codes: Option<Vec<String>>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub birth_year_range: Option<[i32; 2]>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            province_codes: None,
            gender: None,
            birth_year: None,
            birth_year_range: None,
            quantity: default_quantity(),
        }
    }
}

impl GenerationRequest {
    /// Checks the request and resolves it into constraints.
    ///
    /// `op` picks the ceiling the quantity is clamped to and the ceiling
    /// reported in a rejection.
    pub fn validate(
        &self,
        limits: &Limits,
        op: InputOperation,
    ) -> Result<GenerationConstraints, Rejection> {
        let ceiling = limits.input_ceiling(op);
        let reject = |reason| Rejection::new(reason, ceiling, self.quantity);

        let requested = usize::try_from(self.quantity)
            .ok()
            .filter(|&q| q > 0)
            .ok_or_else(|| reject(RejectReason::InvalidQuantity))?;

        if matches!(&self.province_codes, Some(codes) if codes.is_empty()) {
            return Err(reject(RejectReason::EmptyProvinceList));
        }

        let sex = match self.gender.as_deref().filter(|g| !g.is_empty()) {
            None => None,
            Some(value) => Some(value.parse::<Sex>().map_err(|value| {
                reject(RejectReason::InvalidSex { value })
            })?),
        };

        let birth_years = match (self.birth_year, self.birth_year_range) {
            (Some(year), _) => {
                if !limits.birth_year_in_range(year) {
                    return Err(reject(RejectReason::BirthYearOutOfRange {
                        year,
                        min: limits.min_birth_year,
                        max: limits.max_birth_year,
                    }));
                }
                BirthYears::Fixed(year)
            }
            (None, Some([start, end])) => {
                if start > end
                    || !limits.birth_year_in_range(start)
                    || !limits.birth_year_in_range(end)
                {
                    return Err(reject(RejectReason::InvalidYearRange {
                        start,
                        end,
                        min: limits.min_birth_year,
                        max: limits.max_birth_year,
                    }));
                }
                BirthYears::Range { start, end }
            }
            (None, None) => BirthYears::Range {
                start: limits.min_birth_year,
                end: limits.max_birth_year,
            },
        };

        let provinces: Vec<&'static str> = match &self.province_codes {
            None => vec![DEFAULT_PROVINCE],
            Some(codes) => codes
                .iter()
                .filter_map(|code| tables::lookup_province(code))
                .map(|province| province.code)
                .collect(),
        };
        if provinces.is_empty() {
            return Err(reject(RejectReason::NoValidProvince));
        }

        Ok(GenerationConstraints {
            provinces,
            sex,
            birth_years,
            requested: self.quantity,
            quantity: requested.min(ceiling),
            input_limit: ceiling,
        })
    }
}

/// Where birth years are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirthYears {
    Fixed(i32),
    /// Inclusive on both ends.
    Range { start: i32, end: i32 },
}

impl BirthYears {
    fn draw<R: Rng + ?Sized>(self, rng: &mut R) -> i32 {
        match self {
            BirthYears::Fixed(year) => year,
            BirthYears::Range { start, end } => rng.random_range(start..=end),
        }
    }
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConstraints {
    /// Known province codes to choose from, duplicates kept as weights.
    pub provinces: Vec<&'static str>,
    pub sex: Option<Sex>,
    pub birth_years: BirthYears,
    /// Quantity as asked for.
    pub requested: i64,
    /// Quantity after clamping to the input ceiling.
    pub quantity: usize,
    pub input_limit: usize,
}

// =============================================================================
// Output
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchMetadata {
    pub input_limit: usize,
    pub output_limit: usize,
    pub requested_quantity: i64,
    pub actual_quantity: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedItem {
    pub cccd_number: IdentityCode,
    pub province_code: &'static str,
    pub province_name: &'static str,
    pub gender: Sex,
    pub birth_year: i32,
    pub century: u8,
    pub gender_century_code: u8,
    pub random_sequence: String,
    /// Present on the first item of a batch only.
    #[serde(rename = "_metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BatchMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedBatch {
    pub items: Vec<GeneratedItem>,
    pub metadata: BatchMetadata,
}

impl GeneratedBatch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Generator
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Generator {
    limits: Limits,
}

impl Generator {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Generates a batch under the single-request ceilings.
    pub fn generate(&self, request: &GenerationRequest) -> Result<GeneratedBatch, Rejection> {
        self.generate_with_rng(request, &mut rand::rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
    ) -> Result<GeneratedBatch, Rejection> {
        self.run(
            request,
            InputOperation::GenerationSingle,
            OutputOperation::MaxResultsPerRequest,
            rng,
        )
    }

    /// Generates a batch under the export ceilings.
    pub fn generate_export(&self, request: &GenerationRequest) -> Result<GeneratedBatch, Rejection> {
        self.generate_export_with_rng(request, &mut rand::rng())
    }

    pub fn generate_export_with_rng<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        rng: &mut R,
    ) -> Result<GeneratedBatch, Rejection> {
        self.run(
            request,
            InputOperation::GenerationBatch,
            OutputOperation::MaxExportRecords,
            rng,
        )
    }

    fn run<R: Rng + ?Sized>(
        &self,
        request: &GenerationRequest,
        input_op: InputOperation,
        output_op: OutputOperation,
        rng: &mut R,
    ) -> Result<GeneratedBatch, Rejection> {
        let constraints = request.validate(&self.limits, input_op)?;

        let mut seen = HashSet::with_capacity(constraints.quantity);
        let mut items = Vec::with_capacity(constraints.quantity);
        for index in 0..constraints.quantity {
            match synthesize(&constraints, &mut seen, rng) {
                Ok(item) => items.push(item),
                Err(e) => warn!(index, error = %e, "Skipping generated item"),
            }
        }

        let produced = items.len();
        let output = self.limits.check_output(output_op, produced);
        if output.exceeded {
            items.truncate(output.max_limit);
        }

        let metadata = BatchMetadata {
            input_limit: constraints.input_limit,
            output_limit: output.max_limit,
            requested_quantity: constraints.requested,
            actual_quantity: items.len(),
            truncated: constraints.requested > constraints.input_limit as i64
                || produced > output.max_limit,
        };
        if let Some(first) = items.first_mut() {
            first.metadata = Some(metadata);
        }

        debug!(
            requested = constraints.requested,
            generated = items.len(),
            truncated = metadata.truncated,
            "Generated CCCD batch"
        );

        Ok(GeneratedBatch { items, metadata })
    }
}

fn synthesize<R: Rng + ?Sized>(
    constraints: &GenerationConstraints,
    seen: &mut HashSet<IdentityCode>,
    rng: &mut R,
) -> Result<GeneratedItem, ItemError> {
    let province_code = constraints
        .provinces
        .choose(rng)
        .copied()
        .unwrap_or(DEFAULT_PROVINCE);

    let birth_year = constraints.birth_years.draw(rng);

    let sex = constraints.sex.unwrap_or_else(|| {
        if rng.random_bool(0.5) {
            Sex::Male
        } else {
            Sex::Female
        }
    });

    let century = u8::try_from(tables::century_of_year(birth_year))
        .map_err(|_| ItemError::UnsupportedCentury { year: birth_year })?;
    let digit = tables::digit_for(sex, century)
        .ok_or(ItemError::UnsupportedCentury { year: birth_year })?;
    let year_code = birth_year.rem_euclid(100).unsigned_abs();

    for _ in 0..MAX_ATTEMPTS {
        let sequence = rng.random_range(1..=MAX_SEQUENCE);
        let code = IdentityCode::assemble(province_code, digit, year_code, sequence)?;
        if seen.insert(code) {
            return Ok(GeneratedItem {
                cccd_number: code,
                province_code,
                province_name: tables::province_name(province_code),
                gender: sex,
                birth_year,
                century,
                gender_century_code: digit,
                random_sequence: code.random_sequence().to_string(),
                metadata: None,
            });
        }
    }

    Err(ItemError::Exhausted {
        province: province_code.to_string(),
        year: birth_year,
        attempts: MAX_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{AnalyzeOptions, Analyzer};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x00cc_cd00)
    }

    fn request(quantity: i64) -> GenerationRequest {
        GenerationRequest {
            quantity,
            ..GenerationRequest::default()
        }
    }

    #[test]
    fn test_hanoi_male_scenario() {
        let req = GenerationRequest {
            province_codes: Some(vec!["001".to_string()]),
            gender: Some("Nam".to_string()),
            quantity: 5,
            ..GenerationRequest::default()
        };
        let batch = Generator::default()
            .generate_with_rng(&req, &mut rng())
            .unwrap();
        assert_eq!(batch.len(), 5);
        for item in &batch.items {
            assert_eq!(item.province_code, "001");
            assert_eq!(item.province_name, "Hà Nội");
            assert_eq!(item.gender, Sex::Male);
            assert_eq!(item.gender_century_code % 2, 0);
            assert!((1920..=2025).contains(&item.birth_year));
        }
    }

    #[test]
    fn test_codes_are_unique_within_batch() {
        let req = GenerationRequest {
            birth_year: Some(1990),
            gender: Some("Nữ".to_string()),
            quantity: 100,
            ..GenerationRequest::default()
        };
        let batch = Generator::default()
            .generate_with_rng(&req, &mut rng())
            .unwrap();
        let unique: HashSet<_> = batch.items.iter().map(|i| i.cccd_number).collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn test_quantity_is_clamped_to_ceiling() {
        let batch = Generator::default()
            .generate_with_rng(&request(2000), &mut rng())
            .unwrap();
        assert_eq!(batch.len(), 100);
        assert_eq!(
            batch.metadata,
            BatchMetadata {
                input_limit: 100,
                output_limit: 1000,
                requested_quantity: 2000,
                actual_quantity: 100,
                truncated: true,
            }
        );
    }

    #[test]
    fn test_export_uses_batch_ceiling() {
        let batch = Generator::default()
            .generate_export_with_rng(&request(600), &mut rng())
            .unwrap();
        assert_eq!(batch.len(), 500);
        assert_eq!(batch.metadata.input_limit, 500);
        assert_eq!(batch.metadata.output_limit, 10_000);
        assert!(batch.metadata.truncated);
    }

    #[test]
    fn test_output_ceiling_truncates() {
        let mut limits = Limits::default();
        limits.output.max_results_per_request = 3;
        let batch = Generator::new(limits)
            .generate_with_rng(&request(10), &mut rng())
            .unwrap();
        assert_eq!(batch.len(), 3);
        assert!(batch.metadata.truncated);
        assert_eq!(batch.metadata.actual_quantity, 3);
    }

    #[test]
    fn test_metadata_only_on_first_item() {
        let batch = Generator::default()
            .generate_with_rng(&request(3), &mut rng())
            .unwrap();
        assert!(!batch.metadata.truncated);
        assert_eq!(batch.items[0].metadata, Some(batch.metadata));
        assert!(batch.items[1..].iter().all(|i| i.metadata.is_none()));

        let json = serde_json::to_value(&batch.items).unwrap();
        assert_eq!(json[0]["_metadata"]["requested_quantity"], 3);
        assert!(json[1].get("_metadata").is_none());
        assert_eq!(json[0]["province_code"], "001");
    }

    #[test]
    fn test_year_range() {
        let req = GenerationRequest {
            birth_year_range: Some([1995, 2004]),
            quantity: 50,
            ..GenerationRequest::default()
        };
        let batch = Generator::default()
            .generate_with_rng(&req, &mut rng())
            .unwrap();
        for item in &batch.items {
            assert!((1995..=2004).contains(&item.birth_year));
            let expected = if item.birth_year < 2000 { 20 } else { 21 };
            assert_eq!(item.century, expected);
        }
    }

    #[test]
    fn test_explicit_year_wins_over_range() {
        let req = GenerationRequest {
            birth_year: Some(2001),
            birth_year_range: Some([1950, 1960]),
            quantity: 5,
            ..GenerationRequest::default()
        };
        let batch = Generator::default()
            .generate_with_rng(&req, &mut rng())
            .unwrap();
        assert!(batch.items.iter().all(|i| i.birth_year == 2001));
    }

    #[test]
    fn test_unknown_provinces_are_dropped() {
        let req = GenerationRequest {
            province_codes: Some(vec!["999".to_string(), "079".to_string()]),
            quantity: 10,
            ..GenerationRequest::default()
        };
        let batch = Generator::default()
            .generate_with_rng(&req, &mut rng())
            .unwrap();
        assert!(batch.items.iter().all(|i| i.province_code == "079"));
    }

    #[test]
    fn test_rejections() {
        let generator = Generator::default();
        let cases = [
            (request(0), RejectReason::InvalidQuantity),
            (request(-5), RejectReason::InvalidQuantity),
            (
                GenerationRequest {
                    province_codes: Some(vec![]),
                    ..request(5)
                },
                RejectReason::EmptyProvinceList,
            ),
            (
                GenerationRequest {
                    province_codes: Some(vec!["999".to_string()]),
                    ..request(5)
                },
                RejectReason::NoValidProvince,
            ),
            (
                GenerationRequest {
                    gender: Some("Khác".to_string()),
                    ..request(5)
                },
                RejectReason::InvalidSex {
                    value: "Khác".to_string(),
                },
            ),
            (
                GenerationRequest {
                    birth_year: Some(1800),
                    ..request(5)
                },
                RejectReason::BirthYearOutOfRange {
                    year: 1800,
                    min: 1920,
                    max: 2025,
                },
            ),
            (
                GenerationRequest {
                    birth_year_range: Some([2000, 1990]),
                    ..request(5)
                },
                RejectReason::InvalidYearRange {
                    start: 2000,
                    end: 1990,
                    min: 1920,
                    max: 2025,
                },
            ),
        ];

        for (req, reason) in cases {
            let rejection = generator.generate_with_rng(&req, &mut rng()).unwrap_err();
            assert_eq!(rejection.reason, reason);
            assert_eq!(rejection.max_limit, 100);
            assert_eq!(rejection.requested, req.quantity);
        }
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: GenerationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, GenerationRequest::default());
        assert_eq!(req.quantity, 10);

        let req: GenerationRequest = serde_json::from_str(
            r#"{"provinceCodes":["001"],"gender":"Nữ","birthYearRange":[1990,2000],"quantity":3}"#,
        )
        .unwrap();
        assert_eq!(req.birth_year_range, Some([1990, 2000]));
        assert_eq!(req.gender.as_deref(), Some("Nữ"));
    }

    #[test]
    fn test_empty_gender_means_unconstrained() {
        let req = GenerationRequest {
            gender: Some(String::new()),
            ..request(2)
        };
        assert!(Generator::default()
            .generate_with_rng(&req, &mut rng())
            .is_ok());
    }

    proptest! {
        #[test]
        fn prop_generated_codes_decode_to_their_constraints(
            province_index in 0usize..63,
            female in any::<bool>(),
            year in 1920i32..=2025,
            seed in any::<u64>(),
        ) {
            let province = tables::provinces()[province_index].code;
            let sex = if female { Sex::Female } else { Sex::Male };
            let req = GenerationRequest {
                province_codes: Some(vec![province.to_string()]),
                gender: Some(sex.to_string()),
                birth_year: Some(year),
                quantity: 3,
                ..GenerationRequest::default()
            };
            let batch = Generator::default()
                .generate_with_rng(&req, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            prop_assert_eq!(batch.len(), 3);

            let analyzer = Analyzer::with_today(
                Limits::default(),
                NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            );
            for item in &batch.items {
                prop_assert_eq!(item.gender_century_code % 2, u8::from(female));
                let analysis = analyzer
                    .analyze(item.cccd_number.as_str(), AnalyzeOptions::BARE)
                    .unwrap();
                prop_assert!(analysis.valid);
                prop_assert_eq!(analysis.structure.province.code.as_str(), province);
                prop_assert_eq!(analysis.sex(), sex);
                prop_assert_eq!(analysis.birth_year(), year);
            }
        }
    }
}
