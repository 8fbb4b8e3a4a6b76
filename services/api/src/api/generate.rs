//! Generation endpoints.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use cccd_codec::tables::{self, LegalBasis, Province, SexCentury, LEGAL_BASIS};
use cccd_codec::{
    BatchMetadata, GeneratedItem, GenerationRequest, InputLimits, OutputLimits, QuantityLimits,
    Sex, YearRange,
};
use serde::Serialize;
use tracing::info;

use super::error::ApiError;
use super::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub data: Vec<GeneratedItem>,
    pub metadata: BatchMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    pub provinces: &'static [Province],
    pub genders: [Sex; 2],
    pub gender_century_codes: BTreeMap<u8, SexCentury>,
    pub limits: OptionLimits,
    pub legal_basis: LegalBasis,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionLimits {
    pub quantity: QuantityLimits,
    pub birth_year: YearRange,
    pub input: InputLimits,
    pub output: OutputLimits,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/generate-cccd", post(generate_cccd))
        .route("/generate-cccd/options", get(options))
}

async fn generate_cccd(
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;
    let batch = state.generator().generate(&request)?;

    info!(
        requested = batch.metadata.requested_quantity,
        generated = batch.metadata.actual_quantity,
        truncated = batch.metadata.truncated,
        "Generated CCCD numbers"
    );

    Ok(Json(GenerateResponse {
        success: true,
        data: batch.items,
        metadata: batch.metadata,
    }))
}

async fn options(State(state): State<AppState>) -> Json<ApiResponse<GenerationOptions>> {
    let limits = state.limits();
    Json(ApiResponse::new(GenerationOptions {
        provinces: tables::provinces(),
        genders: [Sex::Male, Sex::Female],
        gender_century_codes: tables::sex_century_table()
            .into_iter()
            .map(|entry| (entry.digit, entry))
            .collect(),
        limits: OptionLimits {
            quantity: QuantityLimits {
                default: limits.default_quantity,
                max: limits.max_quantity,
            },
            birth_year: YearRange {
                min: limits.min_birth_year,
                max: limits.max_birth_year,
            },
            input: limits.input,
            output: limits.output,
        },
        legal_basis: LEGAL_BASIS,
    }))
}
