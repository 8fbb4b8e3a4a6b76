//! Decoding endpoints.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use cccd_codec::tables::{self, LegalBasis, SexCentury, LEGAL_BASIS, STRUCTURE_BREAKDOWN};
use cccd_codec::{AnalysisResult, AnalyzeOptions, BatchReport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::ApiError;
use super::ApiResponse;
use crate::state::AppState;

fn enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub cccd: String,
    #[serde(default = "enabled")]
    pub detailed: bool,
    #[serde(default = "enabled")]
    pub location: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnalyzeRequest {
    pub cccd_list: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureInfo {
    pub legal_basis: LegalBasis,
    pub structure_breakdown: BTreeMap<&'static str, &'static str>,
    pub province_codes: BTreeMap<&'static str, &'static str>,
    pub gender_century_codes: BTreeMap<u8, SexCentury>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-cccd", post(analyze_cccd))
        .route("/analyze-cccd/batch", post(batch_analyze_cccd))
        .route("/analyze-cccd/structure", get(structure))
}

async fn analyze_cccd(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AnalysisResult>>, ApiError> {
    let Json(request) = payload?;
    let options = AnalyzeOptions {
        detailed: request.detailed,
        location: request.location,
    };

    let result = state
        .analyzer()
        .analyze(request.cccd.trim(), options)
        .map_err(|e| {
            debug!(error = %e, "Rejected CCCD");
            ApiError::bad_request(format!("CCCD không hợp lệ: {e}"))
        })?;

    Ok(Json(ApiResponse::new(result)))
}

async fn batch_analyze_cccd(
    State(state): State<AppState>,
    payload: Result<Json<BatchAnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BatchReport>>, ApiError> {
    let Json(request) = payload?;
    if request.cccd_list.is_empty() {
        return Err(ApiError::bad_request("Danh sách CCCD không được để trống"));
    }

    let report = state.analyzer().batch_analyze(&request.cccd_list)?;
    info!(
        total = report.total_analyzed,
        valid = report.valid_count,
        "Batch analysis served"
    );

    Ok(Json(ApiResponse::new(report)))
}

async fn structure() -> Json<ApiResponse<StructureInfo>> {
    Json(ApiResponse::new(StructureInfo {
        legal_basis: LEGAL_BASIS,
        structure_breakdown: STRUCTURE_BREAKDOWN.into_iter().collect(),
        province_codes: tables::provinces()
            .iter()
            .map(|p| (p.code, p.name))
            .collect(),
        gender_century_codes: tables::sex_century_table()
            .into_iter()
            .map(|entry| (entry.digit, entry))
            .collect(),
    }))
}
