//! Service banner and health check endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use cccd_codec::tables::{LegalBasis, LEGAL_BASIS};
use cccd_codec::ConfigSummary;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "cccd-api";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,

    /// Always "healthy" while the process can answer.
    pub status: &'static str,

    pub service: &'static str,

    pub version: &'static str,

    /// Current timestamp (RFC 3339).
    pub timestamp: String,

    /// Effective limits and table sizes.
    pub config: ConfigSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    pub success: bool,
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
    pub legal_basis: LegalBasis,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub health: &'static str,
    pub generate: &'static str,
    pub analyze: &'static str,
    pub batch: &'static str,
    pub options: &'static str,
    pub structure: &'static str,
}

const ENDPOINTS: Endpoints = Endpoints {
    health: "/health",
    generate: "/api/generate-cccd",
    analyze: "/api/analyze-cccd",
    batch: "/api/analyze-cccd/batch",
    options: "/api/generate-cccd/options",
    structure: "/api/analyze-cccd/structure",
};

/// Create banner and health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/livez", get(livez))
}

async fn index() -> impl IntoResponse {
    Json(IndexResponse {
        success: true,
        message: "CCCD Analysis & Generation System",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
        legal_basis: LEGAL_BASIS,
    })
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        success: true,
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        config: state.limits().summary(),
    })
}

/// Liveness check with an empty body.
async fn livez() -> impl IntoResponse {
    StatusCode::OK
}
