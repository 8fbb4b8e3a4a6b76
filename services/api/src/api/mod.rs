//! HTTP API handlers and routing.

mod analyze;
pub mod error;
mod generate;
mod health;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, Method},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::state::AppState;
use error::ApiError;

pub use analyze::{AnalyzeRequest, BatchAnalyzeRequest};
pub use generate::GenerateResponse;
pub use health::HealthResponse;

const AVAILABLE_ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /health",
    "POST /api/generate-cccd",
    "POST /api/analyze-cccd",
    "POST /api/analyze-cccd/batch",
    "GET /api/generate-cccd/options",
    "GET /api/analyze-cccd/structure",
];

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Create the main API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    let api = Router::new()
        .merge(analyze::routes())
        .merge(generate::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .merge(health::routes())
        .nest("/api", api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = client_ip(&request);
    if !state.try_acquire(client) {
        warn!(%client, path = %request.uri().path(), "Rate limit exceeded");
        return ApiError::too_many_requests("Quá nhiều yêu cầu, vui lòng thử lại sau")
            .into_response();
    }
    next.run(request).await
}

/// Peer address of the connection. Forwarding headers are not trusted.
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint không tồn tại").with_available_endpoints(AVAILABLE_ENDPOINTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use cccd_codec::Limits;
    use std::num::NonZeroU32;
    use tower::ServiceExt;

    fn router(per_minute: u32) -> Router {
        create_router(AppState::new(
            Limits::default(),
            NonZeroU32::new(per_minute).unwrap(),
        ))
    }

    fn get(uri: &str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn get_from(uri: &str, peer: [u8; 4]) -> Request {
        let mut request = get(uri);
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 40000))));
        request
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = router(60).oneshot(get("/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_routes_are_rate_limited() {
        let app = router(2);
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(get("/api/analyze-cccd/structure"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app
            .clone()
            .oneshot(get("/api/generate-cccd/options"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        // Health sits outside /api.
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_client() {
        let app = router(1);
        let noisy = [10, 0, 0, 1];
        let quiet = [10, 0, 0, 2];

        let response = app
            .clone()
            .oneshot(get_from("/api/analyze-cccd/structure", noisy))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get_from("/api/analyze-cccd/structure", noisy))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let response = app
            .oneshot(get_from("/api/analyze-cccd/structure", quiet))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
