//! HTTP API integration tests.
//!
//! Each test serves the router on an ephemeral port and drives it with reqwest.

use std::net::SocketAddr;
use std::num::NonZeroU32;

use cccd_api::{api, state::AppState};
use cccd_codec::Limits;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        Self::with_rate_limit(1000).await
    }

    async fn with_rate_limit(per_minute: u32) -> Self {
        let state = AppState::new(
            Limits::default(),
            NonZeroU32::new(per_minute).expect("positive rate limit"),
        );
        let app = api::create_router(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("listener has an address");
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("request failed");
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("request failed");
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["endpoints"]["analyze"], "/api/analyze-cccd");
    assert_eq!(body["legalBasis"]["decree"], "Nghị định số 137/2015/NĐ-CP");
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["config"]["totalProvinces"], 63);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_analyze_valid_code() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post(
            "/api/analyze-cccd",
            json!({"cccd": "001010101678", "detailed": true, "location": true}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["cccd"], "001010101678");
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["structure"]["province"]["name"], "Hà Nội");
    assert_eq!(body["data"]["structure"]["birthYear"]["fullYear"], 1910);
    assert!(body["data"]["detailedAnalysis"].is_object());
    assert_eq!(body["data"]["locationInfo"]["region"], "Miền Bắc");
}

#[tokio::test]
async fn test_analyze_without_optional_views() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post(
            "/api/analyze-cccd",
            json!({"cccd": "079010101678", "detailed": false, "location": false}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("detailedAnalysis").is_none());
    assert!(body["data"].get("locationInfo").is_none());
}

#[tokio::test]
async fn test_analyze_invalid_code() {
    let server = TestServer::start().await;
    for cccd in ["invalid-cccd", "", "00101010167", "000000000000"] {
        let (status, body) = server
            .post("/api/analyze-cccd", json!({ "cccd": cccd }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "input {cccd:?}");
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("không hợp lệ"));
    }
}

#[tokio::test]
async fn test_batch_analyze() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post(
            "/api/analyze-cccd/batch",
            json!({"cccdList": ["001010101678", "079010101678", "bad"]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["totalAnalyzed"], 3);
    assert_eq!(data["validCount"], 2);
    assert_eq!(data["invalidCount"], 1);
    assert_eq!(data["results"].as_array().unwrap().len(), 3);
    assert_eq!(data["limits"]["inputLimit"], 50);
    assert_eq!(data["limits"]["truncated"], false);
}

#[tokio::test]
async fn test_batch_analyze_over_limit() {
    let server = TestServer::start().await;
    let codes = vec!["001010101678"; 51];
    let (status, body) = server
        .post("/api/analyze-cccd/batch", json!({ "cccdList": codes }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["maxLimit"], 50);
    assert_eq!(body["requested"], 51);
}

#[tokio::test]
async fn test_batch_analyze_empty_list() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post("/api/analyze-cccd/batch", json!({ "cccdList": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_structure() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/api/analyze-cccd/structure").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["provinceCodes"]["079"], "Thành phố Hồ Chí Minh");
    assert_eq!(data["genderCenturyCodes"]["3"]["gender"], "Nữ");
    assert_eq!(
        data["genderCenturyCodes"]["3"]["description"],
        "Nữ, sinh thế kỷ 21 (2000-2099)"
    );
    assert_eq!(data["genderCenturyCodes"]["3"]["century"], 21);
    assert!(data["structureBreakdown"]["positions_7_12"].is_string());
    assert!(data["legalBasis"].is_object());
}

#[tokio::test]
async fn test_generate() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post(
            "/api/generate-cccd",
            json!({"provinceCodes": ["001"], "gender": "Nam", "quantity": 5}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    for item in items {
        assert_eq!(item["province_code"], "001");
        assert_eq!(item["gender"], "Nam");
        assert_eq!(item["cccd_number"].as_str().unwrap().len(), 12);
    }
    assert_eq!(body["metadata"]["actual_quantity"], 5);
    assert_eq!(items[0]["_metadata"]["requested_quantity"], 5);
}

#[tokio::test]
async fn test_generate_defaults() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post("/api/generate-cccd", json!({"provinceCodes": null}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert_eq!(body["data"][0]["province_code"], "001");
}

#[tokio::test]
async fn test_generate_clamps_quantity() {
    let server = TestServer::start().await;
    let (status, body) = server
        .post("/api/generate-cccd", json!({"quantity": 5000}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 100);
    assert_eq!(body["metadata"]["truncated"], true);
    assert_eq!(body["metadata"]["input_limit"], 100);
}

#[tokio::test]
async fn test_generate_rejections() {
    let server = TestServer::start().await;
    for request in [
        json!({"provinceCodes": [], "quantity": 3}),
        json!({"quantity": 0}),
        json!({"gender": "X", "quantity": 3}),
        json!({"birthYear": 1800, "quantity": 3}),
        json!({"provinceCodes": ["999"], "quantity": 3}),
    ] {
        let (status, body) = server.post("/api/generate-cccd", request.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "request {request}");
        assert_eq!(body["success"], false);
        assert_eq!(body["maxLimit"], 100);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_generate_malformed_json() {
    let server = TestServer::start().await;
    let response = server
        .client
        .post(format!("{}/api/generate-cccd", server.base_url))
        .header("content-type", "application/json")
        .body("invalid json")
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("json error body");
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_generate_options() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/api/generate-cccd/options").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["provinces"].as_array().unwrap().len(), 63);
    assert_eq!(data["genders"], json!(["Nam", "Nữ"]));
    assert_eq!(data["limits"]["birthYear"]["min"], 1920);
    assert!(data["genderCenturyCodes"].is_object());
    assert!(data["legalBasis"].is_object());
}

#[tokio::test]
async fn test_unknown_endpoint() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("không tồn tại"));
    assert!(body["availableEndpoints"].is_array());
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let server = TestServer::with_rate_limit(3).await;
    let mut statuses = Vec::new();
    for _ in 0..6 {
        let (status, _) = server.get("/api/generate-cccd/options").await;
        statuses.push(status);
    }
    assert_eq!(statuses[..3], [StatusCode::OK; 3]);
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));

    let (status, body) = server.get("/api/analyze-cccd/structure").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Quá nhiều yêu cầu, vui lòng thử lại sau");

    let (status, _) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
}
