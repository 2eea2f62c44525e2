/// Integration tests for the pricing HTTP API
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bim_costcalculator::{
    config::{Config, KvConfig},
    handlers::AppState,
    server::create_router,
    store::{KvStore, PricingStore, RemoteStore},
};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tower::ServiceExt;

fn bundled_pricing() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config/pricing.json")
}

fn app_with_store(store: PricingStore) -> Router {
    let mut config = Config::default();
    config.admin.password = "letmein".to_string();
    create_router(AppState::new(config, store, reqwest::Client::new()), None)
}

fn static_app() -> Router {
    app_with_store(PricingStore::new(None, bundled_pricing()))
}

fn kv_app(server: &MockServer) -> Router {
    let kv = KvStore::new(
        reqwest::Client::new(),
        &KvConfig {
            url: server.base_url(),
            token: "kv-token".to_string(),
        },
    );
    app_with_store(PricingStore::new(Some(RemoteStore::Kv(kv)), bundled_pricing()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_auth_flow() {
    let app = static_app();

    let (status, body) = send(&app, post_json("/auth", json!({ "password": "letmein" }), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let (status, body) = send(&app, post_json("/auth", json!({}), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Password is required"));

    let (status, body) = send(&app, post_json("/auth", json!({ "password": "admin123" }), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Invalid password"));
}

#[tokio::test]
async fn test_get_pricing_static_mode() {
    let (status, body) = send(&static_app(), get("/pricing")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], json!("static"));
    assert_eq!(body["pricing"]["scanOnly"]["dak-buiten"], json!(1.25));
    assert_eq!(body["pricing"]["scanOnly"]["technisch"]["nachtwerk"], json!(8.0));
}

#[tokio::test]
async fn test_get_pricing_without_any_source_returns_null() {
    let app = app_with_store(PricingStore::new(None, "/nonexistent/pricing.json"));
    let (status, body) = send(&app, get("/pricing")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "pricing": null, "source": "static" }));
}

#[tokio::test]
async fn test_get_pricing_prefers_kv() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/get/pricing");
            then.status(200).json_body(json!({
                "result": json!({ "scanToBIM": { "standaard": 99.0 } }).to_string()
            }));
        })
        .await;

    let (status, body) = send(&kv_app(&server), get("/pricing")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], json!("kv"));
    assert_eq!(body["pricing"]["scanToBIM"]["standaard"], json!(99.0));
}

#[tokio::test]
async fn test_kv_document_with_null_price_is_served() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/get/pricing");
            then.status(200).json_body(json!({
                "result": json!({ "scanToBIM": { "standaard": 99.0, "technisch": null } }).to_string()
            }));
        })
        .await;

    let app = kv_app(&server);
    let (_, body) = send(&app, get("/pricing")).await;
    assert_eq!(body["source"], json!("kv"));
    assert_eq!(body["pricing"]["scanToBIM"]["standaard"], json!(99.0));

    let (status, body) = send(
        &app,
        post_json(
            "/quote",
            json!({ "surfaceArea": 10, "serviceType": "scan-to-bim", "roomType": "technisch" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unitPrice"], json!(0.0));
    assert_eq!(body["source"], json!("kv"));
}

#[tokio::test]
async fn test_unreachable_kv_falls_back_to_static() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/get/pricing");
            then.status(500).body("upstream down");
        })
        .await;

    let (status, body) = send(&kv_app(&server), get("/pricing")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], json!("static"));
    assert_eq!(body["pricing"]["scanToBIM"]["standaard"], json!(8.5));
}

#[tokio::test]
async fn test_save_without_token_leaves_document_untouched() {
    let server = MockServer::start_async().await;
    let stored = json!({ "scanToBIM": { "standaard": 12.0 } });
    server
        .mock_async(|when, then| {
            when.method(GET).path("/get/pricing");
            then.status(200)
                .json_body(json!({ "result": stored.to_string() }));
        })
        .await;
    let set = server
        .mock_async(|when, then| {
            when.method(POST).path("/set/pricing");
            then.status(200).json_body(json!({ "result": "OK" }));
        })
        .await;

    let app = kv_app(&server);
    let (status, body) = send(
        &app,
        post_json("/pricing", json!({ "pricing": { "scanToBIM": { "standaard": 1.0 } } }), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Unauthorized"));

    set.assert_hits_async(0).await;

    let (_, body) = send(&app, get("/pricing")).await;
    assert_eq!(body["pricing"]["scanToBIM"]["standaard"], json!(12.0));
}

#[tokio::test]
async fn test_save_rejects_invalid_pricing() {
    let app = static_app();

    for payload in [json!({}), json!({ "pricing": "cheap" }), json!({ "pricing": [1] })] {
        let (status, body) = send(&app, post_json("/pricing", payload, Some("token"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Invalid pricing data"));
    }
}

#[tokio::test]
async fn test_save_accepts_pricing_with_null_price() {
    let (status, body) = send(
        &static_app(),
        post_json(
            "/pricing",
            json!({ "pricing": { "scanToBIM": { "standaard": null, "technisch": 30 } } }),
            Some("token"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn test_save_accepts_lowercase_bearer_scheme() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/pricing")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "bearer token")
        .body(Body::from(json!({ "pricing": { "modelOnly": {} } }).to_string()))
        .unwrap();

    let (status, body) = send(&static_app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn test_save_in_static_mode_is_accepted_not_persisted() {
    let app = static_app();
    let (_, auth) = send(&app, post_json("/auth", json!({ "password": "letmein" }), None)).await;
    let token = auth["token"].as_str().unwrap();

    let (status, body) = send(
        &app,
        post_json("/pricing", json!({ "pricing": { "modelOnly": { "standaard": 7.0 } } }), Some(token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["persisted"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("not persisted"));
}

#[tokio::test]
async fn test_save_persists_to_kv() {
    let server = MockServer::start_async().await;
    let set = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/set/pricing")
                .header("authorization", "Bearer kv-token")
                .body_includes("\"standaard\":7.0");
            then.status(200).json_body(json!({ "result": "OK" }));
        })
        .await;

    let (status, body) = send(
        &kv_app(&server),
        post_json(
            "/pricing",
            json!({ "pricing": { "modelOnly": { "standaard": 7.0 }, "notes": "kept" } }),
            Some("token"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["persisted"], json!(true));
    set.assert_async().await;
}

#[tokio::test]
async fn test_kv_write_failure_is_server_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/set/pricing");
            then.status(200).json_body(json!({ "error": "WRONGPASS invalid token" }));
        })
        .await;

    let (status, body) = send(
        &kv_app(&server),
        post_json("/pricing", json!({ "pricing": { "scanToBIM": {} } }), Some("token")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("WRONGPASS"));
}

#[tokio::test]
async fn test_quote_endpoint() {
    let (status, body) = send(
        &static_app(),
        post_json(
            "/quote",
            json!({
                "surfaceArea": 12000,
                "serviceType": "scan-only",
                "roomType": "technisch",
                "scanningTime": "nachtwerk"
            }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unitPrice"], json!(8.0));
    assert_eq!(body["totalPrice"], json!(96000.0));
    assert_eq!(body["source"], json!("static"));

    let severities: Vec<&str> = body["advice"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["severity"].as_str().unwrap())
        .collect();
    assert!(severities.contains(&"warning"));
    assert!(severities.contains(&"info"));
}

#[tokio::test]
async fn test_quote_missing_fields_gets_json_error() {
    let (status, body) = send(
        &static_app(),
        post_json("/quote", json!({ "surfaceArea": 100, "roomType": "standaard" }), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["type"], json!("validation_error"));
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = static_app();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));

    let (status, body) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], json!("static"));

    let app = app_with_store(PricingStore::new(None, "/nonexistent/pricing.json"));
    let (status, _) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
