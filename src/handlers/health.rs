use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use tracing::warn;

use crate::handlers::AppState;

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "bim-costcalculator",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// Readiness check endpoint
/// Returns 200 OK once a pricing document can be loaded, 503 otherwise
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store().load().await {
        Ok(loaded) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "service": "bim-costcalculator",
                "source": loaded.source,
            })),
        ),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "service": "bim-costcalculator",
                    "error": e.to_string(),
                })),
            )
        }
    }
}
