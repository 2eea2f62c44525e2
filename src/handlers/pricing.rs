use axum::{extract::State, Json};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    auth::BearerToken,
    error::AppError,
    handlers::AppState,
    metrics,
    models::api::{PricingResponse, SavePricingRequest, SavePricingResponse},
    pricing::PricingModel,
    store::{PricingSource, SaveOutcome},
};

/// Handle `GET /pricing`
///
/// Never fails: when no source can be read the body carries `pricing: null`
/// and the client falls back to its built-in prices.
pub async fn get_pricing(State(state): State<AppState>) -> Result<Json<PricingResponse>, AppError> {
    metrics::record_request("/pricing", "GET");

    match state.store().load().await {
        Ok(loaded) => {
            debug!(source = %loaded.source, "Serving pricing document");
            let pricing = loaded
                .model
                .to_value()
                .map_err(|e| AppError::InternalError(format!("Failed to encode pricing: {}", e)))?;
            Ok(Json(PricingResponse {
                pricing: Some(pricing),
                source: loaded.source,
            }))
        }
        Err(e) => {
            warn!(error = %e, "Serving empty pricing response");
            Ok(Json(PricingResponse {
                pricing: None,
                source: PricingSource::Static,
            }))
        }
    }
}

/// Handle `POST /pricing`
///
/// The bearer token is checked before the body is looked at, so an
/// unauthenticated request never reaches the store.
pub async fn save_pricing(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    body: Option<Json<SavePricingRequest>>,
) -> Result<Json<SavePricingResponse>, AppError> {
    metrics::record_request("/pricing", "POST");

    let token = token.ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    let pricing = body
        .and_then(|Json(req)| req.pricing)
        .filter(Value::is_object)
        .ok_or_else(|| AppError::Validation("Invalid pricing data".to_string()))?;

    let model = PricingModel::from_value(pricing)
        .map_err(|e| AppError::Validation(format!("Invalid pricing data: {}", e)))?;

    match state.store().save(&model, Some(&token)).await {
        SaveOutcome::Persisted => {
            info!("Pricing saved");
            Ok(Json(SavePricingResponse {
                success: true,
                message: "Pricing saved".to_string(),
                persisted: true,
            }))
        }
        SaveOutcome::AcceptedNotPersisted(reason) => Ok(Json(SavePricingResponse {
            success: true,
            message: reason,
            persisted: false,
        })),
        SaveOutcome::Rejected(reason) => Err(AppError::PersistenceFailure(reason)),
    }
}
