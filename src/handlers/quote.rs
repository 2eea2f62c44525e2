use axum::{extract::State, Json};
use tracing::debug;

use crate::{
    error::AppError,
    handlers::AppState,
    metrics,
    models::api::{QuoteRequest, QuoteResponse},
    pricing::{self, QuoteInput},
};

/// Handle `POST /quote`: price a selection against the current pricing
pub async fn handle_quote(
    State(state): State<AppState>,
    body: Option<Json<QuoteRequest>>,
) -> Result<Json<QuoteResponse>, AppError> {
    metrics::record_request("/quote", "POST");

    let Some(Json(request)) = body else {
        return Err(AppError::Validation(
            "Invalid quote request: serviceType and roomType are required".to_string(),
        ));
    };

    let loaded = state.store().load().await?;

    let input = QuoteInput {
        surface_area: request.surface_area.unwrap_or(0.0),
        service_type: request.service_type,
        room_type: request.room_type,
        scanning_time: request.scanning_time.filter(|t| !t.is_empty()),
    };
    let quote = pricing::quote(&loaded.model, &input);

    metrics::record_quote(&quote.service_type);
    debug!(
        service_type = %quote.service_type,
        room_type = %quote.room_type,
        unit_price = quote.unit_price,
        total_price = quote.total_price,
        "Quote calculated"
    );

    Ok(Json(QuoteResponse {
        quote,
        source: loaded.source,
    }))
}
