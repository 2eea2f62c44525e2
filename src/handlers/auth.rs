use axum::{extract::State, Json};
use tracing::{info, warn};

use crate::{
    error::AppError,
    handlers::AppState,
    metrics,
    models::api::{AuthRequest, AuthResponse},
};

/// Handle `POST /auth`: exchange the admin password for a session token
pub async fn handle_auth(
    State(state): State<AppState>,
    body: Option<Json<AuthRequest>>,
) -> Result<Json<AuthResponse>, AppError> {
    metrics::record_request("/auth", "POST");

    let password = body.and_then(|Json(req)| req.password);

    match state.authenticator().login(password.as_deref()) {
        Ok(token) => {
            metrics::record_login("success");
            info!("Admin login succeeded");
            Ok(Json(AuthResponse {
                success: true,
                token: Some(token),
                error: None,
            }))
        }
        Err(e) => {
            metrics::record_login("failure");
            warn!(reason = %e.message(), "Admin login failed");
            Err(e)
        }
    }
}
