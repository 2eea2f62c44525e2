use crate::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::Rng;
use std::convert::Infallible;

/// Checks the admin password and hands out session tokens
///
/// Tokens are opaque placeholders (timestamp + random, base64). They are not
/// signed and never expire; saving only checks that one is presented.
#[derive(Debug, Clone)]
pub struct PasswordAuthenticator {
    password: String,
}

impl PasswordAuthenticator {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    /// Exchange a password for a token
    pub fn login(&self, password: Option<&str>) -> Result<String, AppError> {
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("Password is required".to_string()))?;

        if password != self.password {
            return Err(AppError::Unauthorized("Invalid password".to_string()));
        }

        Ok(issue_token())
    }
}

/// Generate an opaque session token
pub fn issue_token() -> String {
    let nonce: u64 = rand::thread_rng().gen();
    let raw = format!("{}-{}", chrono::Utc::now().timestamp_millis(), nonce);
    STANDARD.encode(raw)
}

/// Extract Bearer token from Authorization header
///
/// The scheme name is matched case-insensitively.
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AppError> {
    const BEARER_PREFIX: &str = "Bearer ";

    let token = match auth_header.get(..BEARER_PREFIX.len()) {
        Some(scheme) if scheme.eq_ignore_ascii_case(BEARER_PREFIX) => {
            auth_header[BEARER_PREFIX.len()..].trim()
        }
        _ => {
            return Err(AppError::Unauthorized(
                "Authorization header must use Bearer scheme".to_string(),
            ))
        }
    };

    if token.is_empty() {
        return Err(AppError::Unauthorized("Bearer token is empty".to_string()));
    }

    Ok(token)
}

/// The request's bearer token, if it carries a usable one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub Option<String>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|header| extract_bearer_token(header).ok())
            .map(str::to_string);

        Ok(Self(token))
    }
}
