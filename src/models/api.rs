//! Request and response bodies of the HTTP API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pricing::Quote;
use crate::store::PricingSource;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthRequest {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingResponse {
    /// `null` when no source could be read
    pub pricing: Option<Value>,
    pub source: PricingSource,
}

/// Body of `POST /pricing`; `pricing` is checked by hand so a missing or
/// non-object value gets a 400 instead of a deserialization failure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavePricingRequest {
    #[serde(default)]
    pub pricing: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePricingResponse {
    pub success: bool,
    pub message: String,
    /// Whether the document reached a durable store
    pub persisted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub surface_area: Option<f64>,
    pub service_type: String,
    pub room_type: String,
    #[serde(default)]
    pub scanning_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: Quote,
    pub source: PricingSource,
}
