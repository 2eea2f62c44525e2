use crate::pricing::advice::{advise, Advice, AdviceInput};
use crate::pricing::models::PricingModel;
use serde::Serialize;
use std::fmt;

/// The three offerings on the pricing sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    ScanToBim,
    ScanOnly,
    ModelOnly,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScanToBim => "scan-to-bim",
            Self::ScanOnly => "scan-only",
            Self::ModelOnly => "model-only",
        }
    }

    /// Exact match on the form value; anything else is not a service type
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scan-to-bim" => Some(Self::ScanToBim),
            "scan-only" => Some(Self::ScanOnly),
            "model-only" => Some(Self::ModelOnly),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price per m² for a selection
///
/// Never fails: unknown service types and room types missing from the
/// relevant table price at 0.
pub fn unit_price(
    model: &PricingModel,
    service_type: &str,
    room_type: &str,
    scanning_time: Option<&str>,
) -> f64 {
    match ServiceType::parse(service_type) {
        Some(ServiceType::ScanToBim) => model.scan_to_bim.get(room_type).copied().unwrap_or(0.0),
        Some(ServiceType::ScanOnly) => model
            .scan_only
            .get(room_type)
            .map(|entry| entry.price_for(scanning_time))
            .unwrap_or(0.0),
        Some(ServiceType::ModelOnly) => model.model_only.get(room_type).copied().unwrap_or(0.0),
        None => 0.0,
    }
}

/// Total project price; a negative area is passed through unchanged
pub fn total_price(unit_price: f64, surface_area: f64) -> f64 {
    unit_price * surface_area
}

/// A calculator selection
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteInput {
    pub surface_area: f64,
    pub service_type: String,
    pub room_type: String,
    pub scanning_time: Option<String>,
}

/// Calculator output: prices, display labels and advice
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub surface_area: f64,
    pub service_type: String,
    pub room_type: String,
    pub scanning_time: Option<String>,
    pub service_label: String,
    pub room_label: String,
    pub unit_price: f64,
    pub total_price: f64,
    pub advice: Vec<Advice>,
}

/// Run the calculator and the advice engine for one selection
pub fn quote(model: &PricingModel, input: &QuoteInput) -> Quote {
    // Non-finite areas count as an empty field
    let surface_area = if input.surface_area.is_finite() {
        input.surface_area
    } else {
        0.0
    };
    let scanning_time = input.scanning_time.as_deref();

    let unit = unit_price(model, &input.service_type, &input.room_type, scanning_time);
    let advice = advise(&AdviceInput {
        unit_price: unit,
        surface_area,
        service_type: &input.service_type,
        room_type: &input.room_type,
        scanning_time,
    });

    Quote {
        surface_area,
        service_type: input.service_type.clone(),
        room_type: input.room_type.clone(),
        scanning_time: input.scanning_time.clone(),
        service_label: model.service_label(&input.service_type).to_string(),
        room_label: model.room_label(&input.room_type).to_string(),
        unit_price: unit,
        total_price: total_price(unit, surface_area),
        advice,
    }
}
