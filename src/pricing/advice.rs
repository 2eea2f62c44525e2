//! Advice rules for a calculator selection
//!
//! The engine is a fixed, ordered list of independent rules. Every rule that
//! matches contributes to the output, so the order of the returned list is
//! the order of the rules below. Messages are Dutch, matching the pricing
//! sheet they accompany.

use crate::pricing::calculator::ServiceType;
use crate::pricing::format::format_currency;
use crate::pricing::models::NACHTWERK;
use serde::{Deserialize, Serialize};

/// Shown instead of any rule output when no surface area is entered
pub const PLACEHOLDER_ADVICE: &str = "Vul de projectparameters in om advies te ontvangen";

/// Marks the warning for the most expensive room/time/size combination
pub const HIGHEST_COST_ADVICE: &str =
    "⚠️ Hoogste kostencombinatie - overweeg fasering of alternatieven";

const TECHNISCH: &str = "technisch";
const PLAFONDS_TE_OPENEN: &str = "plafonds-te-openen";
const PLAFONDS_LAMELLEN: &str = "plafonds-lamellen";
const DAK_BUITEN: &str = "dak-buiten";
const LIFT_COMPLEET: &str = "lift-compleet";

const HIGH_COST_THRESHOLD: f64 = 70.0;
const LARGE_PROJECT_AREA: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Success,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub severity: Severity,
    pub message: String,
}

impl Advice {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Everything the rules look at
#[derive(Debug, Clone, Copy)]
pub struct AdviceInput<'a> {
    pub unit_price: f64,
    pub surface_area: f64,
    pub service_type: &'a str,
    pub room_type: &'a str,
    pub scanning_time: Option<&'a str>,
}

impl AdviceInput<'_> {
    fn is_night_shift(&self) -> bool {
        self.scanning_time == Some(NACHTWERK)
    }
}

/// Evaluate all rules in order
pub fn advise(input: &AdviceInput<'_>) -> Vec<Advice> {
    if input.surface_area <= 0.0 || input.surface_area.is_nan() {
        return vec![Advice::new(Severity::Info, PLACEHOLDER_ADVICE)];
    }

    let mut items = vec![project_size_advice(input.surface_area)];
    items.extend(room_type_advice(input.room_type));
    items.extend(service_type_advice(input.service_type));
    if ServiceType::parse(input.service_type) != Some(ServiceType::ModelOnly) {
        items.push(scanning_time_advice(input));
    }
    items.extend(combination_advice(input));
    items.extend(cost_advice(input.unit_price));
    items.extend(planning_advice(input));
    items
}

fn project_size_advice(area: f64) -> Advice {
    if area < 1000.0 {
        Advice::new(
            Severity::Info,
            "Klein project - overweeg om te combineren met andere projecten voor kostenoptimalisatie",
        )
    } else if area < 5000.0 {
        Advice::new(
            Severity::Info,
            "Standaard projectgrootte - goede balans tussen kosten en efficiëntie",
        )
    } else if area < LARGE_PROJECT_AREA {
        Advice::new(
            Severity::Info,
            "Middelgroot project - schaalvoordelen beginnen zichtbaar te worden",
        )
    } else {
        Advice::new(
            Severity::Info,
            "Groot project - fasering kan helpen bij planning en risicobeheer",
        )
    }
}

fn room_type_advice(room_type: &str) -> Option<Advice> {
    let advice = match room_type {
        TECHNISCH => Advice::new(
            Severity::Warning,
            "Technische ruimtes zijn complexer - extra tijd nodig voor begeleiding en toegang",
        ),
        PLAFONDS_TE_OPENEN => Advice::new(
            Severity::Warning,
            "⚠️ Let op: Plafonds openen verdubbelt bijna de kosten. Overweeg of gedeeltelijk openen door Allinq mogelijk is voor kostenbesparing",
        ),
        PLAFONDS_LAMELLEN => Advice::new(
            Severity::Info,
            "Lamellenplafonds vereisen extra foto's en video's - iets langere doorlooptijd",
        ),
        DAK_BUITEN => Advice::new(
            Severity::Success,
            "Dak/buiten ruimtes hebben beperkte techniek - relatief eenvoudig en kostenbesparend",
        ),
        LIFT_COMPLEET => Advice::new(
            Severity::Warning,
            "Lift compleet modelleren is zeer intensief (€50/m² voor scan, €40/m² voor model) - overweeg of 'in zicht' voldoende is",
        ),
        _ => return None,
    };
    Some(advice)
}

fn service_type_advice(service_type: &str) -> Option<Advice> {
    let advice = match ServiceType::parse(service_type)? {
        ServiceType::ScanOnly => Advice::new(
            Severity::Info,
            "Scan only levert puntenwolk op - voor modelleren later is volledige Scan-to-BIM efficiënter",
        ),
        ServiceType::ModelOnly => Advice::new(
            Severity::Info,
            "Model only vereist bestaande scan data - controleer of deze beschikbaar is",
        ),
        ServiceType::ScanToBim => Advice::new(
            Severity::Success,
            "Volledige service - optimaal voor nieuwe projecten zonder bestaande data",
        ),
    };
    Some(advice)
}

fn scanning_time_advice(input: &AdviceInput<'_>) -> Advice {
    if input.is_night_shift() {
        Advice::new(
            Severity::Warning,
            "🌙 Nachtwerk is 2x duurder dan overdag (€5/m² vs €2.49/m² voor plafonds). Overweeg of overdag scannen mogelijk is voor kostenbesparing",
        )
    } else {
        Advice::new(
            Severity::Success,
            "Overdag scannen is kostenefficiënter - alleen gebruiken wanneer operationele vereisten dit toestaan",
        )
    }
}

fn combination_advice(input: &AdviceInput<'_>) -> Vec<Advice> {
    let mut items = Vec::new();
    let technisch_at_night = input.room_type == TECHNISCH && input.is_night_shift();

    if input.surface_area > LARGE_PROJECT_AREA && technisch_at_night {
        items.push(Advice::new(Severity::Warning, HIGHEST_COST_ADVICE));
    }
    if input.surface_area < 1000.0 && input.room_type == PLAFONDS_TE_OPENEN {
        items.push(Advice::new(
            Severity::Info,
            "Kleine projecten met plafonds te openen zijn relatief duur per m² - overweeg bundeling",
        ));
    }
    if technisch_at_night {
        items.push(Advice::new(
            Severity::Warning,
            "Complexe combinatie - extra planning nodig voor toegang en begeleiding",
        ));
    }
    items
}

fn cost_advice(unit_price: f64) -> Option<Advice> {
    (unit_price > HIGH_COST_THRESHOLD).then(|| {
        Advice::new(
            Severity::Warning,
            format!(
                "Hoge kosten per m² ({}) - overweeg alternatieve ruimtetypen of servicetypen",
                format_currency(unit_price)
            ),
        )
    })
}

fn planning_advice(input: &AdviceInput<'_>) -> Vec<Advice> {
    let mut items = Vec::new();
    if input.surface_area > LARGE_PROJECT_AREA {
        items.push(Advice::new(
            Severity::Info,
            "Grote projecten (>10k m²) hebben langere doorlooptijden - plan vroegtijdig",
        ));
    }
    if matches!(input.room_type, TECHNISCH | PLAFONDS_TE_OPENEN) {
        items.push(Advice::new(
            Severity::Info,
            "Complexe ruimtes vereisen meer voorbereiding - reken op extra tijd voor vergunningen en toegang",
        ));
    }
    items
}
