use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Time slot key for daytime scanning
pub const OVERDAG: &str = "overdag";
/// Time slot key for night-shift scanning
pub const NACHTWERK: &str = "nachtwerk";

/// Room-type key → price per m²
pub type PriceTable = BTreeMap<String, f64>;

/// A `scanOnly` entry is either a single price or a price per scanning time slot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScanOnlyEntry {
    Flat(f64),
    ByTimeSlot(BTreeMap<String, f64>),
}

impl ScanOnlyEntry {
    /// A number is a flat price, an object a per-slot table; anything else is no entry
    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(Self::Flat),
            Value::Object(_) => Some(Self::ByTimeSlot(numeric_leaves(value))),
            _ => None,
        }
    }

    /// Resolve the price for a time slot
    ///
    /// A flat entry ignores the slot. A per-slot entry falls back to `overdag`
    /// when the slot is unset or missing, and to 0 when that is missing too.
    pub fn price_for(&self, scanning_time: Option<&str>) -> f64 {
        match self {
            Self::Flat(price) => *price,
            Self::ByTimeSlot(slots) => scanning_time
                .and_then(|slot| slots.get(slot))
                .or_else(|| slots.get(OVERDAG))
                .copied()
                .unwrap_or(0.0),
        }
    }
}

/// The pricing document
///
/// Unknown top-level keys are kept in `extra` so a load/save cycle does not
/// drop anything the admin page did not know about.
///
/// Sections are read leniently: a price that is not a number, or a label
/// that is not a string, is skipped like a missing key instead of failing
/// the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingModel {
    #[serde(rename = "scanToBIM", default, deserialize_with = "price_table")]
    pub scan_to_bim: PriceTable,
    #[serde(rename = "scanOnly", default, deserialize_with = "scan_only_table")]
    pub scan_only: BTreeMap<String, ScanOnlyEntry>,
    #[serde(rename = "modelOnly", default, deserialize_with = "price_table")]
    pub model_only: PriceTable,
    #[serde(rename = "roomTypeLabels", default, deserialize_with = "label_table")]
    pub room_type_labels: BTreeMap<String, String>,
    #[serde(rename = "serviceTypeLabels", default, deserialize_with = "label_table")]
    pub service_type_labels: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Numeric entries of a JSON object; non-objects yield an empty table
fn numeric_leaves(value: Value) -> PriceTable {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, v)| v.as_f64().map(|price| (key, price)))
            .collect(),
        _ => PriceTable::new(),
    }
}

fn price_table<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PriceTable, D::Error> {
    Ok(numeric_leaves(Value::deserialize(deserializer)?))
}

fn scan_only_table<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, ScanOnlyEntry>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(room, v)| ScanOnlyEntry::from_json(v).map(|entry| (room, entry)))
            .collect(),
        _ => BTreeMap::new(),
    })
}

fn label_table<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, v)| match v {
                Value::String(label) => Some((key, label)),
                _ => None,
            })
            .collect(),
        _ => BTreeMap::new(),
    })
}

impl PricingModel {
    /// Parse a pricing document from a JSON value
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Serialize back to a JSON value
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Display label for a room type, falling back to the raw key
    pub fn room_label<'a>(&'a self, room_type: &'a str) -> &'a str {
        self.room_type_labels
            .get(room_type)
            .map(String::as_str)
            .unwrap_or(room_type)
    }

    /// Display label for a service type, falling back to the raw key
    pub fn service_label<'a>(&'a self, service_type: &'a str) -> &'a str {
        self.service_type_labels
            .get(service_type)
            .map(String::as_str)
            .unwrap_or(service_type)
    }

    /// Read the leaf addressed by `path`, if it exists
    pub fn get(&self, path: &PricePath) -> Option<f64> {
        match path {
            PricePath::ScanToBim(room) => self.scan_to_bim.get(room).copied(),
            PricePath::ModelOnly(room) => self.model_only.get(room).copied(),
            PricePath::ScanOnly { room, slot } => match (self.scan_only.get(room)?, slot) {
                (ScanOnlyEntry::Flat(price), None) => Some(*price),
                (ScanOnlyEntry::ByTimeSlot(slots), Some(slot)) => slots.get(slot).copied(),
                _ => None,
            },
        }
    }

    /// Overwrite the leaf addressed by `path`
    ///
    /// Missing room keys are created. Writing a slot into a flat `scanOnly`
    /// entry turns it into a per-slot entry holding only that slot; writing
    /// without a slot flattens the entry.
    pub fn set(&mut self, path: &PricePath, value: f64) {
        match path {
            PricePath::ScanToBim(room) => {
                self.scan_to_bim.insert(room.clone(), value);
            }
            PricePath::ModelOnly(room) => {
                self.model_only.insert(room.clone(), value);
            }
            PricePath::ScanOnly { room, slot: None } => {
                self.scan_only.insert(room.clone(), ScanOnlyEntry::Flat(value));
            }
            PricePath::ScanOnly {
                room,
                slot: Some(slot),
            } => match self.scan_only.get_mut(room) {
                Some(ScanOnlyEntry::ByTimeSlot(slots)) => {
                    slots.insert(slot.clone(), value);
                }
                _ => {
                    let slots = BTreeMap::from([(slot.clone(), value)]);
                    self.scan_only
                        .insert(room.clone(), ScanOnlyEntry::ByTimeSlot(slots));
                }
            },
        }
    }

    /// Every editable leaf in document order, as used by the admin editor
    pub fn price_paths(&self) -> Vec<PricePath> {
        let mut paths: Vec<PricePath> = self
            .scan_to_bim
            .keys()
            .map(|room| PricePath::ScanToBim(room.clone()))
            .collect();

        for (room, entry) in &self.scan_only {
            match entry {
                ScanOnlyEntry::Flat(_) => paths.push(PricePath::ScanOnly {
                    room: room.clone(),
                    slot: None,
                }),
                ScanOnlyEntry::ByTimeSlot(slots) => {
                    paths.extend(slots.keys().map(|slot| PricePath::ScanOnly {
                        room: room.clone(),
                        slot: Some(slot.clone()),
                    }))
                }
            }
        }

        paths.extend(
            self.model_only
                .keys()
                .map(|room| PricePath::ModelOnly(room.clone())),
        );
        paths
    }
}

/// Address of a single editable price
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PricePath {
    ScanToBim(String),
    ScanOnly { room: String, slot: Option<String> },
    ModelOnly(String),
}

impl FromStr for PricePath {
    type Err = String;

    /// Parse `scanToBIM.<room>`, `modelOnly.<room>`, `scanOnly.<room>` or
    /// `scanOnly.<room>.<slot>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(format!("Invalid price path: '{}'", s));
        }

        match parts.as_slice() {
            ["scanToBIM", room] => Ok(Self::ScanToBim(room.to_string())),
            ["modelOnly", room] => Ok(Self::ModelOnly(room.to_string())),
            ["scanOnly", room] => Ok(Self::ScanOnly {
                room: room.to_string(),
                slot: None,
            }),
            ["scanOnly", room, slot] => Ok(Self::ScanOnly {
                room: room.to_string(),
                slot: Some(slot.to_string()),
            }),
            _ => Err(format!(
                "Invalid price path: '{}' (expected scanToBIM.<room>, modelOnly.<room> or scanOnly.<room>[.<slot>])",
                s
            )),
        }
    }
}

impl fmt::Display for PricePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScanToBim(room) => write!(f, "scanToBIM.{}", room),
            Self::ModelOnly(room) => write!(f, "modelOnly.{}", room),
            Self::ScanOnly { room, slot: None } => write!(f, "scanOnly.{}", room),
            Self::ScanOnly {
                room,
                slot: Some(slot),
            } => write!(f, "scanOnly.{}.{}", room, slot),
        }
    }
}

/// Parse a price the way a browser number input does
///
/// Leading whitespace is skipped and the longest numeric prefix is used
/// (`"12.5abc"` → 12.5). Anything unparseable or non-finite becomes 0.
pub fn parse_price_input(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    if let Ok(value) = trimmed.trim_end().parse::<f64>() {
        return if value.is_finite() { value } else { 0.0 };
    }

    let bytes = trimmed.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;

    while end < bytes.len() {
        match bytes[end] {
            b'+' | b'-' if end == 0 => {}
            b'+' | b'-' if seen_exp && matches!(bytes[end - 1], b'e' | b'E') => {}
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => seen_exp = true,
            _ => break,
        }
        end += 1;
    }

    // Back off until the prefix parses ("1e" → "1", "3." → "3.")
    while end > 0 {
        if let Ok(value) = trimmed[..end].parse::<f64>() {
            return if value.is_finite() { value } else { 0.0 };
        }
        end -= 1;
    }
    0.0
}
