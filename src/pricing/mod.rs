pub mod advice;
pub mod calculator;
pub mod format;
pub mod models;

pub use advice::{advise, Advice, AdviceInput, Severity};
pub use calculator::{quote, total_price, unit_price, Quote, QuoteInput, ServiceType};
pub use format::{format_currency, format_number};
pub use models::{parse_price_input, PricePath, PricingModel, ScanOnlyEntry};
