use anyhow::Result;
use colored::Colorize;
use bim_costcalculator::{
    config,
    pricing::{self, format_currency, format_number, QuoteInput, ServiceType, Severity},
    store::PricingStore,
};
use std::path::Path;
use tracing::{info, warn};

use crate::cli::QuoteArgs;

/// Execute the quote command
///
/// Loads pricing through the configured fallback chain and prints the price
/// and advice for one selection
pub async fn execute(config_path: &Path, args: QuoteArgs) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let store = PricingStore::from_config(&cfg.storage, reqwest::Client::new())?;
    let loaded = store.load().await?;

    if ServiceType::parse(&args.service).is_none() {
        warn!(service_type = %args.service, "Unknown service type, pricing at 0");
    }

    let quote = pricing::quote(
        &loaded.model,
        &QuoteInput {
            surface_area: args.area,
            service_type: args.service,
            room_type: args.room,
            scanning_time: args.time,
        },
    );
    info!(source = %loaded.source, "Quote calculated");

    println!("{}", "Quote".green().bold());
    println!("  {}: {}", "Service".cyan(), quote.service_label);
    println!("  {}: {}", "Room".cyan(), quote.room_label);
    if let Some(time) = &quote.scanning_time {
        println!("  {}: {}", "Scanning time".cyan(), time);
    }
    println!("  {}: {} m²", "Surface".cyan(), format_number(quote.surface_area));
    println!("  {}: {}", "Price per m²".cyan(), format_currency(quote.unit_price));
    println!(
        "  {}: {}",
        "Total".cyan(),
        format_currency(quote.total_price).as_str().bold()
    );
    println!("  {}: {}", "Pricing source".cyan(), loaded.source);
    println!();

    println!("{}", "Advice".bold());
    for advice in &quote.advice {
        let marker = match advice.severity {
            Severity::Info => "ℹ".blue(),
            Severity::Warning => "⚠".yellow(),
            Severity::Success => "✓".green(),
        };
        println!("  {} {}", marker, advice.message);
    }

    Ok(())
}
