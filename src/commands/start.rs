use anyhow::Result;
use colored::Colorize;
use bim_costcalculator::{config, server};
use std::path::PathBuf;
use tracing::info;

/// Execute the start command
///
/// Loads configuration and runs the server until a shutdown signal arrives
pub async fn execute(config_path: PathBuf) -> Result<()> {
    println!("{}", "Starting BIM cost calculator...".green());

    let cfg = config::load_config(&config_path)?;
    info!(config = %config_path.display(), "Configuration loaded");

    server::start_server(cfg, config_path).await?;

    Ok(())
}
