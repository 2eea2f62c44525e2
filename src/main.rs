use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use bim_costcalculator::{config, init_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Commands report config errors themselves; logging just falls back to info
    let log_level = config::load_config(&args.config)
        .map(|cfg| cfg.server.log_level)
        .unwrap_or_else(|_| "info".to_string());
    init_tracing(&log_level);

    let config_path = args.config.clone();

    match args.get_command() {
        cli::Commands::Start => {
            commands::start::execute(config_path).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&config_path).await?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&config_path)?,
            cli::ConfigCommands::Validate => commands::config::validate(&config_path)?,
        },
        cli::Commands::Quote(quote_args) => {
            commands::quote::execute(&config_path, quote_args).await?;
        }
        cli::Commands::Admin { action } => match action {
            cli::AdminCommands::Set(set_args) => commands::admin::set(set_args).await?,
        },
        cli::Commands::Version => {
            println!("BIM Cost Calculator v{}", env!("CARGO_PKG_VERSION"));
            println!("Rust {}", env!("CARGO_PKG_RUST_VERSION"));
        }
    }

    Ok(())
}
