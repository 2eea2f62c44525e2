use anyhow::Result;
use colored::Colorize;
use bim_costcalculator::config::{self, Config};
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the current configuration with secrets masked
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Storage: {}", storage_mode(&cfg));
    println!(
        "  Admin password: {}",
        if cfg.admin.password == config::DEFAULT_ADMIN_PASSWORD {
            "default (set ADMIN_PASSWORD)".yellow()
        } else {
            "custom".green()
        }
    );

    info!("Configuration validation successful");
    Ok(())
}

fn storage_mode(cfg: &Config) -> &'static str {
    match (&cfg.storage.kv, &cfg.storage.edge_config) {
        (Some(_), _) => "kv",
        (None, Some(_)) => "edge-config",
        (None, None) => "static",
    }
}

/// Sanitize secrets in configuration for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();

    sanitized.admin.password = mask_secret(&sanitized.admin.password);

    if let Some(kv) = sanitized.storage.kv.as_mut() {
        kv.token = mask_secret(&kv.token);
    }

    if let Some(edge) = sanitized.storage.edge_config.as_mut() {
        edge.connection = mask_connection_token(&edge.connection);
        edge.write_token = edge.write_token.as_deref().map(mask_secret);
    }

    sanitized
}

/// Mask a secret for safe display
///
/// Shows first 7 and last 4 characters with the middle elided
/// Example: "AXk1234567890abcdef" -> "AXk1234...cdef"
fn mask_secret(secret: &str) -> String {
    if secret.len() <= 11 || !secret.is_ascii() {
        return "***".to_string();
    }

    let prefix = &secret[..7];
    let suffix = &secret[secret.len() - 4..];

    format!("{}...{}", prefix, suffix)
}

/// Mask the `token` query parameter of an edge-config connection string
fn mask_connection_token(connection: &str) -> String {
    match connection.split_once("token=") {
        Some((base, token)) => format!("{}token={}", base, mask_secret(token)),
        None => connection.to_string(),
    }
}
