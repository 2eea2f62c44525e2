use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "costcalc", version, about = "BIM cost calculator")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the pricing API server (default)
    Start,

    /// Test configuration and pricing sources
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Calculate a quote with the configured pricing
    Quote(QuoteArgs),

    /// Edit pricing on a running server
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration (with secrets masked)
    Show,

    /// Validate configuration file
    Validate,
}

#[derive(Args, Debug, Clone)]
pub struct QuoteArgs {
    /// Surface area in m²
    #[arg(short, long)]
    pub area: f64,

    /// Service type: scan-to-bim, scan-only or model-only
    #[arg(short, long)]
    pub service: String,

    /// Room type key, e.g. standaard or technisch
    #[arg(short, long)]
    pub room: String,

    /// Scanning time slot: overdag or nachtwerk
    #[arg(short, long)]
    pub time: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommands {
    /// Change one or more prices and save them
    Set(AdminSetArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AdminSetArgs {
    /// Base URL of the running server
    #[arg(short, long, default_value = "http://localhost:8080")]
    pub url: String,

    /// Admin password
    #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Price assignments such as scanToBIM.technisch=45 or scanOnly.technisch.nachtwerk=3.5
    #[arg(required = true, value_name = "PATH=VALUE")]
    pub changes: Vec<String>,
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_start() {
        let cli = Cli::try_parse_from(["costcalc"]).unwrap();
        assert!(matches!(cli.get_command(), Commands::Start));
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn test_cli_parsing_quote() {
        let args = [
            "costcalc", "quote", "--area", "1500", "--service", "scan-only", "--room",
            "technisch", "--time", "nachtwerk",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Quote(quote) => {
                assert_eq!(quote.area, 1500.0);
                assert_eq!(quote.service, "scan-only");
                assert_eq!(quote.time.as_deref(), Some("nachtwerk"));
            }
            _ => panic!("Expected Quote command"),
        }
    }

    #[test]
    fn test_cli_parsing_admin_set() {
        let args = [
            "costcalc",
            "admin",
            "set",
            "--password",
            "secret",
            "scanToBIM.technisch=45",
            "modelOnly.standaard=8",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.get_command() {
            Commands::Admin {
                action: AdminCommands::Set(set),
            } => {
                assert_eq!(set.url, "http://localhost:8080");
                assert_eq!(set.changes.len(), 2);
            }
            _ => panic!("Expected Admin Set command"),
        }
    }

    #[test]
    fn test_cli_parsing_config_show_with_global_config() {
        let cli = Cli::try_parse_from(["costcalc", "config", "show", "--config", "prod.toml"]).unwrap();

        assert_eq!(cli.config, PathBuf::from("prod.toml"));
        assert!(matches!(
            cli.get_command(),
            Commands::Config {
                action: ConfigCommands::Show
            }
        ));
    }
}
