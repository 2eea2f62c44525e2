use anyhow::{anyhow, Result};
use colored::Colorize;
use bim_costcalculator::{
    pricing::{format_number, PricePath},
    session::{AdminEditSession, HttpAdmin},
    store::SaveOutcome,
};
use tracing::info;

use crate::cli::AdminSetArgs;

/// Execute the admin set command
///
/// Logs in to a running server, applies the assignments to the loaded
/// pricing and saves the result
pub async fn set(args: AdminSetArgs) -> Result<()> {
    let changes = args
        .changes
        .iter()
        .map(String::as_str)
        .map(parse_assignment)
        .collect::<Result<Vec<_>>>()?;

    let backend = HttpAdmin::new(reqwest::Client::new(), args.url.as_str());
    let mut session = AdminEditSession::new(backend);

    println!("{} {}", "Logging in to".yellow(), args.url);
    session.login(&args.password).await?;

    for (path, raw) in &changes {
        let before = session.working_copy().and_then(|model| model.get(path));
        let after = session.edit(path, raw)?;
        println!(
            "  {}: {} → {}",
            path.to_string().as_str().cyan(),
            before.map(format_number).unwrap_or_else(|| "-".to_string()),
            format_number(after)
        );
    }

    if !session.is_dirty() {
        println!("{}", "No changes to save".yellow());
        return Ok(());
    }

    match session.save().await? {
        SaveOutcome::Persisted => println!("{}", "✓ Pricing saved".green()),
        SaveOutcome::AcceptedNotPersisted(message) => {
            println!("{} {}", "⚠".yellow(), message.yellow())
        }
        SaveOutcome::Rejected(reason) => return Err(anyhow!("Save rejected: {}", reason)),
    }

    session.logout();
    info!(changes = changes.len(), "Admin update finished");
    Ok(())
}

/// Split `PATH=VALUE` into a price path and the raw value
fn parse_assignment(change: &str) -> Result<(PricePath, String)> {
    let (path, value) = change
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected PATH=VALUE, got '{}'", change))?;

    let path = path.trim().parse::<PricePath>().map_err(|e| anyhow!(e))?;
    Ok((path, value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let (path, value) = parse_assignment("scanOnly.technisch.nachtwerk=3,5").unwrap();
        assert_eq!(path.to_string(), "scanOnly.technisch.nachtwerk");
        assert_eq!(value, "3,5");

        let (path, value) = parse_assignment(" modelOnly.standaard = 8 ").unwrap();
        assert_eq!(path, PricePath::ModelOnly("standaard".to_string()));
        assert_eq!(value, "8");
    }

    #[test]
    fn test_parse_assignment_errors() {
        assert!(parse_assignment("scanToBIM.standaard").is_err());
        assert!(parse_assignment("unknown.standaard=4").is_err());
    }
}
