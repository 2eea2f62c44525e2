use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use crate::config::load_config;
use crate::handlers::AppState;
use crate::store::PricingStore;

/// Shutdown signal types
#[derive(Debug, Clone, Copy)]
pub enum ShutdownSignal {
    /// Graceful shutdown (drain connections, clean up)
    Graceful,
}

/// Setup signal handlers for the server
///
/// Returns a broadcast sender for shutdown signals and a join handle for the signal task
///
/// Handles:
/// - SIGTERM/SIGINT: Graceful shutdown
/// - SIGHUP: Configuration reload
#[cfg(unix)]
pub fn setup_signal_handlers(
    state: AppState,
    config_path: PathBuf,
) -> Result<(broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("SIGTERM received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sigint.recv() => {
                    info!("SIGINT received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sighup.recv() => {
                    info!("SIGHUP received, reloading configuration");
                    if let Err(e) = reload_config(&state, &config_path) {
                        error!("Failed to reload configuration: {}", e);
                    } else {
                        info!("Configuration reloaded successfully");
                    }
                }
            }
        }
    });

    Ok((shutdown_tx, handle))
}

/// Windows placeholder - only Ctrl+C is supported
#[cfg(not(unix))]
pub fn setup_signal_handlers(
    _state: AppState,
    _config_path: PathBuf,
) -> Result<(broadcast::Sender<ShutdownSignal>, tokio::task::JoinHandle<()>)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, initiating shutdown");
                let _ = tx_clone.send(ShutdownSignal::Graceful);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    });

    Ok((shutdown_tx, handle))
}

/// Reload configuration and rebuild the pricing store
///
/// Both are validated before anything is swapped; on failure the running
/// configuration stays in place.
pub fn reload_config(state: &AppState, config_path: &Path) -> Result<()> {
    let new_config = load_config(config_path)?;
    let new_store = PricingStore::from_config(&new_config.storage, state.http_client.clone())?;

    let current = state.config.load();
    if current.server.host != new_config.server.host || current.server.port != new_config.server.port {
        warn!(
            "Listen address changed to {}:{}; restart the server to apply it",
            new_config.server.host, new_config.server.port
        );
    }

    info!(
        remote = ?new_store.remote_source().map(|s| s.as_str()),
        static_path = %new_store.static_path().display(),
        "New pricing store built"
    );

    state.config.store(Arc::new(new_config));
    state.store.store(Arc::new(new_store));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::PricingSource;
    use std::io::Write;

    fn test_state() -> AppState {
        AppState::new(
            Config::default(),
            PricingStore::new(None, "config/pricing.json"),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_setup_signal_handlers() {
        let (shutdown_tx, _handle) =
            setup_signal_handlers(test_state(), PathBuf::from("config.toml")).unwrap();

        let mut rx = shutdown_tx.subscribe();
        shutdown_tx.send(ShutdownSignal::Graceful).unwrap();

        let received = rx.recv().await.unwrap();
        assert!(matches!(received, ShutdownSignal::Graceful));
    }

    #[test]
    fn test_reload_swaps_config_and_store() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[admin]
password = "reloaded"

[storage]
static_path = "other/pricing.json"

[storage.kv]
url = "https://kv.example.com"
token = "kv-token"
"#
        )
        .unwrap();

        let state = test_state();
        reload_config(&state, file.path()).unwrap();

        assert_eq!(state.config.load().admin.password, "reloaded");
        assert_eq!(state.store().remote_source(), Some(PricingSource::Kv));
    }

    #[test]
    fn test_failed_reload_keeps_running_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "[server]\nport = 0\n").unwrap();

        let state = test_state();
        assert!(reload_config(&state, file.path()).is_err());
        assert_eq!(state.config.load().server.port, 8080);
        assert_eq!(state.store().remote_source(), None);
    }
}
