pub mod auth;
pub mod health;
pub mod metrics_handler;
pub mod pricing;
pub mod quote;

use arc_swap::ArcSwap;
use axum::http::StatusCode;
use std::sync::Arc;

use crate::{auth::PasswordAuthenticator, config::Config, store::PricingStore};

/// Shared handler state
///
/// Config and store sit behind `ArcSwap` so a SIGHUP reload replaces both
/// without interrupting in-flight requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<Config>>,
    pub store: Arc<ArcSwap<PricingStore>>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, store: PricingStore, http_client: reqwest::Client) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            store: Arc::new(ArcSwap::from_pointee(store)),
            http_client,
        }
    }

    /// Build the state, including the store, from a loaded config
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::new();
        let store = PricingStore::from_config(&config.storage, http_client.clone())?;
        Ok(Self::new(config, store, http_client))
    }

    /// Current pricing store
    pub fn store(&self) -> Arc<PricingStore> {
        self.store.load_full()
    }

    /// Authenticator for the currently configured admin password
    pub fn authenticator(&self) -> PasswordAuthenticator {
        PasswordAuthenticator::new(self.config.load().admin.password.clone())
    }
}

/// Answer CORS pre-flight requests that reach a route
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
