//! Persistence for the pricing document
//!
//! Reads go through a fixed fallback chain: the configured remote store (KV
//! or edge-config) first, the static JSON file second. Writes only ever go to
//! the remote store; without one they are accepted but not persisted.

pub mod edge_config;
pub mod kv;
pub mod static_file;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::metrics;
use crate::pricing::PricingModel;

pub use edge_config::EdgeConfigStore;
pub use kv::KvStore;

/// Key of the pricing document in the remote store
pub const PRICING_KEY: &str = "pricing";

/// Reason given when a save arrives without a credential
pub const UNAUTHENTICATED: &str = "unauthenticated";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store responded with {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid pricing document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0}")]
    Unavailable(String),
}

/// Where a pricing document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingSource {
    #[serde(rename = "kv")]
    Kv,
    #[serde(rename = "edge-config")]
    EdgeConfig,
    #[serde(rename = "static")]
    Static,
}

impl PricingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kv => "kv",
            Self::EdgeConfig => "edge-config",
            Self::Static => "static",
        }
    }
}

impl fmt::Display for PricingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A loaded document together with its source
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPricing {
    pub model: PricingModel,
    pub source: PricingSource,
}

/// Result of a save attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to the remote store
    Persisted,
    /// Received, but no durable store is configured
    AcceptedNotPersisted(String),
    /// Refused; nothing was written
    Rejected(String),
}

impl SaveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persisted => "persisted",
            Self::AcceptedNotPersisted(_) => "accepted_not_persisted",
            Self::Rejected(_) => "rejected",
        }
    }

    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Pluggable remote backend
#[derive(Debug, Clone)]
pub enum RemoteStore {
    Kv(KvStore),
    EdgeConfig(EdgeConfigStore),
}

impl RemoteStore {
    pub fn source(&self) -> PricingSource {
        match self {
            Self::Kv(_) => PricingSource::Kv,
            Self::EdgeConfig(_) => PricingSource::EdgeConfig,
        }
    }

    async fn fetch(&self) -> Result<Option<serde_json::Value>, StoreError> {
        match self {
            Self::Kv(store) => store.get(PRICING_KEY).await,
            Self::EdgeConfig(store) => store.get(PRICING_KEY).await,
        }
    }

    /// Reason writes are impossible, if they are
    fn write_blocker(&self) -> Option<String> {
        match self {
            Self::Kv(_) => None,
            Self::EdgeConfig(store) if !store.can_write() => Some(
                "Pricing received but not persisted: edge config write token (VERCEL_ACCESS_TOKEN) is not configured"
                    .to_string(),
            ),
            Self::EdgeConfig(_) => None,
        }
    }

    async fn persist(&self, value: &serde_json::Value) -> Result<(), StoreError> {
        match self {
            Self::Kv(store) => store.set(PRICING_KEY, value).await,
            Self::EdgeConfig(store) => store.upsert(PRICING_KEY, value).await,
        }
    }
}

/// The pricing document store
#[derive(Debug, Clone)]
pub struct PricingStore {
    remote: Option<RemoteStore>,
    static_path: PathBuf,
}

impl PricingStore {
    pub fn new(remote: Option<RemoteStore>, static_path: impl Into<PathBuf>) -> Self {
        Self {
            remote,
            static_path: static_path.into(),
        }
    }

    /// Build the store described by the storage config
    ///
    /// A KV pair takes precedence over an edge-config connection string;
    /// with neither the store runs in static read-only mode.
    pub fn from_config(cfg: &StorageConfig, client: reqwest::Client) -> anyhow::Result<Self> {
        let remote = if let Some(kv) = &cfg.kv {
            Some(RemoteStore::Kv(KvStore::new(client, kv)))
        } else if let Some(edge) = &cfg.edge_config {
            Some(RemoteStore::EdgeConfig(EdgeConfigStore::from_settings(client, edge)?))
        } else {
            None
        };

        Ok(Self::new(remote, cfg.static_path.clone()))
    }

    pub fn remote_source(&self) -> Option<PricingSource> {
        self.remote.as_ref().map(RemoteStore::source)
    }

    pub fn static_path(&self) -> &Path {
        &self.static_path
    }

    /// Read the document from the remote store only
    ///
    /// Errors, absent data and unparseable documents all yield `None`.
    pub async fn fetch_remote(&self) -> Option<LoadedPricing> {
        let remote = self.remote.as_ref()?;
        let source = remote.source();
        let start = Instant::now();

        let result = remote.fetch().await;
        metrics::record_store_duration(source.as_str(), "read", start.elapsed());

        match result {
            Ok(Some(value)) => match PricingModel::from_value(value) {
                Ok(model) => Some(LoadedPricing { model, source }),
                Err(e) => {
                    warn!(source = %source, error = %e, "Remote pricing document is invalid, falling back");
                    None
                }
            },
            Ok(None) => {
                debug!(source = %source, "No pricing document in remote store");
                None
            }
            Err(e) => {
                warn!(source = %source, error = %e, "Remote pricing store not available, falling back");
                None
            }
        }
    }

    /// Load the document: remote store first, static file second
    pub async fn load(&self) -> Result<LoadedPricing, StoreError> {
        if let Some(loaded) = self.fetch_remote().await {
            metrics::record_pricing_load(loaded.source.as_str());
            return Ok(loaded);
        }

        match static_file::read_pricing(&self.static_path).await {
            Ok(model) => {
                metrics::record_pricing_load(PricingSource::Static.as_str());
                debug!(path = %self.static_path.display(), "Loaded static pricing document");
                Ok(LoadedPricing {
                    model,
                    source: PricingSource::Static,
                })
            }
            Err(e) => {
                warn!(error = %e, "No pricing source available");
                Err(StoreError::Unavailable(format!(
                    "No pricing configuration available: {}",
                    e
                )))
            }
        }
    }

    /// Save the document to the remote store
    ///
    /// The credential is opaque: only its presence is checked.
    pub async fn save(&self, model: &PricingModel, credential: Option<&str>) -> SaveOutcome {
        let outcome = self.save_inner(model, credential).await;
        metrics::record_pricing_save(outcome.as_str());

        match &outcome {
            SaveOutcome::Persisted => info!(
                source = ?self.remote_source().map(|s| s.as_str()),
                "Pricing persisted"
            ),
            SaveOutcome::AcceptedNotPersisted(reason) => warn!(reason = %reason, "Pricing not persisted"),
            SaveOutcome::Rejected(reason) => warn!(reason = %reason, "Pricing save rejected"),
        }
        outcome
    }

    async fn save_inner(&self, model: &PricingModel, credential: Option<&str>) -> SaveOutcome {
        if credential.map_or(true, |c| c.trim().is_empty()) {
            return SaveOutcome::Rejected(UNAUTHENTICATED.to_string());
        }

        let value = match model.to_value() {
            Ok(value) => value,
            Err(e) => return SaveOutcome::Rejected(format!("Invalid pricing data: {}", e)),
        };

        let Some(remote) = &self.remote else {
            info!(
                sections = ?value.as_object().map(|o| o.keys().cloned().collect::<Vec<_>>()),
                "Pricing update received without a persistent store"
            );
            return SaveOutcome::AcceptedNotPersisted(
                "Pricing received but not persisted: no KV or edge config store is configured"
                    .to_string(),
            );
        };

        if let Some(reason) = remote.write_blocker() {
            return SaveOutcome::AcceptedNotPersisted(reason);
        }

        let start = Instant::now();
        let result = remote.persist(&value).await;
        metrics::record_store_duration(remote.source().as_str(), "write", start.elapsed());

        match result {
            Ok(()) => SaveOutcome::Persisted,
            Err(e) => SaveOutcome::Rejected(e.to_string()),
        }
    }
}
