use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Password used when neither the config file nor `ADMIN_PASSWORD` sets one
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Static fallback document
    pub static_path: PathBuf,
    pub kv: Option<KvConfig>,
    pub edge_config: Option<EdgeConfigSettings>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            static_path: PathBuf::from("config/pricing.json"),
            kv: None,
            edge_config: None,
        }
    }
}

/// Redis-over-REST key-value store (`KV_REST_API_URL` / `KV_REST_API_TOKEN`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KvConfig {
    pub url: String,
    pub token: String,
}

/// Edge-config store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EdgeConfigSettings {
    /// Connection string, e.g. `https://edge-config.vercel.com/ecfg_abc?token=xyz`
    pub connection: String,
    /// Management API token; without it writes are accepted but not persisted
    #[serde(default)]
    pub write_token: Option<String>,
    #[serde(default = "default_edge_config_api_url")]
    pub api_base_url: String,
}

fn default_edge_config_api_url() -> String {
    "https://api.vercel.com".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
        }
    }
}

/// Parts of an edge-config connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeConfigConnection {
    /// Origin the items are read from
    pub base_url: String,
    pub id: String,
    pub read_token: String,
}

impl EdgeConfigSettings {
    /// Split the connection string into origin, config id and read token
    pub fn parse_connection(&self) -> anyhow::Result<EdgeConfigConnection> {
        let url = Url::parse(&self.connection)
            .map_err(|e| anyhow::anyhow!("Invalid edge config connection string: {}", e))?;

        let id = url
            .path_segments()
            .and_then(|mut segments| segments.find(|s| !s.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Edge config connection string has no config id"))?;

        let read_token = url
            .query_pairs()
            .find(|(k, _)| k == "token")
            .map(|(_, v)| v.into_owned())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Edge config connection string has no token"))?;

        let base_url = url.origin().ascii_serialization();

        Ok(EdgeConfigConnection {
            base_url,
            id,
            read_token,
        })
    }
}

/// Load configuration from an optional TOML file and the environment
///
/// Layers, lowest first: built-in defaults, the config file (if present),
/// `COSTCALC__SECTION__KEY` variables, then the platform variables
/// (`ADMIN_PASSWORD`, `KV_REST_API_URL`, ...).
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("COSTCALC").separator("__"))
        .build()?;

    let mut cfg: Config = settings.try_deserialize()?;
    apply_platform_env(&mut cfg, |key| std::env::var(key).ok());
    validate_config(&cfg)?;

    Ok(cfg)
}

/// Apply the well-known deployment variables on top of the loaded config
///
/// Empty values count as unset.
pub fn apply_platform_env<F>(cfg: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(password) = var("ADMIN_PASSWORD") {
        cfg.admin.password = password;
    }

    match (var("KV_REST_API_URL"), var("KV_REST_API_TOKEN")) {
        (Some(url), Some(token)) => cfg.storage.kv = Some(KvConfig { url, token }),
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!("Only one of KV_REST_API_URL / KV_REST_API_TOKEN is set, ignoring both");
        }
        (None, None) => {}
    }

    if let Some(connection) = var("EDGE_CONFIG") {
        let previous = cfg.storage.edge_config.take();
        cfg.storage.edge_config = Some(EdgeConfigSettings {
            connection,
            write_token: previous.as_ref().and_then(|p| p.write_token.clone()),
            api_base_url: previous
                .map(|p| p.api_base_url)
                .unwrap_or_else(default_edge_config_api_url),
        });
    }

    if let Some(token) = var("VERCEL_ACCESS_TOKEN") {
        if let Some(edge) = cfg.storage.edge_config.as_mut() {
            edge.write_token = Some(token);
        }
    }
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    if cfg.admin.password.is_empty() {
        anyhow::bail!("Admin password cannot be empty");
    }

    if cfg.storage.static_path.as_os_str().is_empty() {
        anyhow::bail!("Static pricing path cannot be empty");
    }

    if let Some(kv) = &cfg.storage.kv {
        if kv.url.is_empty() || kv.token.is_empty() {
            anyhow::bail!("KV store requires both url and token");
        }
        Url::parse(&kv.url).map_err(|e| anyhow::anyhow!("Invalid KV url '{}': {}", kv.url, e))?;
    }

    if let Some(edge) = &cfg.storage.edge_config {
        edge.parse_connection()?;
        Url::parse(&edge.api_base_url).map_err(|e| {
            anyhow::anyhow!("Invalid edge config API url '{}': {}", edge.api_base_url, e)
        })?;
    }

    if cfg.metrics.enabled && !cfg.metrics.endpoint.starts_with('/') {
        anyhow::bail!("Metrics endpoint must start with '/'");
    }

    Ok(())
}
