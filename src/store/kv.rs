use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::KvConfig;
use crate::store::StoreError;

/// Redis-over-REST key-value store
///
/// `GET {url}/get/{key}` and `POST {url}/set/{key}` (body = value), both
/// authenticated with the REST token as a bearer. Values are stored as JSON
/// strings.
#[derive(Debug, Clone)]
pub struct KvStore {
    client: Client,
    url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct KvResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl KvStore {
    pub fn new(client: Client, config: &KvConfig) -> Self {
        Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    /// Read a key; `None` when the key does not exist
    pub async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .client
            .get(format!("{}/get/{}", self.url, key))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        match body.result {
            None | Some(Value::Null) => Ok(None),
            // Stored via `set` as a JSON string
            Some(Value::String(raw)) => Ok(Some(serde_json::from_str(&raw)?)),
            // Some clients store the object directly
            Some(other) => Ok(Some(other)),
        }
    }

    /// Write a key, replacing any existing value
    pub async fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let response = self
            .client
            .post(format!("{}/set/{}", self.url, key))
            .bearer_auth(&self.token)
            .body(value.to_string())
            .send()
            .await?;

        Self::read_body(response).await?;
        Ok(())
    }

    async fn read_body(response: reqwest::Response) -> Result<KvResponse, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: KvResponse = response.json().await?;
        if let Some(message) = body.error {
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}
