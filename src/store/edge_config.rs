use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::config::EdgeConfigSettings;
use crate::store::StoreError;

/// Edge-config store
///
/// Reads use the connection string's read token against the edge origin;
/// writes go through the management API and need a separate access token.
#[derive(Debug, Clone)]
pub struct EdgeConfigStore {
    client: Client,
    base_url: String,
    id: String,
    read_token: String,
    api_base_url: String,
    write_token: Option<String>,
}

impl EdgeConfigStore {
    pub fn from_settings(client: Client, settings: &EdgeConfigSettings) -> anyhow::Result<Self> {
        let connection = settings.parse_connection()?;
        Ok(Self {
            client,
            base_url: connection.base_url,
            id: connection.id,
            read_token: connection.read_token,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            write_token: settings
                .write_token
                .clone()
                .filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn can_write(&self) -> bool {
        self.write_token.is_some()
    }

    /// Read an item; `None` when the item does not exist
    pub async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .client
            .get(format!("{}/{}/item/{}", self.base_url, self.id, key))
            .query(&[("token", self.read_token.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
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

        let value: Value = response.json().await?;
        Ok((!value.is_null()).then_some(value))
    }

    /// Create or replace an item
    pub async fn upsert(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let token = self.write_token.as_deref().ok_or_else(|| {
            StoreError::Unavailable("edge config write token is not configured".to_string())
        })?;

        let response = self
            .client
            .patch(format!("{}/v1/edge-config/{}/items", self.api_base_url, self.id))
            .bearer_auth(token)
            .json(&json!({
                "items": [{ "operation": "upsert", "key": key, "value": value }]
            }))
            .send()
            .await?;

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
        Ok(())
    }
}
