use std::path::Path;

use crate::pricing::PricingModel;
use crate::store::StoreError;

/// Read and parse the static fallback document
pub async fn read_pricing(path: &Path) -> Result<PricingModel, StoreError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(serde_json::from_str(&content)?)
}
