//! Catalog collaborator client
//!
//! The catalog service owns book metadata and a coarse availability flag.
//! The core consumes it through a narrow capability trait so tests can
//! substitute a mock; metadata is enrichment only, never a correctness input.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::CollaboratorsConfig,
    error::{AppError, AppResult},
};

/// Book metadata as served by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub is_available: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Metadata for one item; `None` when the catalog has no such item
    async fn get_item_metadata(&self, item_ref: Uuid) -> AppResult<Option<ItemMetadata>>;

    /// Batch metadata lookup; absent items are simply missing from the map
    async fn get_items_metadata(
        &self,
        item_refs: &[Uuid],
    ) -> AppResult<HashMap<Uuid, ItemMetadata>>;

    /// Flip the catalog's coarse "is available" flag for an item
    async fn set_availability_flag(&self, item_ref: Uuid, available: bool) -> AppResult<()>;
}

/// HTTP implementation talking to the catalog service
pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(config: &CollaboratorsConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build catalog client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.catalog_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn get_item_metadata(&self, item_ref: Uuid) -> AppResult<Option<ItemMetadata>> {
        let response = self
            .http
            .get(format!("{}/api/books/{}", self.base_url, item_ref))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Catalog unreachable: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Catalog returned {} for item {}",
                response.status(),
                item_ref
            )));
        }

        let metadata = response
            .json::<ItemMetadata>()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid catalog response: {}", e)))?;

        Ok(Some(metadata))
    }

    async fn get_items_metadata(
        &self,
        item_refs: &[Uuid],
    ) -> AppResult<HashMap<Uuid, ItemMetadata>> {
        if item_refs.is_empty() {
            return Ok(HashMap::new());
        }

        let response = self
            .http
            .post(format!("{}/api/books/batch", self.base_url))
            .json(&item_refs)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Catalog unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Catalog returned {} for batch lookup",
                response.status()
            )));
        }

        let items = response
            .json::<Vec<ItemMetadata>>()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid catalog response: {}", e)))?;

        Ok(items.into_iter().map(|m| (m.id, m)).collect())
    }

    async fn set_availability_flag(&self, item_ref: Uuid, available: bool) -> AppResult<()> {
        let response = self
            .http
            .put(format!(
                "{}/api/books/{}/availability",
                self.base_url, item_ref
            ))
            .json(&serde_json::json!({ "isAvailable": available }))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Catalog unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Catalog returned {} updating availability for {}",
                response.status(),
                item_ref
            )));
        }

        Ok(())
    }
}
