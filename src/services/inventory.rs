//! Inventory management service

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::inventory::{Channel, Direction, ItemInventory, Movement},
    repository::Repository,
    services::cache::CacheService,
    services::catalog::{CatalogClient, ItemMetadata},
};

/// Post-mutation snapshot of an inventory, optionally enriched with catalog
/// metadata. Metadata is best-effort: its absence never fails a call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InventorySummary {
    pub item_ref: Uuid,
    pub physical_total: i32,
    pub physical_available: i32,
    pub digital_total: i32,
    pub digital_available: i32,
    pub last_updated_utc: chrono::DateTime<chrono::Utc>,
    pub metadata: Option<ItemMetadata>,
}

impl InventorySummary {
    pub fn from_inventory(inventory: &ItemInventory, metadata: Option<ItemMetadata>) -> Self {
        Self {
            item_ref: inventory.item_ref,
            physical_total: inventory.physical_total,
            physical_available: inventory.physical_available,
            digital_total: inventory.digital_total,
            digital_available: inventory.digital_available,
            last_updated_utc: inventory.last_updated_utc,
            metadata,
        }
    }

    /// True when no channel has any stock left
    pub fn exhausted(&self) -> bool {
        self.physical_available <= 0 && self.digital_available <= 0
    }
}

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
    catalog: Arc<dyn CatalogClient>,
    cache: CacheService,
}

fn cache_key(item_ref: Uuid) -> String {
    format!("inventory:{}", item_ref)
}

impl InventoryService {
    pub fn new(
        repository: Repository,
        catalog: Arc<dyn CatalogClient>,
        cache: CacheService,
    ) -> Self {
        Self {
            repository,
            catalog,
            cache,
        }
    }

    /// Create inventory for a catalog item. Both channels start fully
    /// available. Duplicate item references are a conflict.
    pub async fn create(
        &self,
        item_ref: Uuid,
        physical_total: i32,
        digital_total: i32,
    ) -> AppResult<InventorySummary> {
        if physical_total < 0 || digital_total < 0 {
            return Err(AppError::Validation(
                "Channel totals must be non-negative".to_string(),
            ));
        }

        let inventory = ItemInventory::new(item_ref, physical_total, digital_total);
        self.repository.inventory.create(&inventory).await?;

        tracing::info!(item_ref = %item_ref, physical_total, digital_total, "Inventory created");

        Ok(InventorySummary::from_inventory(
            &inventory,
            self.metadata_for(item_ref).await,
        ))
    }

    /// Current state, read through the snapshot cache, enriched with
    /// catalog metadata.
    pub async fn get(&self, item_ref: Uuid) -> AppResult<InventorySummary> {
        let key = cache_key(item_ref);

        let inventory = match self.cache.get_json::<ItemInventory>(&key).await {
            Some(cached) => cached,
            None => {
                let inventory = self
                    .repository
                    .inventory
                    .get_by_item_ref(item_ref)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound(format!("No inventory for item {}", item_ref))
                    })?;
                self.cache.set_json(&key, &inventory).await;
                inventory
            }
        };

        Ok(InventorySummary::from_inventory(
            &inventory,
            self.metadata_for(item_ref).await,
        ))
    }

    /// Paged listing with batch metadata enrichment
    pub async fn list(&self, page: i64, page_size: i64) -> AppResult<Vec<InventorySummary>> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);

        let inventories = self.repository.inventory.list_paged(page, page_size).await?;
        Ok(self.enrich_batch(inventories).await)
    }

    /// Batch lookup by item reference; unknown references are skipped
    pub async fn get_batch(&self, item_refs: &[Uuid]) -> AppResult<Vec<InventorySummary>> {
        let inventories = self.repository.inventory.get_batch(item_refs).await?;
        Ok(self.enrich_batch(inventories).await)
    }

    /// Set new channel totals; availability is capped at the new totals
    pub async fn update_totals(
        &self,
        item_ref: Uuid,
        physical_total: i32,
        digital_total: i32,
    ) -> AppResult<InventorySummary> {
        if physical_total < 0 || digital_total < 0 {
            return Err(AppError::Validation(
                "Channel totals must be non-negative".to_string(),
            ));
        }

        let inventory = self
            .repository
            .inventory
            .update_totals(item_ref, physical_total, digital_total)
            .await?;
        self.cache.remove(&cache_key(item_ref)).await;

        Ok(InventorySummary::from_inventory(
            &inventory,
            self.metadata_for(item_ref).await,
        ))
    }

    /// Take stock out of a channel (a loan begins)
    pub async fn reserve(
        &self,
        item_ref: Uuid,
        channel: Channel,
        quantity: i32,
        reference: &str,
    ) -> AppResult<InventorySummary> {
        self.adjust(item_ref, channel, Direction::Outbound, quantity, reference)
            .await
    }

    /// Put stock back into a channel (a loan ends)
    pub async fn release(
        &self,
        item_ref: Uuid,
        channel: Channel,
        quantity: i32,
        reference: &str,
    ) -> AppResult<InventorySummary> {
        self.adjust(item_ref, channel, Direction::Inbound, quantity, reference)
            .await
    }

    /// Movement ledger for an item, oldest first
    pub async fn movements(&self, item_ref: Uuid) -> AppResult<Vec<Movement>> {
        let inventory = self
            .repository
            .inventory
            .get_by_item_ref(item_ref)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No inventory for item {}", item_ref)))?;

        self.repository.inventory.movements(inventory.id).await
    }

    async fn adjust(
        &self,
        item_ref: Uuid,
        channel: Channel,
        direction: Direction,
        quantity: i32,
        reference: &str,
    ) -> AppResult<InventorySummary> {
        if quantity < 1 {
            return Err(AppError::Validation(
                "Quantity must be a positive integer".to_string(),
            ));
        }
        if reference.is_empty() || reference.len() > 256 {
            return Err(AppError::Validation(
                "Reference must be between 1 and 256 characters".to_string(),
            ));
        }

        let inventory = self
            .repository
            .inventory
            .apply_adjustment(item_ref, channel, direction, quantity, reference)
            .await?;
        self.cache.remove(&cache_key(item_ref)).await;

        tracing::info!(
            item_ref = %item_ref,
            channel = ?channel,
            direction = ?direction,
            quantity,
            reference,
            physical_available = inventory.physical_available,
            digital_available = inventory.digital_available,
            "Inventory adjusted"
        );

        Ok(InventorySummary::from_inventory(
            &inventory,
            self.metadata_for(item_ref).await,
        ))
    }

    /// Best-effort single metadata lookup; failures are logged, never raised
    async fn metadata_for(&self, item_ref: Uuid) -> Option<ItemMetadata> {
        match self.catalog.get_item_metadata(item_ref).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(item_ref = %item_ref, "Catalog enrichment skipped: {}", e);
                None
            }
        }
    }

    async fn enrich_batch(&self, inventories: Vec<ItemInventory>) -> Vec<InventorySummary> {
        let refs: Vec<Uuid> = inventories.iter().map(|i| i.item_ref).collect();
        let mut metadata = match self.catalog.get_items_metadata(&refs).await {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!("Catalog batch enrichment skipped: {}", e);
                Default::default()
            }
        };

        inventories
            .iter()
            .map(|inv| InventorySummary::from_inventory(inv, metadata.remove(&inv.item_ref)))
            .collect()
    }
}
