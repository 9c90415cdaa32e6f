//! Inventory repository: locked read-modify-write over the aggregate row
//! plus the append-only movement ledger.

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::inventory::{Channel, Direction, ItemInventory, Movement},
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: Pool<Postgres>,
}

impl InventoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new inventory row. The unique constraint on `item_ref`
    /// turns a duplicate creation into `Conflict`.
    pub async fn create(&self, inventory: &ItemInventory) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventories
                (id, item_ref, physical_total, physical_available,
                 digital_total, digital_available, created_utc, last_updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(inventory.id)
        .bind(inventory.item_ref)
        .bind(inventory.physical_total)
        .bind(inventory.physical_available)
        .bind(inventory.digital_total)
        .bind(inventory.digital_available)
        .bind(inventory.created_utc)
        .bind(inventory.last_updated_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => AppError::Conflict(format!(
                "Inventory already exists for item {}",
                inventory.item_ref
            )),
            _ => AppError::Database(e),
        })?;

        Ok(())
    }

    pub async fn get_by_item_ref(&self, item_ref: Uuid) -> AppResult<Option<ItemInventory>> {
        let inventory = sqlx::query_as::<_, ItemInventory>(
            "SELECT * FROM inventories WHERE item_ref = $1",
        )
        .bind(item_ref)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inventory)
    }

    /// Page through inventories, most recently updated first
    pub async fn list_paged(&self, page: i64, page_size: i64) -> AppResult<Vec<ItemInventory>> {
        let inventories = sqlx::query_as::<_, ItemInventory>(
            "SELECT * FROM inventories ORDER BY last_updated_utc DESC OFFSET $1 LIMIT $2",
        )
        .bind((page - 1).max(0) * page_size)
        .bind(page_size)
        .fetch_all(&self.pool)
        .await?;

        Ok(inventories)
    }

    pub async fn get_batch(&self, item_refs: &[Uuid]) -> AppResult<Vec<ItemInventory>> {
        let inventories = sqlx::query_as::<_, ItemInventory>(
            "SELECT * FROM inventories WHERE item_ref = ANY($1)",
        )
        .bind(item_refs)
        .fetch_all(&self.pool)
        .await?;

        Ok(inventories)
    }

    /// Movement ledger for one inventory, oldest first
    pub async fn movements(&self, inventory_id: Uuid) -> AppResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(
            "SELECT * FROM inventory_movements WHERE inventory_id = $1 ORDER BY timestamp_utc, id",
        )
        .bind(inventory_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Replace channel totals, capping availability at the new totals.
    /// Runs under a row lock so a concurrent reservation cannot interleave
    /// between the read and the write.
    pub async fn update_totals(
        &self,
        item_ref: Uuid,
        physical_total: i32,
        digital_total: i32,
    ) -> AppResult<ItemInventory> {
        let mut tx = self.pool.begin().await?;

        let mut inventory = sqlx::query_as::<_, ItemInventory>(
            "SELECT * FROM inventories WHERE item_ref = $1 FOR UPDATE",
        )
        .bind(item_ref)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No inventory for item {}", item_ref)))?;

        inventory.set_totals(physical_total, digital_total);

        sqlx::query(
            r#"
            UPDATE inventories
            SET physical_total = $1, physical_available = $2,
                digital_total = $3, digital_available = $4, last_updated_utc = $5
            WHERE id = $6
            "#,
        )
        .bind(inventory.physical_total)
        .bind(inventory.physical_available)
        .bind(inventory.digital_total)
        .bind(inventory.digital_available)
        .bind(inventory.last_updated_utc)
        .bind(inventory.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(inventory)
    }

    /// Guarded reserve/release. The whole read-check-apply-append cycle runs
    /// inside one transaction holding a `FOR UPDATE` lock on the inventory
    /// row, so two concurrent adjustments on the same item are serialized
    /// and can never jointly overdraw the pool.
    ///
    /// A rejected adjustment commits nothing: no counter change, no ledger
    /// row. A repeat of an already-applied `(reference, direction)` pair is
    /// an idempotent no-op that returns the current state.
    pub async fn apply_adjustment(
        &self,
        item_ref: Uuid,
        channel: Channel,
        direction: Direction,
        quantity: i32,
        reference: &str,
    ) -> AppResult<ItemInventory> {
        let mut tx = self.pool.begin().await?;

        let mut inventory = sqlx::query_as::<_, ItemInventory>(
            "SELECT * FROM inventories WHERE item_ref = $1 FOR UPDATE",
        )
        .bind(item_ref)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No inventory for item {}", item_ref)))?;

        // Retried request: the movement is already on the ledger. Safe under
        // the row lock; same-item retries are serialized here.
        let already_applied: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM inventory_movements
                WHERE inventory_id = $1 AND reference = $2 AND direction = $3
            )
            "#,
        )
        .bind(inventory.id)
        .bind(reference)
        .bind(direction)
        .fetch_one(&mut *tx)
        .await?;

        if already_applied {
            tx.rollback().await?;
            tracing::info!(
                item_ref = %item_ref,
                reference,
                "adjustment already applied, returning current state"
            );
            return Ok(inventory);
        }

        if !inventory.can_move(channel, direction, quantity) {
            return Err(AppError::CapacityExceeded(format!(
                "Requested quantity {} exceeds {:?} availability ({}/{}) for item {}",
                quantity,
                channel,
                inventory.available(channel),
                inventory.total(channel),
                item_ref
            )));
        }

        let movement = Movement {
            id: Uuid::new_v4(),
            inventory_id: inventory.id,
            quantity,
            direction,
            channel,
            reference: reference.to_string(),
            timestamp_utc: Utc::now(),
        };

        if inventory.apply_movement(&movement) {
            // The guard held under the lock, so a clamp here means the
            // stored counters themselves were out of range.
            tracing::warn!(
                item_ref = %item_ref,
                channel = ?channel,
                "movement result clamped; stored counters violated the availability invariant"
            );
        }

        sqlx::query(
            r#"
            UPDATE inventories
            SET physical_available = $1, digital_available = $2, last_updated_utc = $3
            WHERE id = $4
            "#,
        )
        .bind(inventory.physical_available)
        .bind(inventory.digital_available)
        .bind(inventory.last_updated_utc)
        .bind(inventory.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO inventory_movements
                (id, inventory_id, quantity, direction, channel, reference, timestamp_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(movement.id)
        .bind(movement.inventory_id)
        .bind(movement.quantity)
        .bind(movement.direction)
        .bind(movement.channel)
        .bind(&movement.reference)
        .bind(movement.timestamp_utc)
        .execute(&mut *tx)
        .await?;

        // Counter update and ledger append commit together or not at all
        tx.commit().await?;
        Ok(inventory)
    }
}
