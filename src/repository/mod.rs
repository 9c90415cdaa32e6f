//! Repository layer for database operations

pub mod inventory;
pub mod late_fees;
pub mod loans;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub inventory: inventory::InventoryRepository,
    pub loans: loans::LoansRepository,
    pub late_fees: late_fees::LateFeesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            inventory: inventory::InventoryRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            late_fees: late_fees::LateFeesRepository::new(pool.clone()),
            pool,
        }
    }
}
