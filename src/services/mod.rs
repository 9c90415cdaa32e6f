//! Business logic services

pub mod borrowers;
pub mod cache;
pub mod catalog;
pub mod inventory;
pub mod late_fees;
pub mod lending;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub inventory: inventory::InventoryService,
    pub lending: lending::LendingService,
    pub fees: late_fees::LateFeeService,
}

impl Services {
    /// Create all services with the given repository and cache
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        cache: cache::CacheService,
    ) -> AppResult<Self> {
        let catalog: Arc<dyn catalog::CatalogClient> =
            Arc::new(catalog::HttpCatalogClient::new(&config.collaborators)?);
        let borrowers: Arc<dyn borrowers::BorrowerDirectory> =
            Arc::new(borrowers::HttpBorrowerDirectory::new(&config.collaborators)?);

        let inventory =
            inventory::InventoryService::new(repository.clone(), catalog.clone(), cache);
        let fees =
            late_fees::LateFeeService::new(repository.clone(), config.lending.daily_fee_rate);
        let lending = lending::LendingService::new(
            repository.clone(),
            inventory.clone(),
            fees.clone(),
            catalog,
            borrowers,
            config.lending.clone(),
        );

        Ok(Self {
            repository,
            inventory,
            lending,
            fees,
        })
    }
}
