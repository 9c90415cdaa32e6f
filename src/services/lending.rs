//! Lending saga: borrow and return orchestration across the borrower
//! directory, the inventory ledger, the loan store and the catalog.
//!
//! There is no distributed transaction here. The inventory reservation is
//! the single hard gate; everything after it either compensates (loan
//! creation failure releases the reservation) or is best-effort (catalog
//! flag sync), and everything before it has no side effects.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        inventory::Channel,
        loan::{Borrowing, LateFee},
    },
    repository::Repository,
    services::{
        borrowers::BorrowerDirectory,
        catalog::CatalogClient,
        inventory::{InventoryService, InventorySummary},
        late_fees::LateFeeService,
    },
};

/// Borrow request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBorrowing {
    pub borrower_id: Uuid,
    pub item_ref: Uuid,
    pub channel: Channel,
}

/// Outcome of a return, including any late fee assessed
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnOutcome {
    pub borrowing: Borrowing,
    pub returned_at: DateTime<Utc>,
    pub days_late: i64,
    pub late_fee: Option<LateFee>,
}

/// Push the coarse catalog availability flag. Cosmetic by design: a failure
/// is logged and never fails the saga, and the flag is reconciled on the
/// next successful borrow or return of the same item.
pub(crate) async fn sync_catalog_flag(
    catalog: &dyn CatalogClient,
    item_ref: Uuid,
    available: bool,
) {
    if let Err(e) = catalog.set_availability_flag(item_ref, available).await {
        tracing::warn!(
            item_ref = %item_ref,
            available,
            "Catalog availability sync failed: {}",
            e
        );
    }
}

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    inventory: InventoryService,
    fees: LateFeeService,
    catalog: Arc<dyn CatalogClient>,
    borrowers: Arc<dyn BorrowerDirectory>,
    policy: LendingConfig,
}

impl LendingService {
    pub fn new(
        repository: Repository,
        inventory: InventoryService,
        fees: LateFeeService,
        catalog: Arc<dyn CatalogClient>,
        borrowers: Arc<dyn BorrowerDirectory>,
        policy: LendingConfig,
    ) -> Self {
        Self {
            repository,
            inventory,
            fees,
            catalog,
            borrowers,
            policy,
        }
    }

    /// Borrow one unit of an item on the requested channel.
    ///
    /// Steps 1-4 are pure checks with no side effects; step 5 (reserve) is
    /// the hard gate; step 6 (loan record) compensates the reservation on
    /// failure; step 7 (catalog flag) is best-effort.
    pub async fn borrow(&self, request: CreateBorrowing) -> AppResult<Borrowing> {
        // 1. Borrower must exist and be active
        let borrower = self
            .borrowers
            .get_borrower(request.borrower_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Borrower {} not found", request.borrower_id))
            })?;

        if !borrower.is_active {
            return Err(AppError::BusinessRule(
                "Borrower account is inactive".to_string(),
            ));
        }

        // 2. Open-loan limit
        let open_loans = self
            .repository
            .loans
            .count_open(request.borrower_id)
            .await?;
        if open_loans >= self.policy.max_open_loans {
            return Err(AppError::BusinessRule(format!(
                "Loan limit reached ({}/{})",
                open_loans, self.policy.max_open_loans
            )));
        }

        // 3. No outstanding fees
        let unpaid = self
            .repository
            .late_fees
            .unpaid_summary(request.borrower_id)
            .await?;
        if unpaid.count > 0 {
            return Err(AppError::BusinessRule(format!(
                "{} unpaid late fee(s) totaling {} must be settled before borrowing",
                unpaid.count, unpaid.total
            )));
        }

        // 4. Item must exist in the catalog; an unreachable catalog aborts
        // here, before anything has been reserved
        let metadata = self
            .catalog
            .get_item_metadata(request.item_ref)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Item {} not found in catalog", request.item_ref))
            })?;

        // 5. Reserve. The loan id is generated up front and used as the
        // movement reference, tying the reservation, its compensating
        // release, and any out-of-band reconciliation retry to one ledger
        // idempotency key. A fresh borrow call gets a fresh id and
        // reserves independently.
        let borrowing = Borrowing::new(
            request.borrower_id,
            request.item_ref,
            request.channel,
            self.policy.loan_period_days,
        );
        let reference = borrowing.id.to_string();

        let snapshot = self
            .inventory
            .reserve(request.item_ref, request.channel, 1, &reference)
            .await?;

        // 6. Persist the loan; release the reservation if that fails
        if let Err(e) = self.repository.loans.create(&borrowing).await {
            tracing::error!(
                borrowing_id = %borrowing.id,
                "Loan persistence failed after reservation, compensating: {}",
                e
            );
            if let Err(comp) = self
                .inventory
                .release(request.item_ref, request.channel, 1, &reference)
                .await
            {
                tracing::error!(
                    borrowing_id = %borrowing.id,
                    "Compensating release failed, ledger reconciliation required: {}",
                    comp
                );
            }
            return Err(e);
        }

        // 7. Flag the item unavailable when this reservation drained the
        // last unit on both channels. Non-fatal: the loan stands either way.
        if snapshot.exhausted() {
            sync_catalog_flag(self.catalog.as_ref(), request.item_ref, false).await;
        }

        tracing::info!(
            borrowing_id = %borrowing.id,
            borrower_id = %request.borrower_id,
            item_ref = %request.item_ref,
            channel = ?request.channel,
            title = %metadata.title,
            due_date = %borrowing.due_date,
            "Loan created"
        );

        Ok(borrowing)
    }

    /// Return a borrowed item.
    ///
    /// The terminal-state flip happens first so the return is durable even
    /// if the inventory release fails; the release is retried out-of-band
    /// from the ledger in that case.
    pub async fn return_loan(&self, borrowing_id: Uuid) -> AppResult<ReturnOutcome> {
        // 1+2. Lookup and flip `returned` in one atomic step
        let borrowing = self.repository.loans.mark_returned(borrowing_id).await?;

        // 3. Put the unit back; failure is logged, not surfaced
        let reference = borrowing.id.to_string();
        match self
            .inventory
            .release(borrowing.item_ref, borrowing.channel, 1, &reference)
            .await
        {
            Ok(snapshot) => {
                // 4. Any availability means the item is borrowable again
                if !snapshot.exhausted() {
                    sync_catalog_flag(self.catalog.as_ref(), borrowing.item_ref, true).await;
                }
            }
            Err(e) => {
                tracing::error!(
                    borrowing_id = %borrowing.id,
                    item_ref = %borrowing.item_ref,
                    "Inventory release failed on return, reconciliation required: {}",
                    e
                );
            }
        }

        // 5. Late fee, idempotent
        let now = Utc::now();
        let late_fee = self.fees.calculate(&borrowing, now).await?;

        tracing::info!(
            borrowing_id = %borrowing.id,
            days_late = borrowing.days_late(now),
            fee = late_fee.as_ref().map(|f| f.amount.to_string()).unwrap_or_default(),
            "Loan returned"
        );

        Ok(ReturnOutcome {
            days_late: borrowing.days_late(now),
            borrowing,
            returned_at: now,
            late_fee,
        })
    }

    pub async fn get(&self, borrowing_id: Uuid) -> AppResult<Borrowing> {
        self.repository.loans.get_by_id(borrowing_id).await
    }

    pub async fn list_for_borrower(&self, borrower_id: Uuid) -> AppResult<Vec<Borrowing>> {
        self.repository.loans.list_by_borrower(borrower_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::MockCatalogClient;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn flag_sync_pushes_the_requested_value() {
        let item_ref = Uuid::new_v4();
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_set_availability_flag()
            .with(eq(item_ref), eq(false))
            .once()
            .returning(|_, _| Ok(()));

        sync_catalog_flag(&catalog, item_ref, false).await;
    }

    #[tokio::test]
    async fn flag_sync_swallows_upstream_failures() {
        let item_ref = Uuid::new_v4();
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_set_availability_flag()
            .once()
            .returning(|_, _| Err(AppError::Upstream("catalog down".to_string())));

        // Must not panic or propagate
        sync_catalog_flag(&catalog, item_ref, true).await;
    }

    #[test]
    fn snapshot_exhaustion_considers_both_channels() {
        let mut summary = InventorySummary {
            item_ref: Uuid::new_v4(),
            physical_total: 2,
            physical_available: 0,
            digital_total: 1,
            digital_available: 1,
            last_updated_utc: Utc::now(),
            metadata: None,
        };
        assert!(!summary.exhausted());
        summary.digital_available = 0;
        assert!(summary.exhausted());
    }
}
