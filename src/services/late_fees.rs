//! Late fee calculation and management

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::loan::{Borrowing, LateFee},
    repository::{late_fees::UnpaidFees, Repository},
};

/// Fee owed for a number of whole days overdue
pub fn fee_amount(days_late: i64, daily_rate: Decimal) -> Decimal {
    Decimal::from(days_late) * daily_rate
}

#[derive(Clone)]
pub struct LateFeeService {
    repository: Repository,
    daily_rate: Decimal,
}

impl LateFeeService {
    pub fn new(repository: Repository, daily_rate: Decimal) -> Self {
        Self {
            repository,
            daily_rate,
        }
    }

    pub fn daily_rate(&self) -> Decimal {
        self.daily_rate
    }

    /// Compute and persist the late fee for a returned loan.
    ///
    /// On-time returns produce no fee. For overdue loans the operation is
    /// idempotent: a fee already on record is returned unchanged, so a
    /// retried return call can never double-charge.
    pub async fn calculate(
        &self,
        borrowing: &Borrowing,
        now: DateTime<Utc>,
    ) -> AppResult<Option<LateFee>> {
        if now <= borrowing.due_date {
            return Ok(None);
        }

        if let Some(existing) = self
            .repository
            .late_fees
            .get_by_borrowing(borrowing.id)
            .await?
        {
            return Ok(Some(existing));
        }

        let fee = LateFee {
            id: Uuid::new_v4(),
            borrowing_id: borrowing.id,
            amount: fee_amount(borrowing.days_late(now), self.daily_rate),
            paid: false,
        };

        let stored = self.repository.late_fees.create_if_absent(&fee).await?;
        tracing::info!(
            borrowing_id = %borrowing.id,
            amount = %stored.amount,
            "Late fee recorded"
        );

        Ok(Some(stored))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<LateFee> {
        self.repository.late_fees.get_by_id(id).await
    }

    pub async fn get_by_borrowing(&self, borrowing_id: Uuid) -> AppResult<Option<LateFee>> {
        self.repository.late_fees.get_by_borrowing(borrowing_id).await
    }

    pub async fn list_for_borrower(&self, borrower_id: Uuid) -> AppResult<Vec<LateFee>> {
        self.repository.late_fees.list_by_borrower(borrower_id).await
    }

    pub async fn unpaid_summary(&self, borrower_id: Uuid) -> AppResult<UnpaidFees> {
        self.repository.late_fees.unpaid_summary(borrower_id).await
    }

    /// Mark a fee paid; paying twice is a conflict
    pub async fn pay(&self, id: Uuid) -> AppResult<LateFee> {
        let fee = self.repository.late_fees.mark_paid(id).await?;
        tracing::info!(fee_id = %id, "Late fee paid");
        Ok(fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_days_late_at_unit_rate_costs_six() {
        assert_eq!(fee_amount(6, Decimal::ONE), Decimal::from(6));
    }

    #[test]
    fn zero_days_late_costs_nothing() {
        assert_eq!(fee_amount(0, Decimal::ONE), Decimal::ZERO);
    }

    #[test]
    fn rate_scales_linearly() {
        let rate = Decimal::new(150, 2); // 1.50
        assert_eq!(fee_amount(4, rate), Decimal::new(600, 2));
    }
}
