//! Borrowing (loan) and late fee models

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::inventory::Channel;

/// A loan of one unit of stock to a borrower
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrowing {
    pub id: Uuid,
    pub borrower_id: Uuid,
    /// Catalog item reference (same key the inventory tracks)
    pub item_ref: Uuid,
    pub channel: Channel,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    /// Terminal once true; flips exactly once
    pub returned: bool,
}

impl Borrowing {
    pub fn new(borrower_id: Uuid, item_ref: Uuid, channel: Channel, period_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            borrower_id,
            item_ref,
            channel,
            borrowed_at: now,
            due_date: now + Duration::days(period_days),
            returned: false,
        }
    }

    /// Whole days overdue at `now`, truncated (never rounded up).
    /// Zero when the loan is not overdue.
    pub fn days_late(&self, now: DateTime<Utc>) -> i64 {
        if now <= self.due_date {
            0
        } else {
            (now - self.due_date).num_days()
        }
    }
}

/// Fee charged for an overdue return; at most one per borrowing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LateFee {
    pub id: Uuid,
    pub borrowing_id: Uuid,
    pub amount: Decimal,
    pub paid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan_due(due_date: DateTime<Utc>) -> Borrowing {
        Borrowing {
            id: Uuid::new_v4(),
            borrower_id: Uuid::new_v4(),
            item_ref: Uuid::new_v4(),
            channel: Channel::Physical,
            borrowed_at: due_date - Duration::days(14),
            due_date,
            returned: false,
        }
    }

    #[test]
    fn due_date_is_borrow_date_plus_period() {
        let loan = Borrowing::new(Uuid::new_v4(), Uuid::new_v4(), Channel::Digital, 14);
        assert_eq!(loan.due_date - loan.borrowed_at, Duration::days(14));
        assert!(!loan.returned);
    }

    #[test]
    fn on_time_return_has_zero_days_late() {
        let now = Utc::now();
        let loan = loan_due(now + Duration::days(1));
        assert_eq!(loan.days_late(now), 0);
        assert_eq!(loan_due(now).days_late(now), 0);
    }

    #[test]
    fn days_late_truncates_partial_days() {
        let now = Utc::now();
        let loan = loan_due(now - Duration::days(6) - Duration::hours(5));
        assert_eq!(loan.days_late(now), 6);
    }

    #[test]
    fn borrowed_twenty_days_ago_with_fourteen_day_period_is_six_days_late() {
        let now = Utc::now();
        let borrowed_at = now - Duration::days(20);
        let loan = loan_due(borrowed_at + Duration::days(14));
        assert_eq!(loan.days_late(now), 6);
    }
}
