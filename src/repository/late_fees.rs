//! Late fees repository for database operations

use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::loan::LateFee,
};

/// Unpaid fee totals for one borrower
#[derive(Debug, Clone)]
pub struct UnpaidFees {
    pub count: i64,
    pub total: Decimal,
}

#[derive(Clone)]
pub struct LateFeesRepository {
    pool: Pool<Postgres>,
}

impl LateFeesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<LateFee> {
        sqlx::query_as::<_, LateFee>("SELECT * FROM late_fees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Late fee {} not found", id)))
    }

    pub async fn get_by_borrowing(&self, borrowing_id: Uuid) -> AppResult<Option<LateFee>> {
        let fee = sqlx::query_as::<_, LateFee>(
            "SELECT * FROM late_fees WHERE borrowing_id = $1",
        )
        .bind(borrowing_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fee)
    }

    /// Insert a fee unless one already exists for the borrowing, then return
    /// whichever fee is on record. The unique constraint on `borrowing_id`
    /// makes concurrent retries converge on a single fee.
    pub async fn create_if_absent(&self, fee: &LateFee) -> AppResult<LateFee> {
        sqlx::query(
            r#"
            INSERT INTO late_fees (id, borrowing_id, amount, paid)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (borrowing_id) DO NOTHING
            "#,
        )
        .bind(fee.id)
        .bind(fee.borrowing_id)
        .bind(fee.amount)
        .bind(fee.paid)
        .execute(&self.pool)
        .await?;

        self.get_by_borrowing(fee.borrowing_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Late fee for borrowing {} vanished after insert",
                    fee.borrowing_id
                ))
            })
    }

    /// All fees for a borrower's loans, newest loan first
    pub async fn list_by_borrower(&self, borrower_id: Uuid) -> AppResult<Vec<LateFee>> {
        let fees = sqlx::query_as::<_, LateFee>(
            r#"
            SELECT f.* FROM late_fees f
            JOIN borrowings b ON f.borrowing_id = b.id
            WHERE b.borrower_id = $1
            ORDER BY b.borrowed_at DESC
            "#,
        )
        .bind(borrower_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(fees)
    }

    pub async fn unpaid_summary(&self, borrower_id: Uuid) -> AppResult<UnpaidFees> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count, COALESCE(SUM(f.amount), 0) AS total
            FROM late_fees f
            JOIN borrowings b ON f.borrowing_id = b.id
            WHERE b.borrower_id = $1 AND NOT f.paid
            "#,
        )
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UnpaidFees {
            count: row.get("count"),
            total: row.get("total"),
        })
    }

    /// Flip `paid` exactly once; paying an already-paid fee is a conflict
    pub async fn mark_paid(&self, id: Uuid) -> AppResult<LateFee> {
        let updated = sqlx::query_as::<_, LateFee>(
            "UPDATE late_fees SET paid = TRUE WHERE id = $1 AND NOT paid RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(fee) => Ok(fee),
            None => {
                // get_by_id yields NotFound when the fee does not exist
                let _ = self.get_by_id(id).await?;
                Err(AppError::Conflict(format!(
                    "Late fee {} has already been paid",
                    id
                )))
            }
        }
    }
}
