//! Borrowings repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::loan::Borrowing,
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, borrowing: &Borrowing) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO borrowings
                (id, borrower_id, item_ref, channel, borrowed_at, due_date, returned)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(borrowing.id)
        .bind(borrowing.borrower_id)
        .bind(borrowing.item_ref)
        .bind(borrowing.channel)
        .bind(borrowing.borrowed_at)
        .bind(borrowing.due_date)
        .bind(borrowing.returned)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Borrowing> {
        sqlx::query_as::<_, Borrowing>("SELECT * FROM borrowings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing {} not found", id)))
    }

    pub async fn list_by_borrower(&self, borrower_id: Uuid) -> AppResult<Vec<Borrowing>> {
        let borrowings = sqlx::query_as::<_, Borrowing>(
            "SELECT * FROM borrowings WHERE borrower_id = $1 ORDER BY borrowed_at DESC",
        )
        .bind(borrower_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(borrowings)
    }

    pub async fn count_open(&self, borrower_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrowings WHERE borrower_id = $1 AND NOT returned",
        )
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Flip `returned` exactly once, atomically. The conditional UPDATE makes
    /// the terminal-state check and the flip a single statement, so two
    /// concurrent returns of the same loan cannot both succeed.
    pub async fn mark_returned(&self, id: Uuid) -> AppResult<Borrowing> {
        let updated = sqlx::query_as::<_, Borrowing>(
            "UPDATE borrowings SET returned = TRUE WHERE id = $1 AND NOT returned RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(borrowing) => Ok(borrowing),
            None => {
                // Distinguish a missing loan from a re-return
                let existing = sqlx::query_as::<_, Borrowing>(
                    "SELECT * FROM borrowings WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

                match existing {
                    Some(_) => Err(AppError::AlreadyReturned(format!(
                        "Borrowing {} has already been returned",
                        id
                    ))),
                    None => Err(AppError::NotFound(format!("Borrowing {} not found", id))),
                }
            }
        }
    }
}
