//! Borrowing and return endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::loan::Borrowing,
    services::lending::{CreateBorrowing, ReturnOutcome},
};

/// Borrow an item (physical or digital)
#[utoipa::path(
    post,
    path = "/borrowings",
    tag = "lending",
    request_body = CreateBorrowing,
    responses(
        (status = 201, description = "Loan created", body = Borrowing),
        (status = 404, description = "Borrower or item not found"),
        (status = 409, description = "No stock available on the channel"),
        (status = 422, description = "Loan limit reached, unpaid fees, or inactive account"),
        (status = 502, description = "A collaborator service is unavailable")
    )
)]
pub async fn borrow(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBorrowing>,
) -> AppResult<(StatusCode, Json<Borrowing>)> {
    let borrowing = state.services.lending.borrow(request).await?;
    Ok((StatusCode::CREATED, Json(borrowing)))
}

/// Get a borrowing by ID
#[utoipa::path(
    get,
    path = "/borrowings/{id}",
    tag = "lending",
    params(
        ("id" = Uuid, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Borrowing record", body = Borrowing),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn get_borrowing(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Borrowing>> {
    let borrowing = state.services.lending.get(id).await?;
    Ok(Json(borrowing))
}

/// Return a borrowed item
#[utoipa::path(
    post,
    path = "/borrowings/{id}/return",
    tag = "lending",
    params(
        ("id" = Uuid, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Return processed", body = ReturnOutcome),
        (status = 404, description = "Borrowing not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_borrowing(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReturnOutcome>> {
    let outcome = state.services.lending.return_loan(id).await?;
    Ok(Json(outcome))
}

/// All borrowings for a borrower, newest first
#[utoipa::path(
    get,
    path = "/borrowings/borrower/{borrower_id}",
    tag = "lending",
    params(
        ("borrower_id" = Uuid, Path, description = "Borrower ID")
    ),
    responses(
        (status = 200, description = "Borrowing history", body = Vec<Borrowing>)
    )
)]
pub async fn list_borrower_borrowings(
    State(state): State<crate::AppState>,
    Path(borrower_id): Path<Uuid>,
) -> AppResult<Json<Vec<Borrowing>>> {
    let borrowings = state.services.lending.list_for_borrower(borrower_id).await?;
    Ok(Json(borrowings))
}
