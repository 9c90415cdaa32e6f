//! Late fee endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::loan::LateFee,
};

/// Unpaid fee summary for a borrower
#[derive(Serialize, ToSchema)]
pub struct UnpaidFeesResponse {
    pub borrower_id: Uuid,
    pub unpaid_count: i64,
    pub total_unpaid_amount: Decimal,
}

/// Get a late fee by ID
#[utoipa::path(
    get,
    path = "/fees/{id}",
    tag = "fees",
    params(
        ("id" = Uuid, Path, description = "Late fee ID")
    ),
    responses(
        (status = 200, description = "Late fee", body = LateFee),
        (status = 404, description = "Late fee not found")
    )
)]
pub async fn get_fee(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LateFee>> {
    let fee = state.services.fees.get(id).await?;
    Ok(Json(fee))
}

/// Get the late fee attached to a borrowing, if any
#[utoipa::path(
    get,
    path = "/fees/borrowing/{borrowing_id}",
    tag = "fees",
    params(
        ("borrowing_id" = Uuid, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Late fee", body = LateFee),
        (status = 404, description = "No fee for the borrowing")
    )
)]
pub async fn get_fee_by_borrowing(
    State(state): State<crate::AppState>,
    Path(borrowing_id): Path<Uuid>,
) -> AppResult<Json<LateFee>> {
    let fee = state
        .services
        .fees
        .get_by_borrowing(borrowing_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No late fee for borrowing {}", borrowing_id))
        })?;
    Ok(Json(fee))
}

/// All late fees for a borrower
#[utoipa::path(
    get,
    path = "/fees/borrower/{borrower_id}",
    tag = "fees",
    params(
        ("borrower_id" = Uuid, Path, description = "Borrower ID")
    ),
    responses(
        (status = 200, description = "Late fees", body = Vec<LateFee>)
    )
)]
pub async fn list_borrower_fees(
    State(state): State<crate::AppState>,
    Path(borrower_id): Path<Uuid>,
) -> AppResult<Json<Vec<LateFee>>> {
    let fees = state.services.fees.list_for_borrower(borrower_id).await?;
    Ok(Json(fees))
}

/// Unpaid fee totals for a borrower
#[utoipa::path(
    get,
    path = "/fees/borrower/{borrower_id}/unpaid",
    tag = "fees",
    params(
        ("borrower_id" = Uuid, Path, description = "Borrower ID")
    ),
    responses(
        (status = 200, description = "Unpaid fee summary", body = UnpaidFeesResponse)
    )
)]
pub async fn unpaid_summary(
    State(state): State<crate::AppState>,
    Path(borrower_id): Path<Uuid>,
) -> AppResult<Json<UnpaidFeesResponse>> {
    let summary = state.services.fees.unpaid_summary(borrower_id).await?;
    Ok(Json(UnpaidFeesResponse {
        borrower_id,
        unpaid_count: summary.count,
        total_unpaid_amount: summary.total,
    }))
}

/// Mark a late fee as paid
#[utoipa::path(
    patch,
    path = "/fees/{id}/pay",
    tag = "fees",
    params(
        ("id" = Uuid, Path, description = "Late fee ID")
    ),
    responses(
        (status = 200, description = "Fee paid", body = LateFee),
        (status = 404, description = "Late fee not found"),
        (status = 409, description = "Fee already paid")
    )
)]
pub async fn pay_fee(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LateFee>> {
    let fee = state.services.fees.pay(id).await?;
    Ok(Json(fee))
}
