//! Inventory management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::inventory::{Channel, Movement},
    services::inventory::InventorySummary,
};

use super::validate_request;

/// Create inventory request
#[derive(Deserialize, Validate, ToSchema)]
pub struct CreateInventoryRequest {
    /// Catalog item this inventory tracks
    pub item_ref: Uuid,
    /// Total physical copies
    #[validate(range(min = 0))]
    pub physical_total: i32,
    /// Total digital licenses
    #[validate(range(min = 0))]
    pub digital_total: i32,
}

/// Update totals request
#[derive(Deserialize, Validate, ToSchema)]
pub struct UpdateTotalsRequest {
    #[validate(range(min = 0))]
    pub physical_total: i32,
    #[validate(range(min = 0))]
    pub digital_total: i32,
}

/// Reserve/release adjustment request
#[derive(Deserialize, Validate, ToSchema)]
pub struct AdjustRequest {
    /// Stock pool to adjust
    pub channel: Channel,
    /// Units to move; must be positive
    #[validate(range(min = 1, max = 1_000_000))]
    pub quantity: i32,
    /// Opaque correlation string, typically the loan id
    #[validate(length(min = 1, max = 256))]
    pub reference: String,
}

#[derive(Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<i64>,
    /// Page size (max 100)
    pub page_size: Option<i64>,
}

/// List inventories, most recently updated first
#[utoipa::path(
    get,
    path = "/inventory",
    tag = "inventory",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of inventories", body = Vec<InventorySummary>)
    )
)]
pub async fn list_inventories(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Vec<InventorySummary>>> {
    let summaries = state
        .services
        .inventory
        .list(query.page.unwrap_or(1), query.page_size.unwrap_or(25))
        .await?;
    Ok(Json(summaries))
}

/// Create inventory for a catalog item
#[utoipa::path(
    post,
    path = "/inventory",
    tag = "inventory",
    request_body = CreateInventoryRequest,
    responses(
        (status = 201, description = "Inventory created", body = InventorySummary),
        (status = 400, description = "Negative totals"),
        (status = 409, description = "Inventory already exists for the item")
    )
)]
pub async fn create_inventory(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateInventoryRequest>,
) -> AppResult<(StatusCode, Json<InventorySummary>)> {
    validate_request(&request)?;

    let summary = state
        .services
        .inventory
        .create(request.item_ref, request.physical_total, request.digital_total)
        .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// Batch lookup by item references
#[utoipa::path(
    post,
    path = "/inventory/batch",
    tag = "inventory",
    request_body = Vec<Uuid>,
    responses(
        (status = 200, description = "Known inventories for the given items", body = Vec<InventorySummary>)
    )
)]
pub async fn get_batch(
    State(state): State<crate::AppState>,
    Json(item_refs): Json<Vec<Uuid>>,
) -> AppResult<Json<Vec<InventorySummary>>> {
    let summaries = state.services.inventory.get_batch(&item_refs).await?;
    Ok(Json(summaries))
}

/// Get current inventory state for an item
#[utoipa::path(
    get,
    path = "/inventory/{item_ref}",
    tag = "inventory",
    params(
        ("item_ref" = Uuid, Path, description = "Catalog item reference")
    ),
    responses(
        (status = 200, description = "Inventory state", body = InventorySummary),
        (status = 404, description = "No inventory for the item")
    )
)]
pub async fn get_inventory(
    State(state): State<crate::AppState>,
    Path(item_ref): Path<Uuid>,
) -> AppResult<Json<InventorySummary>> {
    let summary = state.services.inventory.get(item_ref).await?;
    Ok(Json(summary))
}

/// Replace channel totals; availability is capped at the new totals
#[utoipa::path(
    put,
    path = "/inventory/{item_ref}",
    tag = "inventory",
    params(
        ("item_ref" = Uuid, Path, description = "Catalog item reference")
    ),
    request_body = UpdateTotalsRequest,
    responses(
        (status = 200, description = "Updated inventory state", body = InventorySummary),
        (status = 404, description = "No inventory for the item")
    )
)]
pub async fn update_totals(
    State(state): State<crate::AppState>,
    Path(item_ref): Path<Uuid>,
    Json(request): Json<UpdateTotalsRequest>,
) -> AppResult<Json<InventorySummary>> {
    validate_request(&request)?;

    let summary = state
        .services
        .inventory
        .update_totals(item_ref, request.physical_total, request.digital_total)
        .await?;
    Ok(Json(summary))
}

/// Movement ledger for an item, oldest first
#[utoipa::path(
    get,
    path = "/inventory/{item_ref}/movements",
    tag = "inventory",
    params(
        ("item_ref" = Uuid, Path, description = "Catalog item reference")
    ),
    responses(
        (status = 200, description = "Movement history", body = Vec<Movement>),
        (status = 404, description = "No inventory for the item")
    )
)]
pub async fn list_movements(
    State(state): State<crate::AppState>,
    Path(item_ref): Path<Uuid>,
) -> AppResult<Json<Vec<Movement>>> {
    let movements = state.services.inventory.movements(item_ref).await?;
    Ok(Json(movements))
}

/// Reserve stock (outbound movement)
#[utoipa::path(
    post,
    path = "/inventory/{item_ref}/reserve",
    tag = "inventory",
    params(
        ("item_ref" = Uuid, Path, description = "Catalog item reference")
    ),
    request_body = AdjustRequest,
    responses(
        (status = 200, description = "Post-reservation state", body = InventorySummary),
        (status = 404, description = "No inventory for the item"),
        (status = 409, description = "Requested quantity exceeds availability")
    )
)]
pub async fn reserve(
    State(state): State<crate::AppState>,
    Path(item_ref): Path<Uuid>,
    Json(request): Json<AdjustRequest>,
) -> AppResult<Json<InventorySummary>> {
    validate_request(&request)?;

    let summary = state
        .services
        .inventory
        .reserve(item_ref, request.channel, request.quantity, &request.reference)
        .await?;
    Ok(Json(summary))
}

/// Release stock (inbound movement)
#[utoipa::path(
    post,
    path = "/inventory/{item_ref}/release",
    tag = "inventory",
    params(
        ("item_ref" = Uuid, Path, description = "Catalog item reference")
    ),
    request_body = AdjustRequest,
    responses(
        (status = 200, description = "Post-release state", body = InventorySummary),
        (status = 404, description = "No inventory for the item"),
        (status = 409, description = "Release would exceed the channel total")
    )
)]
pub async fn release(
    State(state): State<crate::AppState>,
    Path(item_ref): Path<Uuid>,
    Json(request): Json<AdjustRequest>,
) -> AppResult<Json<InventorySummary>> {
    validate_request(&request)?;

    let summary = state
        .services
        .inventory
        .release(item_ref, request.channel, request.quantity, &request.reference)
        .await?;
    Ok(Json(summary))
}
