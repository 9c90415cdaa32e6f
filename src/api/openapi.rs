//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{fees, health, inventory, lending};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LendHub API",
        version = "0.3.0",
        description = "Library Lending Platform REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Inventory
        inventory::list_inventories,
        inventory::create_inventory,
        inventory::get_batch,
        inventory::get_inventory,
        inventory::update_totals,
        inventory::list_movements,
        inventory::reserve,
        inventory::release,
        // Lending
        lending::borrow,
        lending::get_borrowing,
        lending::return_borrowing,
        lending::list_borrower_borrowings,
        // Fees
        fees::get_fee,
        fees::get_fee_by_borrowing,
        fees::list_borrower_fees,
        fees::unpaid_summary,
        fees::pay_fee,
    ),
    components(
        schemas(
            health::HealthResponse,
            inventory::CreateInventoryRequest,
            inventory::UpdateTotalsRequest,
            inventory::AdjustRequest,
            fees::UnpaidFeesResponse,
            crate::error::ErrorResponse,
            crate::models::inventory::Channel,
            crate::models::inventory::Direction,
            crate::models::inventory::ItemInventory,
            crate::models::inventory::Movement,
            crate::models::loan::Borrowing,
            crate::models::loan::LateFee,
            crate::services::catalog::ItemMetadata,
            crate::services::inventory::InventorySummary,
            crate::services::lending::CreateBorrowing,
            crate::services::lending::ReturnOutcome,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "inventory", description = "Stock levels and the movement ledger"),
        (name = "lending", description = "Borrow and return workflow"),
        (name = "fees", description = "Late fees")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
