//! LendHub Server - Library Lending Platform

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lendhub_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("lendhub_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LendHub Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Initialize the Redis snapshot cache
    let cache = lendhub_server::services::cache::CacheService::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    tracing::info!("Connected to Redis");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, &config, cache).expect("Failed to create services");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse().expect("Invalid host address"), server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Inventory
        .route("/inventory", get(api::inventory::list_inventories))
        .route("/inventory", post(api::inventory::create_inventory))
        .route("/inventory/batch", post(api::inventory::get_batch))
        .route("/inventory/:item_ref", get(api::inventory::get_inventory))
        .route("/inventory/:item_ref", put(api::inventory::update_totals))
        .route("/inventory/:item_ref/movements", get(api::inventory::list_movements))
        .route("/inventory/:item_ref/reserve", post(api::inventory::reserve))
        .route("/inventory/:item_ref/release", post(api::inventory::release))
        // Borrowings
        .route("/borrowings", post(api::lending::borrow))
        .route("/borrowings/:id", get(api::lending::get_borrowing))
        .route("/borrowings/:id/return", post(api::lending::return_borrowing))
        .route(
            "/borrowings/borrower/:borrower_id",
            get(api::lending::list_borrower_borrowings),
        )
        // Late fees
        .route("/fees/:id", get(api::fees::get_fee))
        .route("/fees/:id/pay", patch(api::fees::pay_fee))
        .route("/fees/borrowing/:borrowing_id", get(api::fees::get_fee_by_borrowing))
        .route("/fees/borrower/:borrower_id", get(api::fees::list_borrower_fees))
        .route(
            "/fees/borrower/:borrower_id/unpaid",
            get(api::fees::unpaid_summary),
        )
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
