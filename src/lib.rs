//! LendHub Library Lending Platform
//!
//! A Rust implementation of the LendHub lending server, tracking per-item
//! stock levels on two channels (physical and digital), an append-only
//! movement ledger, and the borrow/return workflow with late fees.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
