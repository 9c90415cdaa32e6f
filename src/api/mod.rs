//! API handlers for LendHub REST endpoints

pub mod fees;
pub mod health;
pub mod inventory;
pub mod lending;
pub mod openapi;

use validator::Validate;

use crate::error::{AppError, AppResult};

/// Run declarative DTO validation, mapping failures to the API error shape
pub(crate) fn validate_request<T: Validate>(request: &T) -> AppResult<()> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}
