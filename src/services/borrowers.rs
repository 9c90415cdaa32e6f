//! Borrower directory collaborator client
//!
//! The identity service owns accounts; the lending saga only needs to know
//! whether a borrower exists and is active.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::CollaboratorsConfig,
    error::{AppError, AppResult},
};

/// Borrower profile as served by the identity service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Borrower {
    pub id: Uuid,
    pub email: Option<String>,
    pub is_active: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowerDirectory: Send + Sync {
    /// Borrower profile; `None` when the directory has no such account
    async fn get_borrower(&self, borrower_id: Uuid) -> AppResult<Option<Borrower>>;
}

/// HTTP implementation talking to the identity service
pub struct HttpBorrowerDirectory {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBorrowerDirectory {
    pub fn new(config: &CollaboratorsConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build directory client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.identity_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl BorrowerDirectory for HttpBorrowerDirectory {
    async fn get_borrower(&self, borrower_id: Uuid) -> AppResult<Option<Borrower>> {
        let response = self
            .http
            .get(format!("{}/api/users/{}", self.base_url, borrower_id))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Borrower directory unreachable: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Borrower directory returned {} for {}",
                response.status(),
                borrower_id
            )));
        }

        let borrower = response
            .json::<Borrower>()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid directory response: {}", e)))?;

        Ok(Some(borrower))
    }
}
