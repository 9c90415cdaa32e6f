//! Redis-backed read-through cache for inventory snapshots
//!
//! The cache is an accelerator, never an authority: every failure is logged
//! and treated as a miss so a Redis outage degrades to plain database reads.

use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, AppResult};

const DEFAULT_TTL_SECONDS: u64 = 30 * 60;

#[derive(Clone)]
pub struct CacheService {
    client: Client,
}

impl CacheService {
    /// Create a new cache service and verify the connection
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch and deserialize a cached value; any failure is a miss
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(key, "Redis connection failed on read: {}", e);
                return None;
            }
        };

        let raw: Option<String> = match conn.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "Cache read failed: {}", e);
                return None;
            }
        };

        raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(value) => {
                tracing::debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key, "Discarding unparseable cache entry: {}", e);
                None
            }
        })
    }

    /// Serialize and store a value with the default TTL; best-effort
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, "Cache serialization failed: {}", e);
                return;
            }
        };

        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(key, "Redis connection failed on write: {}", e);
                return;
            }
        };

        if let Err(e) = conn
            .set_ex::<_, _, ()>(key, json, DEFAULT_TTL_SECONDS)
            .await
        {
            tracing::warn!(key, "Cache write failed: {}", e);
        }
    }

    /// Drop a cached entry (after a mutation); best-effort
    pub async fn remove(&self, key: &str) {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(key, "Redis connection failed on delete: {}", e);
                return;
            }
        };

        if let Err(e) = conn.del::<_, ()>(key).await {
            tracing::warn!(key, "Cache invalidation failed: {}", e);
        }
    }
}
