//! Redis session backend.
//!
//! `MultiplexedConnection` is cheap to clone and safe to use concurrently,
//! so every operation clones it instead of taking a lock.

use super::KeyValueStore;
use crate::errors::AuthError;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::time::Duration;
use tracing::{error, warn};

#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    /// Open a client and establish the shared multiplexed connection.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionStore` if the URL is invalid or the server
    /// cannot be reached.
    pub async fn connect(redis_url: &str) -> Result<Self, AuthError> {
        // redis_url may embed a password and is never logged.
        let client = Client::open(redis_url).map_err(|e| {
            error!(target: "auth.session.redis", error = %e, "Failed to open Redis client");
            AuthError::SessionStore(format!("Failed to open Redis client: {e}"))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                error!(target: "auth.session.redis", error = %e, "Failed to connect to Redis");
                AuthError::SessionStore(format!("Failed to connect to Redis: {e}"))
            })?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), AuthError> {
        let mut conn = self.connection.clone();

        let result: redis::RedisResult<()> = match ttl {
            // SET EX rejects 0, so sub-second TTLs round up.
            Some(ttl) => conn.set_ex(key, value, ttl.as_secs().max(1)).await,
            None => conn.set(key, value).await,
        };

        result.map_err(|e| {
            warn!(target: "auth.session.redis", error = %e, "Failed to store session");
            AuthError::SessionStore(format!("Failed to store session: {e}"))
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let mut conn = self.connection.clone();

        conn.get(key).await.map_err(|e| {
            warn!(target: "auth.session.redis", error = %e, "Failed to load session");
            AuthError::SessionStore(format!("Failed to load session: {e}"))
        })
    }

    async fn delete(&self, key: &str) -> Result<bool, AuthError> {
        let mut conn = self.connection.clone();

        let removed: u64 = conn.del(key).await.map_err(|e| {
            warn!(target: "auth.session.redis", error = %e, "Failed to delete session");
            AuthError::SessionStore(format!("Failed to delete session: {e}"))
        })?;

        Ok(removed > 0)
    }
}
