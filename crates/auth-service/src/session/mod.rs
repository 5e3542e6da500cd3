//! Session records: the cached identity behind every issued token.
//!
//! # Key Pattern
//!
//! - `login:{subject}` - JSON serialized [`Identity`]
//!
//! A token is only honored while its record exists. Logout deletes the
//! record, which is the only revocation mechanism.

pub mod memory_store;
pub mod redis_store;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

use crate::errors::AuthError;
use crate::models::Identity;
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_session_lookup;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub const SESSION_KEY_PREFIX: &str = "login:";

/// String key/value backend with optional per-entry expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), AuthError>;

    /// `Ok(None)` on a miss. Errors are reserved for backend failures.
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError>;

    /// Returns whether a value was removed.
    async fn delete(&self, key: &str) -> Result<bool, AuthError>;
}

pub fn session_key(subject: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, subject)
}

/// Typed session access over a shared [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Option<Duration>,
}

impl SessionCache {
    /// `ttl` of `None` keeps records until logout or eviction.
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Option<Duration>) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    #[instrument(skip_all, fields(subject = %hash_for_correlation(subject)))]
    pub async fn put(&self, subject: &str, identity: &Identity) -> Result<(), AuthError> {
        let value = serde_json::to_string(identity).map_err(|e| {
            tracing::error!(target: "auth.session", error = %e, "Failed to serialize identity");
            AuthError::Internal
        })?;

        self.store.put(&session_key(subject), &value, self.ttl).await
    }

    #[instrument(skip_all, fields(subject = %hash_for_correlation(subject)))]
    pub async fn get(&self, subject: &str) -> Result<Option<Identity>, AuthError> {
        let raw = match self.store.get(&session_key(subject)).await {
            Ok(raw) => raw,
            Err(e) => {
                record_session_lookup("error");
                return Err(e);
            }
        };

        let Some(raw) = raw else {
            record_session_lookup("miss");
            return Ok(None);
        };

        let identity = serde_json::from_str::<Identity>(&raw).map_err(|e| {
            tracing::error!(target: "auth.session", error = %e, "Stored session record is unreadable");
            record_session_lookup("error");
            AuthError::SessionStore("unreadable session record".to_string())
        })?;

        record_session_lookup("hit");
        Ok(Some(identity))
    }

    #[instrument(skip_all, fields(subject = %hash_for_correlation(subject)))]
    pub async fn delete(&self, subject: &str) -> Result<bool, AuthError> {
        self.store.delete(&session_key(subject)).await
    }
}
