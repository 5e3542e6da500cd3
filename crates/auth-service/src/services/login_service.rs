use crate::crypto::{self, TokenCodec, DUMMY_PASSWORD_HASH};
use crate::errors::AuthError;
use crate::models::{Identity, Principal};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_login;
use crate::repositories::users::UserDirectory;
use crate::session::SessionCache;
use common::secret::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Password login and logout.
#[derive(Clone)]
pub struct LoginService {
    directory: Arc<dyn UserDirectory>,
    codec: Arc<TokenCodec>,
    sessions: SessionCache,
}

impl LoginService {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        codec: Arc<TokenCodec>,
        sessions: SessionCache,
    ) -> Self {
        Self {
            directory,
            codec,
            sessions,
        }
    }

    /// Check credentials, cache the identity and return a fresh token.
    ///
    /// Unknown users and wrong passwords both yield `BadCredentials`.
    #[instrument(skip_all, fields(user = %hash_for_correlation(user_name)))]
    pub async fn login(
        &self,
        user_name: &str,
        password: &SecretString,
    ) -> Result<String, AuthError> {
        let start = Instant::now();
        let result = self.authenticate_and_issue(user_name, password).await;

        let status = if result.is_ok() { "success" } else { "error" };
        record_login(status, start.elapsed());

        result
    }

    async fn authenticate_and_issue(
        &self,
        user_name: &str,
        password: &SecretString,
    ) -> Result<String, AuthError> {
        let record = self.directory.find_by_username(user_name).await?;

        // bcrypt runs even for unknown users so both failures take equally long.
        let hash_to_verify = record
            .as_ref()
            .map_or(DUMMY_PASSWORD_HASH, |r| r.password_hash.as_str());
        let is_valid = crypto::verify_password(password.expose_secret(), hash_to_verify)?;

        let record = match record {
            Some(record) if is_valid => record,
            _ => {
                tracing::debug!(target: "auth.login", "Login rejected: bad credentials");
                return Err(AuthError::BadCredentials);
            }
        };

        let permissions = self.directory.permissions_for(record.id).await?;
        let identity = Identity::new(
            record.id.to_string(),
            record.user_name,
            record.password_hash,
            permissions,
        );

        let token = self.codec.issue(identity.subject(), None)?;
        self.sessions
            .put(identity.subject(), &identity.without_credentials())
            .await?;

        tracing::info!(
            target: "auth.login",
            subject = %hash_for_correlation(identity.subject()),
            authorities = identity.authorities().len(),
            "User logged in"
        );

        Ok(token)
    }

    /// Drop the session for `subject`. Calling it again is not an error.
    #[instrument(skip_all, fields(subject = %hash_for_correlation(subject)))]
    pub async fn logout(&self, subject: &str) -> Result<(), AuthError> {
        if self.sessions.delete(subject).await? {
            tracing::info!(target: "auth.login", "User logged out");
        } else {
            tracing::debug!(target: "auth.login", "Logout for a session that was already gone");
        }
        Ok(())
    }
}
