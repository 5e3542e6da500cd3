//! Read-only access to the user directory.
//!
//! Tables (owned by the user administration system, not migrated here):
//! - `sys_user` - accounts; `status = '0'` is enabled, `del_flag = 0` is live
//! - `sys_user_role`, `sys_role` - role assignment
//! - `sys_role_menu`, `sys_menu` - role to permission string (`perms`)

use crate::errors::AuthError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

/// Account row needed for a login.
#[derive(Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub user_name: String,
    pub password_hash: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("user_name", &self.user_name)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Enabled, non-deleted account by login name.
    async fn find_by_username(&self, user_name: &str) -> Result<Option<UserRecord>, AuthError>;

    /// Distinct permission strings granted through the user's enabled roles.
    async fn permissions_for(&self, user_id: i64) -> Result<Vec<String>, AuthError>;
}

#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip_all)]
    async fn find_by_username(&self, user_name: &str) -> Result<Option<UserRecord>, AuthError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, user_name, password AS password_hash
            FROM sys_user
            WHERE user_name = $1 AND status = '0' AND del_flag = 0
            "#,
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to fetch user by name: {}", e)))
    }

    #[instrument(skip_all)]
    async fn permissions_for(&self, user_id: i64) -> Result<Vec<String>, AuthError> {
        let perms: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT m.perms
            FROM sys_user_role ur
            JOIN sys_role r ON r.id = ur.role_id
            JOIN sys_role_menu rm ON rm.role_id = ur.role_id
            JOIN sys_menu m ON m.id = rm.menu_id
            WHERE ur.user_id = $1
              AND r.status = '0'
              AND m.status = '0'
              AND m.perms IS NOT NULL
              AND m.perms <> ''
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to fetch permissions: {}", e)))?;

        Ok(perms)
    }
}
