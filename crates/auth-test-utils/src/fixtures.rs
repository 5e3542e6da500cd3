//! In-memory user directory for tests that do not need PostgreSQL.

use crate::test_ids::*;
use async_trait::async_trait;
use auth_service::errors::AuthError;
use auth_service::repositories::{UserDirectory, UserRecord};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Clone)]
struct StoredUser {
    record: UserRecord,
    permissions: Vec<String>,
}

/// [`UserDirectory`] backed by a map, keyed by user name.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<String, StoredUser>>,
    unavailable: Mutex<bool>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory seeded with alice, bob and root.
    pub fn with_default_users() -> Self {
        let directory = Self::new();
        directory.add_user(
            ALICE_ID,
            ALICE_NAME,
            ALICE_PASSWORD,
            &[AUTHORITY_USER, AUTHORITY_USER_VIEW],
        );
        directory.add_user(BOB_ID, BOB_NAME, BOB_PASSWORD, &[AUTHORITY_USER]);
        directory.add_user(
            ROOT_ID,
            ROOT_NAME,
            ROOT_PASSWORD,
            &[AUTHORITY_USER, AUTHORITY_USER_VIEW, AUTHORITY_ADMIN],
        );
        directory
    }

    /// Add or replace a user, hashing `password` at the test cost.
    pub fn add_user(&self, id: i64, user_name: &str, password: &str, permissions: &[&str]) {
        let password_hash =
            bcrypt::hash(password, TEST_BCRYPT_COST).expect("bcrypt hash should succeed");
        let user = StoredUser {
            record: UserRecord {
                id,
                user_name: user_name.to_string(),
                password_hash,
            },
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        };
        self.users
            .lock()
            .expect("directory lock")
            .insert(user_name.to_string(), user);
    }

    /// Make every subsequent lookup fail with a database error.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().expect("directory lock") = unavailable;
    }

    fn check_available(&self) -> Result<(), AuthError> {
        if *self.unavailable.lock().expect("directory lock") {
            return Err(AuthError::Database("directory unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_username(&self, user_name: &str) -> Result<Option<UserRecord>, AuthError> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .expect("directory lock")
            .get(user_name)
            .map(|u| u.record.clone()))
    }

    async fn permissions_for(&self, user_id: i64) -> Result<Vec<String>, AuthError> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .expect("directory lock")
            .values()
            .find(|u| u.record.id == user_id)
            .map(|u| u.permissions.clone())
            .unwrap_or_default())
    }
}
