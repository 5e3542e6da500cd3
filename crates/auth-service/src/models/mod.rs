use common::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// Something that can be authenticated and authorized.
pub trait Principal {
    /// Stable identifier, used as the token subject and the session key.
    fn subject(&self) -> &str;

    /// Granted authority strings.
    fn authorities(&self) -> &HashSet<String>;

    /// Stored bcrypt hash. Empty once the identity has left the login path.
    fn credential_hash(&self) -> &str;

    fn has_authority(&self, authority: &str) -> bool {
        self.authorities().contains(authority)
    }
}

/// Authenticated user as cached in the session store.
///
/// The credential hash never leaves the process: it is skipped on
/// serialization and redacted in `Debug`. The authority set is derived
/// from `permissions` on first use and is not serialized either, so every
/// field is read-only once constructed.
#[derive(Clone, Serialize, Deserialize)]
pub struct Identity {
    subject: String,
    username: String,
    #[serde(skip)]
    credential_hash: String,
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(skip)]
    authorities: OnceLock<HashSet<String>>,
}

impl Identity {
    pub fn new(
        subject: impl Into<String>,
        username: impl Into<String>,
        credential_hash: impl Into<String>,
        permissions: Vec<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            username: username.into(),
            credential_hash: credential_hash.into(),
            permissions,
            authorities: OnceLock::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Raw authority strings as granted, duplicates included.
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Copy of this identity with the credential hash dropped.
    pub fn without_credentials(&self) -> Self {
        Self::new(
            self.subject.clone(),
            self.username.clone(),
            String::new(),
            self.permissions.clone(),
        )
    }
}

impl Principal for Identity {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn authorities(&self) -> &HashSet<String> {
        self.authorities
            .get_or_init(|| self.permissions.iter().cloned().collect())
    }

    fn credential_hash(&self) -> &str {
        &self.credential_hash
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("subject", &self.subject)
            .field("username", &self.username)
            .field("credential_hash", &"[REDACTED]")
            .field("permissions", &self.permissions)
            .finish()
    }
}

/// Login form. Wire names follow the existing clients (`userName`).
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "userName", alias = "username")]
    pub user_name: String,
    pub password: SecretString,
}

/// Success envelope shared by all JSON endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(msg: impl Into<String>, data: T) -> Self {
        Self {
            code: 200,
            msg: msg.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn ok_empty(msg: impl Into<String>) -> Self {
        Self {
            code: 200,
            msg: msg.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenData {
    pub token: String,
}
