use base64::{engine::general_purpose, Engine as _};
use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW};
use common::secret::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default lifetime of an issued token (1 hour).
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 60 * 60;

/// Fixed issuer written into every token unless overridden.
pub const DEFAULT_JWT_ISSUER: &str = "sg";

pub const DEFAULT_JWT_CLOCK_SKEW_SECONDS: u64 = DEFAULT_CLOCK_SKEW.as_secs();

/// Minimum decoded length of `AUTH_JWT_SECRET` (HS256 wants >= 256 bits).
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Where session records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    /// Shared Redis instance (production).
    Redis,
    /// Process-local map. Sessions do not survive a restart and are not
    /// shared between replicas.
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub struct Config {
    pub bind_address: String,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub session_backend: SessionBackend,
    /// Raw HS256 key bytes, decoded from base64 at load time.
    pub jwt_secret: SecretBox<Vec<u8>>,
    pub jwt_issuer: String,
    pub token_ttl: Duration,
    /// `None` stores session records without expiry.
    pub session_ttl: Option<Duration>,
    pub jwt_clock_skew: Duration,
    pub log_format: LogFormat,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            bind_address: self.bind_address.clone(),
            database_url: self.database_url.clone(),
            redis_url: self.redis_url.clone(),
            session_backend: self.session_backend,
            jwt_secret: SecretBox::new(Box::new(self.jwt_secret.expose_secret().clone())),
            jwt_issuer: self.jwt_issuer.clone(),
            token_ttl: self.token_ttl,
            session_ttl: self.session_ttl,
            jwt_clock_skew: self.jwt_clock_skew,
            log_format: self.log_format,
        }
    }
}

/// Connection URLs may embed credentials, so only their presence is shown.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &self.redis_url.as_ref().map(|_| "[REDACTED]"))
            .field("session_backend", &self.session_backend)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("token_ttl", &self.token_ttl)
            .field("session_ttl", &self.session_ttl)
            .field("jwt_clock_skew", &self.jwt_clock_skew)
            .field("log_format", &self.log_format)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let session_backend = match vars.get("SESSION_BACKEND").map(String::as_str) {
            None | Some("redis") => SessionBackend::Redis,
            Some("memory") => SessionBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "SESSION_BACKEND".to_string(),
                    reason: format!("expected 'redis' or 'memory', got '{}'", other),
                })
            }
        };

        let redis_url = vars.get("REDIS_URL").cloned();
        if session_backend == SessionBackend::Redis && redis_url.is_none() {
            return Err(ConfigError::MissingEnvVar("REDIS_URL".to_string()));
        }

        let jwt_secret_base64 = vars
            .get("AUTH_JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("AUTH_JWT_SECRET".to_string()))?;

        let jwt_secret = general_purpose::STANDARD
            .decode(jwt_secret_base64)
            .map_err(ConfigError::Base64Error)?;

        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "Expected at least {} bytes, got {}",
                MIN_JWT_SECRET_BYTES,
                jwt_secret.len()
            )));
        }

        let jwt_issuer = vars
            .get("JWT_ISSUER")
            .cloned()
            .unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string());

        let token_ttl_seconds =
            parse_seconds(vars, "TOKEN_TTL_SECONDS")?.unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);
        if token_ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                name: "TOKEN_TTL_SECONDS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        // Session records follow the token lifetime unless told otherwise; 0 keeps them
        // until logout or eviction.
        let session_ttl = match parse_seconds(vars, "SESSION_TTL_SECONDS")? {
            None => Some(Duration::from_secs(token_ttl_seconds)),
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        let clock_skew_seconds = parse_seconds(vars, "JWT_CLOCK_SKEW_SECONDS")?
            .unwrap_or(DEFAULT_JWT_CLOCK_SKEW_SECONDS);
        if clock_skew_seconds > MAX_CLOCK_SKEW.as_secs() {
            return Err(ConfigError::InvalidValue {
                name: "JWT_CLOCK_SKEW_SECONDS".to_string(),
                reason: format!("must be at most {}", MAX_CLOCK_SKEW.as_secs()),
            });
        }

        let log_format = match vars.get("LOG_FORMAT").map(String::as_str) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "LOG_FORMAT".to_string(),
                    reason: format!("expected 'text' or 'json', got '{}'", other),
                })
            }
        };

        Ok(Config {
            bind_address,
            database_url,
            redis_url,
            session_backend,
            jwt_secret: SecretBox::new(Box::new(jwt_secret)),
            jwt_issuer,
            token_ttl: Duration::from_secs(token_ttl_seconds),
            session_ttl,
            jwt_clock_skew: Duration::from_secs(clock_skew_seconds),
            log_format,
        })
    }
}

fn parse_seconds(vars: &HashMap<String, String>, name: &str) -> Result<Option<u64>, ConfigError> {
    vars.get(name)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}
