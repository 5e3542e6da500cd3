//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used across Tokengate for login
//! passwords and the token signing key.
//!
//! `SecretBox<T>` and `SecretString` print as `[REDACTED]` under `Debug`, so
//! a struct deriving `Debug` that holds one never leaks it through `{:?}` or
//! `tracing`. The inner value is zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginForm {
//!     user_name: String,
//!     password: SecretString,
//! }
//!
//! let form = LoginForm {
//!     user_name: "alice".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//!
//! assert!(!format!("{form:?}").contains("hunter2"));
//! assert_eq!(form.password.expose_secret(), "hunter2");
//! ```
//!
//! Use `SecretString` for passwords and bearer tokens held in memory, and
//! `SecretBox<Vec<u8>>` for raw key material such as the HS256 signing key.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
