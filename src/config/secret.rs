//! Credential handling with the secrecy crate
//!
//! SQL passwords arrive in request bodies and in the `import` command's
//! environment. They are held in [`SecretString`] from the moment they are
//! deserialized, so `Debug` output and tracing fields never show them, and
//! the memory is zeroed when the request finishes.
//!
//! # Example
//!
//! ```rust
//! use clinic_admin::config::{expose, secret_string};
//!
//! let password = secret_string("my-password".to_string());
//! assert_eq!(expose(&password), "my-password");
//! assert!(!format!("{password:?}").contains("my-password"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, ExposeSecret, Secret};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroize;

/// String wrapper that satisfies the trait bounds `Secret` needs
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
///
/// Zeroed on drop, redacted in `Debug`, read only through
/// `expose_secret()` or [`expose`].
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Wraps an optional plain string
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value.map(secret_string)
}

/// Borrows the secret as `&str`, for handing to the database driver
#[inline]
pub fn expose(secret: &SecretString) -> &str {
    secret.expose_secret().as_ref()
}
