//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of sensitive values.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A retrieval-engine API key that won't be logged or displayed.
///
/// Uses `secrecy::SecretBox` so the bearer key never shows up in logs,
/// debug output, or error messages - diagnostics reports serialize whole
/// engine states and must not leak it.
pub struct ApiKey(SecretBox<str>);

impl ApiKey {
    /// Create a new API key.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(value.into().into_boxed_str()))
    }

    /// Expose the key for use.
    ///
    /// Only call this at the point of use (the Authorization header).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_in_debug() {
        let key = ApiKey::new("lightrag-super-secret");
        let debug = format!("{:?}", key);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_key_not_in_display() {
        let key = ApiKey::new("lightrag-super-secret");
        let display = format!("{}", key);
        assert!(!display.contains("super-secret"));
        assert!(display.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_works() {
        let key = ApiKey::new("lightrag-super-secret");
        assert_eq!(key.expose(), "lightrag-super-secret");
    }

    #[test]
    fn test_clone_preserves_value() {
        let key = ApiKey::new("lightrag-super-secret");
        assert_eq!(key.clone().expose(), key.expose());
    }
}
