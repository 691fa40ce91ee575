//! Secure credential handling for model providers.
//!
//! Credentials are wrapped so they cannot appear in `Debug` output and are
//! zeroed on drop via the `secrecy` crate. Exposure is explicit through
//! [`ApiCredential::expose`], at the point of use only.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::InvocationError;

/// Where a credential was loaded from. Useful for debugging configuration
/// issues without exposing the actual value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a credential value. After this point it cannot be accidentally
    /// logged or printed.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load a credential from an environment variable.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, InvocationError> {
        std::env::var(env_var)
            .map(|value| Self::new(value, CredentialSource::Environment, name))
            .map_err(|_| {
                InvocationError::NotConfigured(format!(
                    "{name} not set: configure '{env_var}' environment variable"
                ))
            })
    }

    /// Expose the credential value. Call this only at the point of use.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Whether the stored value is empty.
    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    /// Where the credential came from.
    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_is_redacted() {
        let credential = ApiCredential::new(
            "super-secret-key-12345",
            CredentialSource::Programmatic,
            "test key",
        );
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("super-secret-key-12345"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_returns_the_value() {
        let credential =
            ApiCredential::new("the-key", CredentialSource::Programmatic, "test key");
        assert_eq!(credential.expose(), "the-key");
        assert!(!credential.is_empty());
        assert_eq!(credential.source(), CredentialSource::Programmatic);
    }

    #[test]
    fn test_missing_env_var_is_not_configured() {
        let result = ApiCredential::from_env("ADVISOR_TEST_KEY_THAT_DOES_NOT_EXIST", "test key");
        assert!(matches!(result, Err(InvocationError::NotConfigured(_))));
    }
}
