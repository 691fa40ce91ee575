//! Model-invocation providers.
//!
//! This module defines the [`ModelInvoker`] trait — the only boundary through
//! which the runtime talks to an LLM backend — plus the provider-family
//! payload shaping and an HTTP implementation for Bedrock-compatible
//! endpoints.
//!
//! ## Security
//!
//! Providers hold credentials in [`ApiCredential`], which redacts `Debug`
//! output and zeroes the value on drop.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use advisor_core::ModelReply;

mod payload;
pub mod secrets;

#[cfg(feature = "bedrock")]
mod bedrock;

pub use payload::{response_usage, InvocationBody, ProviderFamily};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "bedrock")]
pub use bedrock::BedrockProvider;

/// Errors from model invocation.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Configuration for one invocation.
#[derive(Debug, Clone)]
pub struct InvocationConfig {
    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 600,
            temperature: 0.2,
            timeout: Duration::from_secs(15),
        }
    }
}

/// The model-invocation collaborator.
///
/// Implementations take a model identifier, prompt text, and sampling
/// configuration and return a normalized [`ModelReply`]. This is the ONLY
/// place where LLM calls are made; the core pipeline never sees this trait,
/// only the reply record.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Execute one model invocation.
    async fn invoke(
        &self,
        model_id: &str,
        prompt: &str,
        config: &InvocationConfig,
    ) -> Result<ModelReply, InvocationError>;

    /// Provider name for logs and metrics.
    fn name(&self) -> &str;

    /// Check if the provider is ready to serve calls.
    async fn health_check(&self) -> bool {
        true
    }
}

/// Invoker for offline operation: every call fails fast with
/// [`InvocationError::NotConfigured`], which downstream code absorbs into
/// the fallback path. Useful for demos and for exercising the
/// degraded-backend contract in tests.
#[derive(Debug, Default)]
pub struct NullInvoker;

#[async_trait]
impl ModelInvoker for NullInvoker {
    async fn invoke(
        &self,
        _model_id: &str,
        _prompt: &str,
        _config: &InvocationConfig,
    ) -> Result<ModelReply, InvocationError> {
        Err(InvocationError::NotConfigured(
            "offline mode: no model backend configured".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "offline"
    }

    async fn health_check(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_config_defaults() {
        let config = InvocationConfig::default();
        assert_eq!(config.max_tokens, 600);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_null_invoker_always_fails_fast() {
        let invoker = NullInvoker;
        let result = invoker
            .invoke("anthropic.claude-3-sonnet-20240229-v1:0", "hi", &InvocationConfig::default())
            .await;
        assert!(matches!(result, Err(InvocationError::NotConfigured(_))));
        assert!(!invoker.health_check().await);
        assert_eq!(invoker.name(), "offline");
    }
}
