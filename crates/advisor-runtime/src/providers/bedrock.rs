//! HTTP provider for Bedrock-compatible runtime endpoints.
//!
//! Posts family-shaped invocation bodies to
//! `{base_url}/model/{model_id}/invoke` with bearer-key auth and normalizes
//! the response into a [`ModelReply`].
//!
//! ## Security
//!
//! The API key is held in an [`ApiCredential`] and exposed only when the
//! request header is built.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use advisor_core::ModelReply;

use super::{
    payload::{response_usage, ProviderFamily},
    secrets::{ApiCredential, CredentialSource},
    InvocationConfig, InvocationError, ModelInvoker,
};

/// Environment variable holding the Bedrock API key.
pub const BEDROCK_API_KEY_ENV: &str = "BEDROCK_API_KEY";

/// Environment variable selecting the Bedrock region.
pub const BEDROCK_REGION_ENV: &str = "BEDROCK_REGION";

const DEFAULT_REGION: &str = "us-east-1";

/// Bedrock-compatible HTTP provider.
pub struct BedrockProvider {
    credential: ApiCredential,
    base_url: String,
}

impl std::fmt::Debug for BedrockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn region_base_url(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

impl BedrockProvider {
    /// Create a provider with an explicit API key, targeting the default
    /// region.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            credential: ApiCredential::new(
                api_key,
                CredentialSource::Programmatic,
                "Bedrock API key",
            ),
            base_url: region_base_url(DEFAULT_REGION),
        }
    }

    /// Create from `BEDROCK_API_KEY` / `BEDROCK_REGION` environment
    /// variables. The key value is never logged.
    pub fn from_env() -> Result<Self, InvocationError> {
        let credential = ApiCredential::from_env(BEDROCK_API_KEY_ENV, "Bedrock API key")?;
        let region = std::env::var(BEDROCK_REGION_ENV).unwrap_or_else(|_| DEFAULT_REGION.to_string());
        Ok(Self {
            credential,
            base_url: region_base_url(&region),
        })
    }

    /// Override the endpoint, e.g. for a gateway or test server.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn client(&self) -> &reqwest::Client {
        static CLIENT: std::sync::OnceLock<reqwest::Client> = std::sync::OnceLock::new();
        CLIENT.get_or_init(|| {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client")
        })
    }
}

/// Pull the provider's error message out of an error body, falling back to
/// the raw body text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl ModelInvoker for BedrockProvider {
    async fn invoke(
        &self,
        model_id: &str,
        prompt: &str,
        config: &InvocationConfig,
    ) -> Result<ModelReply, InvocationError> {
        let family = ProviderFamily::from_model_id(model_id);
        let body = family.request_body(prompt, config.temperature, config.max_tokens);

        // The credential is exposed only here, at the point of use.
        let response = self
            .client()
            .post(format!("{}/model/{}/invoke", self.base_url, model_id))
            .header("authorization", format!("Bearer {}", self.credential.expose()))
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .timeout(config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InvocationError::Timeout(config.timeout)
                } else {
                    InvocationError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(InvocationError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| InvocationError::ParseError(e.to_string()))?;
            return Err(InvocationError::ApiError {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| InvocationError::ParseError(e.to_string()))?;

        let text = family.response_text(&raw);
        let usage = response_usage(&raw);

        Ok(ModelReply {
            text,
            usage,
            raw: Some(raw),
            error: None,
        })
    }

    fn name(&self) -> &str {
        "bedrock"
    }

    async fn health_check(&self) -> bool {
        !self.credential.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = BedrockProvider::new("test-key");
        assert_eq!(provider.name(), "bedrock");
        assert_eq!(provider.base_url, "https://bedrock-runtime.us-east-1.amazonaws.com");
    }

    #[test]
    fn test_base_url_override() {
        let provider = BedrockProvider::new("test-key").with_base_url("http://localhost:9000");
        assert_eq!(provider.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret = "bedrock-super-secret-12345";
        let provider = BedrockProvider::new(secret);
        let debug = format!("{:?}", provider);
        assert!(!debug.contains(secret), "API key was exposed in Debug output");
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_health_check_requires_nonempty_key() {
        assert!(BedrockProvider::new("key").health_check().await);
        assert!(!BedrockProvider::new("").health_check().await);
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message": "model not found"}"#),
            "model not found"
        );
        assert_eq!(error_message("plain text error"), "plain text error");
    }
}
