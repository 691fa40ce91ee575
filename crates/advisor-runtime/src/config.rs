//! Runtime configuration.
//!
//! Settings come from environment variables with conservative defaults, so a
//! bare `AdvisorOrchestrator` works out of the box and a deployment can pin
//! different selector/judge models without a code change.

use std::time::Duration;

use crate::providers::InvocationConfig;

/// Environment variable selecting the recommendation model.
pub const SELECTOR_MODEL_ENV: &str = "ADVISOR_SELECTOR_MODEL";

/// Environment variable selecting the evaluation model.
pub const JUDGE_MODEL_ENV: &str = "ADVISOR_JUDGE_MODEL";

/// Environment variable overriding the per-call token ceiling.
pub const MAX_TOKENS_ENV: &str = "ADVISOR_MAX_TOKENS";

/// Environment variable overriding the per-call timeout, in seconds.
pub const TIMEOUT_SECS_ENV: &str = "ADVISOR_TIMEOUT_SECS";

const DEFAULT_SELECTOR_MODEL: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
const DEFAULT_JUDGE_MODEL: &str = "mistral.mixtral-8x7b-instruct-v0:1";

/// Settings for the advisor runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Model used to produce recommendations
    pub selector_model: String,

    /// Model used to evaluate recommendations. Intentionally a different
    /// family than the selector, so the judge is not grading its own work.
    pub judge_model: String,

    /// Sampling temperature for recommendation calls
    pub selector_temperature: f32,

    /// Sampling temperature for evaluation calls
    pub judge_temperature: f32,

    /// Token ceiling for every call
    pub max_tokens: u32,

    /// Per-call timeout
    pub timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            selector_model: DEFAULT_SELECTOR_MODEL.to_string(),
            judge_model: DEFAULT_JUDGE_MODEL.to_string(),
            selector_temperature: 0.2,
            judge_temperature: 0.1,
            max_tokens: 600,
            timeout: Duration::from_secs(15),
        }
    }
}

impl RuntimeConfig {
    /// Build a config from environment variables, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(model) = std::env::var(SELECTOR_MODEL_ENV) {
            if !model.trim().is_empty() {
                config.selector_model = model;
            }
        }
        if let Ok(model) = std::env::var(JUDGE_MODEL_ENV) {
            if !model.trim().is_empty() {
                config.judge_model = model;
            }
        }
        if let Some(max_tokens) = env_parse::<u32>(MAX_TOKENS_ENV) {
            config.max_tokens = max_tokens;
        }
        if let Some(secs) = env_parse::<u64>(TIMEOUT_SECS_ENV) {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    /// Invocation settings at the given temperature.
    pub fn invocation(&self, temperature: f32) -> InvocationConfig {
        InvocationConfig {
            max_tokens: self.max_tokens,
            temperature,
            timeout: self.timeout,
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert!(config.selector_model.starts_with("anthropic."));
        assert!(config.judge_model.starts_with("mistral."));
        assert_eq!(config.max_tokens, 600);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.judge_temperature < config.selector_temperature);
    }

    #[test]
    fn test_invocation_carries_shared_limits() {
        let config = RuntimeConfig::default();
        let invocation = config.invocation(config.judge_temperature);
        assert_eq!(invocation.max_tokens, config.max_tokens);
        assert_eq!(invocation.temperature, 0.1);
        assert_eq!(invocation.timeout, config.timeout);
    }
}
