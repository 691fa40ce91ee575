//! Per-provider request and response shaping.
//!
//! Bedrock-hosted model families each expect a different invocation body and
//! return text under different keys. Rather than chained conditionals, each
//! family is a tagged variant with its own encode ([`ProviderFamily::request_body`])
//! and decode ([`ProviderFamily::response_text`]) path, keyed by the model-id
//! provider prefix.

use serde::Serialize;
use serde_json::Value;

use advisor_core::TokenUsage;

/// Model family, derived from the provider prefix of a model id.
///
/// Unrecognized prefixes fall back to the Titan-style body, the catch-all
/// shape for Amazon-native models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFamily {
    Anthropic,
    Mistral,
    Meta,
    Titan,
}

impl ProviderFamily {
    /// Classify a model id by its provider prefix.
    pub fn from_model_id(model_id: &str) -> Self {
        if model_id.starts_with("anthropic.") {
            ProviderFamily::Anthropic
        } else if model_id.starts_with("mistral.") {
            ProviderFamily::Mistral
        } else if model_id.starts_with("meta.") {
            ProviderFamily::Meta
        } else {
            ProviderFamily::Titan
        }
    }

    /// Build the invocation body this family expects.
    pub fn request_body(&self, prompt: &str, temperature: f32, max_tokens: u32) -> InvocationBody {
        match self {
            ProviderFamily::Anthropic => InvocationBody::Anthropic(AnthropicBody {
                messages: vec![AnthropicMessage {
                    role: "user",
                    content: vec![AnthropicContent::Text {
                        text: prompt.to_string(),
                    }],
                }],
                anthropic_version: "bedrock-2023-05-31",
                max_tokens,
                temperature,
            }),
            ProviderFamily::Mistral => InvocationBody::Mistral(MistralBody {
                prompt: prompt.to_string(),
                max_tokens,
                temperature,
                top_p: 0.9,
            }),
            ProviderFamily::Meta => InvocationBody::Meta(MetaBody {
                prompt: prompt.to_string(),
                max_gen_len: max_tokens,
                temperature,
                top_p: 0.9,
            }),
            ProviderFamily::Titan => InvocationBody::Titan(TitanBody {
                input_text: prompt.to_string(),
                text_generation_config: TitanConfig {
                    temperature,
                    max_token_count: max_tokens,
                },
            }),
        }
    }

    /// Pull the generated text out of this family's response shape.
    ///
    /// A pre-normalized `output.text` field is honored for every family
    /// before the family-specific keys are consulted.
    pub fn response_text(&self, response: &Value) -> Option<String> {
        if let Some(text) = response.pointer("/output/text").and_then(Value::as_str) {
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }

        match self {
            ProviderFamily::Anthropic => {
                let blocks = response.get("content")?.as_array()?;
                let joined: String = blocks
                    .iter()
                    .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
                    .filter_map(|block| block.get("text").and_then(Value::as_str))
                    .collect();
                (!joined.is_empty()).then_some(joined)
            }
            ProviderFamily::Mistral => response
                .pointer("/outputs/0/text")
                .and_then(Value::as_str)
                .map(str::to_string),
            ProviderFamily::Meta => response
                .get("generation")
                .and_then(Value::as_str)
                .map(str::to_string),
            ProviderFamily::Titan => response
                .pointer("/results/0/outputText")
                .or_else(|| response.get("response"))
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Provider-specific invocation body, serialized untagged so each variant
/// produces exactly the wire shape its backend expects.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum InvocationBody {
    Anthropic(AnthropicBody),
    Mistral(MistralBody),
    Meta(MetaBody),
    Titan(TitanBody),
}

#[derive(Debug, Serialize)]
pub struct AnthropicBody {
    messages: Vec<AnthropicMessage>,
    anthropic_version: &'static str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContent {
    Text { text: String },
}

#[derive(Debug, Serialize)]
pub struct MistralBody {
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f64,
}

#[derive(Debug, Serialize)]
pub struct MetaBody {
    prompt: String,
    max_gen_len: u32,
    temperature: f32,
    top_p: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanBody {
    input_text: String,
    text_generation_config: TitanConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanConfig {
    temperature: f32,
    max_token_count: u32,
}

/// Map the many provider-specific usage field spellings into [`TokenUsage`].
pub fn response_usage(response: &Value) -> Option<TokenUsage> {
    if let Some(usage) = response.get("usage").and_then(Value::as_object) {
        let input = ["input_tokens", "prompt_tokens", "promptTokenCount"]
            .iter()
            .find_map(|key| usage.get(*key).and_then(Value::as_u64));
        let output = ["output_tokens", "completion_tokens", "generatedTokenCount"]
            .iter()
            .find_map(|key| usage.get(*key).and_then(Value::as_u64));
        if input.is_some() || output.is_some() {
            return Some(TokenUsage {
                input_tokens: input.unwrap_or(0) as u32,
                output_tokens: output.unwrap_or(0) as u32,
            });
        }
    }

    let input = response.get("prompt_token_count").and_then(Value::as_u64);
    let output = response
        .get("generation_token_count")
        .or_else(|| response.get("completion_token_count"))
        .and_then(Value::as_u64);
    if input.is_some() || output.is_some() {
        return Some(TokenUsage {
            input_tokens: input.unwrap_or(0) as u32,
            output_tokens: output.unwrap_or(0) as u32,
        });
    }

    None
}
