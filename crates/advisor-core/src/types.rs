//! Core data model for the recommendation and judging pipelines.
//!
//! Every payload type here is constructed fresh per request and is immutable
//! once returned to the caller. Nothing in this module performs I/O.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Relative cost tier of a candidate model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    Low,
    Medium,
    High,
}

impl CostTier {
    /// Parse a catalog cost string, tolerating arbitrary casing.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(CostTier::Low),
            "medium" => Some(CostTier::Medium),
            "high" => Some(CostTier::High),
            _ => None,
        }
    }
}

/// Where a candidate record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateSource {
    /// Static attribute catalog (document store records).
    Catalog,
    /// Live provider catalog listing.
    ProviderListing,
    /// Curated default catalog entry.
    Default,
}

/// One selectable model under consideration.
///
/// Invariant: `id` is never empty. The normalizer assigns a synthetic id
/// (`fallback-model-<n>` or `<provider>-model-<n>`) when the source record
/// carries none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostTier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub source: CandidateSource,
}

/// One of the three recommendation slots in a [`RecommendationPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecommendation {
    pub model_id: String,
    pub model_name: String,
    pub sample_prompt: String,
    pub reasoning: String,
    pub policy_notes: Vec<String>,
}

/// The single recommended model within a [`RecommendationPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedModel {
    pub model_id: String,
    pub model_name: String,
    pub reasoning: String,
    pub alignment: String,
}

/// Diagnostic status of the upstream provider catalog and invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedrockStatus {
    pub catalog_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Final output of the selection pipeline.
///
/// Invariant: `candidate_models` always has length 3. The pipeline pads or
/// truncates before returning; callers never see a short slate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationPayload {
    pub candidate_models: Vec<CandidateRecommendation>,
    pub recommended_model: RecommendedModel,
    pub governance_notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrock_status: Option<BedrockStatus>,
}

/// Judge verdict for a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approve,
    Caution,
    Reject,
}

impl Verdict {
    /// Parse a verdict string, tolerating arbitrary casing.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "approve" => Some(Verdict::Approve),
            "caution" => Some(Verdict::Caution),
            "reject" => Some(Verdict::Reject),
            _ => None,
        }
    }
}

/// One of the two ranked slots in an [`EvaluationPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopModel {
    pub model_id: String,
    pub model_name: String,
    pub rationale: String,
    /// Always 1 or 2; the sanitizer re-derives this from slot position.
    pub relative_rank: u8,
}

/// The judge's single pick within an [`EvaluationPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgePick {
    pub model_id: String,
    pub model_name: String,
    pub rationale: String,
}

/// Final output of the judging pipeline.
///
/// Invariant: `top_models` always has length 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPayload {
    pub verdict: Verdict,
    pub risks: Vec<String>,
    pub suggestions: Vec<String>,
    pub top_models: Vec<TopModel>,
    pub recommended_model: JudgePick,
}

/// Token accounting for a model invocation, normalized across providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Normalized output of the model-invocation collaborator.
///
/// An absent `text` means the backend was unreachable or degraded; the
/// pipeline must still produce a complete fallback payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelReply {
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelReply {
    /// A reply carrying generated text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// A degraded reply recording why the invocation failed.
    pub fn degraded(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Whether the reply carries usable text.
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Per-request pipeline state.
///
/// Terminal state is always `Done`; there is no retry loop. A failed
/// invocation or extraction transitions through the fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    NotStarted,
    CatalogNormalized,
    Ranked,
    FallbackBuilt,
    ExtractedOk,
    ExtractedFailed,
    Merged,
    Done,
}
