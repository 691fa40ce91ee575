//! End-to-end orchestration of the advisor workflow.
//!
//! The orchestrator owns a [`ModelInvoker`] and a [`RuntimeConfig`] and wires
//! the async invocation layer to the synchronous core pipeline: build the
//! prompt, invoke the model (degrading on failure), then hand the reply to
//! the pipeline, which always produces a schema-complete payload.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use advisor_core::{
    normalize_all, rank_candidates, recommend, CandidateSource, EvaluationPayload,
    RecommendationPayload, TokenUsage,
};
use advisor_core::{judge, JudgeRequest, SelectionRequest};

use crate::config::RuntimeConfig;
use crate::invoke::invoke_with_fallback;
use crate::prompts;
use crate::providers::ModelInvoker;

/// Candidates embedded into the selection prompt, at most.
const PROMPT_SLATE_LIMIT: usize = 8;

/// Business and compliance requirements accompanying a selection request.
///
/// All fields are optional; an empty profile still produces a usable prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementProfile {
    /// Industry vertical, e.g. "healthcare" or "banking"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    /// Data sensitivity classification, e.g. "PII" or "public"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_sensitivity: Option<String>,

    /// Regulatory frameworks in scope, e.g. "GDPR", "HIPAA"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regulatory_frameworks: Vec<String>,

    /// Acceptable response latency in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_tolerance_ms: Option<u64>,

    /// Cost appetite, free-form ("low", "medium", "high")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_tier: Option<String>,
}

/// One benchmark invocation of a recommended candidate.
#[derive(Debug, Clone, Serialize)]
pub struct TestRun {
    pub model_id: String,
    pub model_name: String,
    /// The prompt the candidate was exercised with
    pub prompt: String,
    /// Generated text, absent when the invocation degraded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Drives recommendation, evaluation, and benchmarking against one invoker.
pub struct AdvisorOrchestrator {
    invoker: Arc<dyn ModelInvoker>,
    config: RuntimeConfig,
}

impl std::fmt::Debug for AdvisorOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorOrchestrator")
            .field("provider", &self.invoker.name())
            .field("config", &self.config)
            .finish()
    }
}

impl AdvisorOrchestrator {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self::with_config(invoker, RuntimeConfig::default())
    }

    pub fn with_config(invoker: Arc<dyn ModelInvoker>, config: RuntimeConfig) -> Self {
        Self { invoker, config }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Produce a recommendation payload for the given prompt.
    ///
    /// `attribute_records` and `provider_listing` are the raw catalog inputs;
    /// they shape both the prompt slate and the fallback payload, so a dead
    /// backend still yields a grounded recommendation.
    pub async fn recommend(
        &self,
        prompt: &str,
        requirements: &RequirementProfile,
        context: &Value,
        attribute_records: &[Value],
        provider_listing: &[Value],
    ) -> RecommendationPayload {
        let attributes = normalize_all(attribute_records, CandidateSource::Catalog);
        let live = normalize_all(provider_listing, CandidateSource::ProviderListing);
        let mut slate = rank_candidates(&live, &attributes);
        slate.truncate(PROMPT_SLATE_LIMIT);

        let requirements_value = serde_json::to_value(requirements).unwrap_or(Value::Null);
        let payload_prompt = prompts::selection_prompt(prompt, &requirements_value, context, &slate);

        info!(
            model_id = %self.config.selector_model,
            slate = slate.len(),
            "running selection"
        );
        let reply = invoke_with_fallback(
            self.invoker.as_ref(),
            &self.config.selector_model,
            &payload_prompt,
            &self.config.invocation(self.config.selector_temperature),
        )
        .await;

        recommend(&SelectionRequest {
            prompt,
            attribute_records,
            provider_listing,
            reply: &reply,
        })
    }

    /// Evaluate a recommendation with the judge model.
    ///
    /// The judge model is deliberately a different family than the selector,
    /// so the review is not self-grading.
    pub async fn judge(
        &self,
        prompt: &str,
        recommendation: &RecommendationPayload,
        context: &Value,
    ) -> EvaluationPayload {
        let candidates: Vec<Value> = recommendation
            .candidate_models
            .iter()
            .map(|slot| {
                serde_json::json!({
                    "model_id": slot.model_id,
                    "model_name": slot.model_name,
                })
            })
            .collect();

        let selection = serde_json::to_value(recommendation).unwrap_or(Value::Null);
        let payload_prompt = prompts::judge_prompt(prompt, &selection, context);

        info!(model_id = %self.config.judge_model, "running evaluation");
        let reply = invoke_with_fallback(
            self.invoker.as_ref(),
            &self.config.judge_model,
            &payload_prompt,
            &self.config.invocation(self.config.judge_temperature),
        )
        .await;

        judge(&JudgeRequest {
            prompt,
            candidates: &candidates,
            reply: &reply,
        })
    }

    /// Exercise each recommended candidate once, concurrently.
    ///
    /// Each slot runs against its own `sample_prompt` when one was produced,
    /// otherwise the user's prompt. Degraded invocations surface as runs with
    /// an `error` and no output.
    pub async fn benchmark(
        &self,
        prompt: &str,
        recommendation: &RecommendationPayload,
    ) -> Vec<TestRun> {
        let invocation = self.config.invocation(self.config.selector_temperature);
        let runs = recommendation.candidate_models.iter().map(|slot| {
            let run_prompt = if slot.sample_prompt.trim().is_empty() {
                prompt.to_string()
            } else {
                slot.sample_prompt.clone()
            };
            let invocation = invocation.clone();
            async move {
                let reply = invoke_with_fallback(
                    self.invoker.as_ref(),
                    &slot.model_id,
                    &run_prompt,
                    &invocation,
                )
                .await;
                TestRun {
                    model_id: slot.model_id.clone(),
                    model_name: slot.model_name.clone(),
                    prompt: run_prompt,
                    output: reply.text,
                    usage: reply.usage,
                    error: reply.error,
                }
            }
        });
        join_all(runs).await
    }
}
