//! Request pipelines for model selection and judging.
//!
//! Both pipelines follow the same shape: normalize catalog records, rank
//! them, synthesize a ready-to-use fallback payload, then attempt to extract
//! a structured response from the real model output and merge the two.
//!
//! Per request the stage machine is:
//! `NotStarted → CatalogNormalized → Ranked → FallbackBuilt →
//! {ExtractedOk | ExtractedFailed} → Merged → Done`.
//! The terminal state is always `Done`; a failed invocation or extraction
//! flows through the fallback path instead of retrying.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::{
    BedrockStatus, CandidateSource, EvaluationPayload, ModelReply, PipelineStage,
    RecommendationPayload,
};
use crate::{extract, fallback, normalize, rank, sanitize};

const NOTE_NO_TEXT: &str =
    "The model invocation returned no text; the heuristic fallback recommendation is shown.";
const NOTE_UNPARSEABLE: &str =
    "The model response was not valid JSON; the heuristic fallback recommendation is shown.";

/// Inputs to the selection pipeline. Catalog records arrive as opaque JSON
/// values from the document-store and provider-catalog collaborators.
#[derive(Debug)]
pub struct SelectionRequest<'a> {
    /// The user's task prompt.
    pub prompt: &'a str,
    /// Static attribute catalog records (arbitrary key casing).
    pub attribute_records: &'a [Value],
    /// Live provider catalog listing, possibly empty.
    pub provider_listing: &'a [Value],
    /// Output of the model-invocation collaborator.
    pub reply: &'a ModelReply,
}

/// Inputs to the judging pipeline.
#[derive(Debug)]
pub struct JudgeRequest<'a> {
    /// The user's task prompt.
    pub prompt: &'a str,
    /// Candidate records under review, usually the recommendation slate.
    pub candidates: &'a [Value],
    /// Output of the model-invocation collaborator.
    pub reply: &'a ModelReply,
}

fn attempt_extraction(reply: &ModelReply) -> (Option<Map<String, Value>>, Option<&'static str>) {
    if !reply.has_text() {
        warn!("model reply carried no text; using fallback payload");
        return (None, Some(NOTE_NO_TEXT));
    }
    let text = reply.text.as_deref().unwrap_or_default();
    match extract::extract_json_object(text) {
        Some(map) => (Some(map), None),
        None => {
            warn!("model reply was not extractable as JSON; using fallback payload");
            (None, Some(NOTE_UNPARSEABLE))
        }
    }
}

/// Drives one selection request through the stage machine.
#[derive(Debug)]
pub struct SelectionPipeline {
    stage: PipelineStage,
}

impl SelectionPipeline {
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::NotStarted,
        }
    }

    /// Current stage, for observability and tests.
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    fn advance(&mut self, stage: PipelineStage) {
        debug!(?stage, "selection pipeline stage");
        self.stage = stage;
    }

    /// Run the full pipeline. Always returns a schema-complete payload.
    pub fn run(&mut self, request: &SelectionRequest<'_>) -> RecommendationPayload {
        let attributes =
            normalize::normalize_all(request.attribute_records, CandidateSource::Catalog);
        let live =
            normalize::normalize_all(request.provider_listing, CandidateSource::ProviderListing);
        self.advance(PipelineStage::CatalogNormalized);

        let ranked = rank::rank_candidates(&live, &attributes);
        self.advance(PipelineStage::Ranked);

        let status = BedrockStatus {
            catalog_count: request.provider_listing.len(),
            error: request.reply.error.clone(),
        };
        let fallback = fallback::build_recommendation(request.prompt, &ranked, status);
        self.advance(PipelineStage::FallbackBuilt);

        let (extracted, diagnostic) = attempt_extraction(request.reply);
        self.advance(if extracted.is_some() {
            PipelineStage::ExtractedOk
        } else {
            PipelineStage::ExtractedFailed
        });

        let mut payload = sanitize::merge_recommendation(extracted, fallback);
        self.advance(PipelineStage::Merged);

        if let Some(diagnostic) = diagnostic {
            if !payload.governance_notes.iter().any(|n| n == diagnostic) {
                payload.governance_notes.push(diagnostic.to_string());
            }
        }
        self.advance(PipelineStage::Done);
        payload
    }
}

impl Default for SelectionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives one judge request through the stage machine.
#[derive(Debug)]
pub struct JudgePipeline {
    stage: PipelineStage,
}

impl JudgePipeline {
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::NotStarted,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    fn advance(&mut self, stage: PipelineStage) {
        debug!(?stage, "judge pipeline stage");
        self.stage = stage;
    }

    /// Run the full pipeline. Always returns a schema-complete payload.
    pub fn run(&mut self, request: &JudgeRequest<'_>) -> EvaluationPayload {
        let candidates = normalize::normalize_all(request.candidates, CandidateSource::Catalog);
        self.advance(PipelineStage::CatalogNormalized);

        let ranked = rank::rank_candidates(&[], &candidates);
        self.advance(PipelineStage::Ranked);

        let fallback = fallback::build_evaluation(&ranked, request.reply.error.as_deref());
        self.advance(PipelineStage::FallbackBuilt);

        let (extracted, diagnostic) = attempt_extraction(request.reply);
        self.advance(if extracted.is_some() {
            PipelineStage::ExtractedOk
        } else {
            PipelineStage::ExtractedFailed
        });

        let mut payload = sanitize::merge_evaluation(extracted, fallback);
        self.advance(PipelineStage::Merged);

        if let Some(diagnostic) = diagnostic {
            if !payload.risks.iter().any(|r| r == diagnostic) {
                payload.risks.push(diagnostic.to_string());
            }
        }
        self.advance(PipelineStage::Done);
        payload
    }
}

impl Default for JudgePipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper: run a selection request end to end.
pub fn recommend(request: &SelectionRequest<'_>) -> RecommendationPayload {
    SelectionPipeline::new().run(request)
}

/// Convenience wrapper: run a judge request end to end.
pub fn judge(request: &JudgeRequest<'_>) -> EvaluationPayload {
    JudgePipeline::new().run(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Verdict;
    use serde_json::json;

    fn attribute_records() -> Vec<Value> {
        vec![
            json!({ "title": "Claude 3 Sonnet", "tags": ["compliance"] }),
            json!({ "model_id": "amazon.titan-text-express-v1", "name": "Titan Text", "score": 0.4 }),
        ]
    }

    fn listing() -> Vec<Value> {
        vec![json!({
            "modelId": "meta.llama3-70b-instruct-v1:0",
            "modelName": "Llama3 70B Instruct",
            "providerName": "Meta",
            "outputModalities": ["TEXT"],
        })]
    }

    #[test]
    fn test_selection_with_parseable_reply() {
        let reply = ModelReply::from_text(
            r#"Here is my pick: ```json
{"candidate_models": [{"model_id": "anthropic.claude-3-sonnet-20240229-v1:0", "model_name": "Claude 3 Sonnet", "sample_prompt": "p", "reasoning": "strong compliance record", "policy_notes": ["check residency"]}],
 "recommended_model": {"model_id": "anthropic.claude-3-sonnet-20240229-v1:0", "model_name": "Claude 3 Sonnet", "reasoning": "strong compliance record", "alignment": "direct"},
 "governance_notes": ["model note"]}
```"#,
        );
        let records = attribute_records();
        let listing = listing();
        let mut pipeline = SelectionPipeline::new();
        let payload = pipeline.run(&SelectionRequest {
            prompt: "build an EU banking assistant",
            attribute_records: &records,
            provider_listing: &listing,
            reply: &reply,
        });

        assert_eq!(pipeline.stage(), PipelineStage::Done);
        assert_eq!(payload.candidate_models.len(), 3);
        assert_eq!(payload.candidate_models[0].reasoning, "strong compliance record");
        assert_eq!(payload.governance_notes, vec!["model note".to_string()]);
        assert_eq!(payload.bedrock_status.as_ref().unwrap().catalog_count, 1);
    }

    #[test]
    fn test_selection_with_unparseable_reply_degrades_to_fallback() {
        let reply = ModelReply::from_text("not json at all");
        let records = attribute_records();
        let listing = listing();
        let mut pipeline = SelectionPipeline::new();
        let payload = pipeline.run(&SelectionRequest {
            prompt: "prompt",
            attribute_records: &records,
            provider_listing: &listing,
            reply: &reply,
        });

        assert_eq!(pipeline.stage(), PipelineStage::Done);
        assert_eq!(payload.candidate_models.len(), 3);
        // Claude is a curated default resolved by name, so it leads the slate.
        assert_eq!(
            payload.candidate_models[0].model_id,
            "anthropic.claude-3-sonnet-20240229-v1:0"
        );
        assert!(payload.governance_notes.iter().any(|n| n.contains("not valid JSON")));
    }

    #[test]
    fn test_selection_with_degraded_reply_records_error() {
        let reply = ModelReply::degraded("connection refused");
        let mut pipeline = SelectionPipeline::new();
        let payload = pipeline.run(&SelectionRequest {
            prompt: "prompt",
            attribute_records: &[],
            provider_listing: &[],
            reply: &reply,
        });

        assert_eq!(payload.candidate_models.len(), 3);
        let status = payload.bedrock_status.unwrap();
        assert_eq!(status.error.as_deref(), Some("connection refused"));
        assert!(payload
            .governance_notes
            .iter()
            .any(|n| n.contains("connection refused")));
        assert!(payload.governance_notes.iter().any(|n| n.contains("no text")));
    }

    #[test]
    fn test_selection_is_schema_complete_for_garbage_inputs() {
        let garbage_replies = [
            ModelReply::default(),
            ModelReply::from_text(""),
            ModelReply::from_text("{"),
            ModelReply::from_text("```json\nnope\n```"),
        ];
        let records = vec![json!(null), json!(17), json!({ "unrelated": true })];
        for reply in &garbage_replies {
            let payload = recommend(&SelectionRequest {
                prompt: "prompt",
                attribute_records: &records,
                provider_listing: &[],
                reply,
            });
            assert_eq!(payload.candidate_models.len(), 3);
            assert!(!payload.recommended_model.model_id.is_empty());
            assert!(!payload.governance_notes.is_empty());
        }
    }

    #[test]
    fn test_judge_with_unparseable_reply_uses_supplied_candidates() {
        let candidates = vec![
            json!({ "model_id": "mistral.mixtral-8x7b-instruct-v0:1", "model_name": "Mixtral 8x7B" }),
            json!({ "model_id": "meta.llama3-70b-instruct-v1:0", "model_name": "Llama3 70B Instruct" }),
        ];
        let reply = ModelReply::from_text("not json at all");
        let mut pipeline = JudgePipeline::new();
        let payload = pipeline.run(&JudgeRequest {
            prompt: "prompt",
            candidates: &candidates,
            reply: &reply,
        });

        assert_eq!(pipeline.stage(), PipelineStage::Done);
        assert_eq!(payload.verdict, Verdict::Caution);
        assert_eq!(payload.top_models.len(), 2);
        let ids: Vec<&str> = payload.top_models.iter().map(|t| t.model_id.as_str()).collect();
        assert!(ids.contains(&"mistral.mixtral-8x7b-instruct-v0:1"));
        assert!(ids.contains(&"meta.llama3-70b-instruct-v1:0"));
        assert_eq!(
            payload.recommended_model.model_id,
            payload.top_models[0].model_id
        );
    }

    #[test]
    fn test_judge_with_fenced_verdict() {
        let reply = ModelReply::from_text(
            "Sure! ```json\n{\"verdict\": \"approve\", \"risks\": [], \"suggestions\": []}\n```",
        );
        let payload = judge(&JudgeRequest {
            prompt: "prompt",
            candidates: &[],
            reply: &reply,
        });

        assert_eq!(payload.verdict, Verdict::Approve);
        assert!(payload.risks.is_empty());
        assert!(payload.suggestions.is_empty());
        // Fallback still guarantees the two ranked slots.
        assert_eq!(payload.top_models.len(), 2);
    }

    #[test]
    fn test_judge_with_empty_candidates_falls_back_to_curated() {
        let reply = ModelReply::degraded("no credentials");
        let payload = judge(&JudgeRequest {
            prompt: "prompt",
            candidates: &[],
            reply: &reply,
        });

        assert_eq!(payload.top_models.len(), 2);
        assert_eq!(
            payload.top_models[0].model_id,
            "anthropic.claude-3-sonnet-20240229-v1:0"
        );
        assert!(payload.risks.iter().any(|r| r.contains("no credentials")));
    }
}
