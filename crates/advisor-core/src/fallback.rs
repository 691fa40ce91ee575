//! Fallback payload synthesis.
//!
//! Builds complete, schema-valid payloads purely from catalog data. This is
//! the safety net the rest of the pipeline degrades to: it must validate
//! against the full schema with no model call at all.

use crate::catalog;
use crate::types::{
    BedrockStatus, Candidate, CandidateRecommendation, EvaluationPayload, JudgePick,
    RecommendationPayload, RecommendedModel, TopModel, Verdict,
};

/// Number of slots in a recommendation slate.
pub const CANDIDATE_SLOTS: usize = 3;

/// Number of slots in a judge ranking.
pub const TOP_MODEL_SLOTS: usize = 2;

/// Fixed policy notes attached to every heuristic recommendation slot.
const POLICY_NOTES: [&str; 2] = [
    "Review this recommendation with your compliance team before production use.",
    "Verify regulatory fit manually; this slate was assembled by deterministic heuristics.",
];

pub(crate) const HEURISTIC_NOTICE: &str =
    "Heuristic fallback was used to assemble this recommendation; no model-generated ranking was available.";

/// Take the top `want` ranked candidates, padding with curated defaults and
/// skipping ids already used when fewer are available.
fn select_top(ranked: &[Candidate], want: usize) -> Vec<Candidate> {
    let mut picked: Vec<Candidate> = ranked.iter().take(want).cloned().collect();
    for default in catalog::default_catalog() {
        if picked.len() >= want {
            break;
        }
        if picked.iter().any(|c| c.id == default.id) {
            continue;
        }
        picked.push(default.clone());
    }
    picked.truncate(want);
    picked
}

/// Append the fixed three-part compliance checklist to the user prompt.
fn compliance_prompt(prompt: &str) -> String {
    format!(
        "{prompt}\n\nBefore responding, work through this compliance checklist:\n\
         1. Identify the guardrails and risks specific to this workload.\n\
         2. List the regulatory obligations that apply.\n\
         3. Describe the QA steps a reviewer should take before sign-off."
    )
}

/// Reasoning string referencing the candidate's provider and known strengths.
fn candidate_reasoning(candidate: &Candidate) -> String {
    let provider = candidate
        .provider
        .as_deref()
        .unwrap_or("an unspecified provider");
    if candidate.strengths.is_empty() {
        format!("Offered by {provider}; selected by deterministic catalog ranking.")
    } else {
        format!(
            "Offered by {provider}; known strengths: {}.",
            candidate.strengths.join(", ")
        )
    }
}

fn recommendation_slot(candidate: &Candidate, prompt: &str) -> CandidateRecommendation {
    CandidateRecommendation {
        model_id: candidate.id.clone(),
        model_name: candidate.name.clone(),
        sample_prompt: compliance_prompt(prompt),
        reasoning: candidate_reasoning(candidate),
        policy_notes: POLICY_NOTES.iter().map(|n| n.to_string()).collect(),
    }
}

/// Build a complete [`RecommendationPayload`] without any model call.
pub fn build_recommendation(
    prompt: &str,
    ranked: &[Candidate],
    status: BedrockStatus,
) -> RecommendationPayload {
    let picked = select_top(ranked, CANDIDATE_SLOTS);
    let candidate_models: Vec<CandidateRecommendation> = picked
        .iter()
        .map(|candidate| recommendation_slot(candidate, prompt))
        .collect();

    let first = &candidate_models[0];
    let recommended_model = RecommendedModel {
        model_id: first.model_id.clone(),
        model_name: first.model_name.clone(),
        reasoning: first.reasoning.clone(),
        alignment: "Highest-ranked catalog candidate for this workload.".to_string(),
    };

    let mut governance_notes = vec![HEURISTIC_NOTICE.to_string()];
    if let Some(error) = &status.error {
        governance_notes.push(format!("Upstream model invocation failed: {error}"));
    }

    RecommendationPayload {
        candidate_models,
        recommended_model,
        governance_notes,
        bedrock_status: Some(status),
    }
}

/// Build a complete [`EvaluationPayload`] without any model call.
///
/// The heuristic judge never approves: without a model critique the verdict
/// stays at `caution` so a human reviewer is always in the loop.
pub fn build_evaluation(ranked: &[Candidate], upstream_error: Option<&str>) -> EvaluationPayload {
    let picked = select_top(ranked, TOP_MODEL_SLOTS);

    let top_models: Vec<TopModel> = picked
        .iter()
        .enumerate()
        .map(|(index, candidate)| TopModel {
            model_id: candidate.id.clone(),
            model_name: candidate.name.clone(),
            rationale: candidate_reasoning(candidate),
            relative_rank: (index + 1) as u8,
        })
        .collect();

    let first = &top_models[0];
    let recommended_model = JudgePick {
        model_id: first.model_id.clone(),
        model_name: first.model_name.clone(),
        rationale: first.rationale.clone(),
    };

    let mut risks = vec![
        "No model critique was obtained; this review was assembled heuristically.".to_string(),
    ];
    if let Some(error) = upstream_error {
        risks.push(format!("Upstream model invocation failed: {error}"));
    }

    EvaluationPayload {
        verdict: Verdict::Caution,
        risks,
        suggestions: vec![
            "Re-run the evaluation once the model backend is reachable.".to_string(),
            "Validate the compliance posture manually before deployment.".to_string(),
        ],
        top_models,
        recommended_model,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandidateSource;
    use std::collections::BTreeSet;

    fn candidate(id: &str, name: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: name.to_string(),
            summary: None,
            tags: BTreeSet::new(),
            category: None,
            cost: None,
            strengths: vec!["speed".to_string()],
            score: None,
            provider: Some("amazon".to_string()),
            source: CandidateSource::Catalog,
        }
    }

    fn status() -> BedrockStatus {
        BedrockStatus {
            catalog_count: 0,
            error: None,
        }
    }

    #[test]
    fn test_slate_is_exactly_three_for_any_input_length() {
        for len in [0usize, 1, 2, 5, 10] {
            let ranked: Vec<Candidate> = (0..len)
                .map(|i| candidate(&format!("amazon.titan-{i}"), &format!("Titan {i}")))
                .collect();
            let payload = build_recommendation("draft a policy bot", &ranked, status());
            assert_eq!(payload.candidate_models.len(), 3, "input length {len}");
        }
    }

    #[test]
    fn test_padding_skips_ids_already_used() {
        // One ranked candidate that is itself a curated default: padding must
        // not repeat it.
        let ranked = vec![candidate("meta.llama3-70b-instruct-v1:0", "Llama3 70B Instruct")];
        let payload = build_recommendation("prompt", &ranked, status());

        let ids: Vec<&str> = payload
            .candidate_models
            .iter()
            .map(|c| c.model_id.as_str())
            .collect();
        assert_eq!(ids.len(), 3);
        let unique: std::collections::BTreeSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 3);
        assert_eq!(ids[0], "meta.llama3-70b-instruct-v1:0");
    }

    #[test]
    fn test_sample_prompt_carries_compliance_checklist() {
        let payload = build_recommendation("Summarize KYC rules", &[], status());
        let sample = &payload.candidate_models[0].sample_prompt;
        assert!(sample.starts_with("Summarize KYC rules"));
        assert!(sample.contains("guardrails and risks"));
        assert!(sample.contains("regulatory obligations"));
        assert!(sample.contains("QA steps"));
    }

    #[test]
    fn test_each_slot_has_two_policy_notes_and_reasoning() {
        let ranked = vec![candidate("amazon.titan-text-express-v1", "Titan Text")];
        let payload = build_recommendation("prompt", &ranked, status());
        for slot in &payload.candidate_models {
            assert_eq!(slot.policy_notes.len(), 2);
            assert!(!slot.reasoning.is_empty());
        }
        assert!(payload.candidate_models[0].reasoning.contains("amazon"));
        assert!(payload.candidate_models[0].reasoning.contains("speed"));
    }

    #[test]
    fn test_recommended_model_is_first_slot() {
        let payload = build_recommendation("prompt", &[], status());
        assert_eq!(
            payload.recommended_model.model_id,
            payload.candidate_models[0].model_id
        );
    }

    #[test]
    fn test_governance_notes_record_fallback_and_error() {
        let payload = build_recommendation(
            "prompt",
            &[],
            BedrockStatus {
                catalog_count: 0,
                error: Some("connection refused".to_string()),
            },
        );
        assert!(payload.governance_notes[0].contains("Heuristic fallback"));
        assert!(payload
            .governance_notes
            .iter()
            .any(|n| n.contains("connection refused")));
        assert_eq!(
            payload.bedrock_status.unwrap().error.as_deref(),
            Some("connection refused")
        );
    }

    #[test]
    fn test_evaluation_has_exactly_two_top_models() {
        for len in [0usize, 1, 2, 5] {
            let ranked: Vec<Candidate> = (0..len)
                .map(|i| candidate(&format!("cohere.command-{i}"), &format!("Command {i}")))
                .collect();
            let payload = build_evaluation(&ranked, None);
            assert_eq!(payload.top_models.len(), 2, "input length {len}");
            assert_eq!(payload.top_models[0].relative_rank, 1);
            assert_eq!(payload.top_models[1].relative_rank, 2);
        }
    }

    #[test]
    fn test_evaluation_fallback_is_cautious() {
        let payload = build_evaluation(&[], Some("timeout"));
        assert_eq!(payload.verdict, Verdict::Caution);
        assert!(payload.risks.iter().any(|r| r.contains("timeout")));
        assert!(!payload.suggestions.is_empty());
        assert_eq!(
            payload.recommended_model.model_id,
            payload.top_models[0].model_id
        );
    }
}
