//! Response sanitization and merging.
//!
//! Reconciles a parsed-but-possibly-incomplete model response against the
//! fallback payload, field by field. The key property is per-field merging,
//! never whole-object fallback: a response missing only `governance_notes`
//! keeps its good `candidate_models` and only backfills the missing field.
//!
//! Field-level repairs are recorded as diagnostic notes in the payload so
//! reviewers can see why a fallback value was substituted. Reply-level
//! diagnostics (unreachable backend, unparseable text) belong to the
//! pipeline, which sees the raw reply.

use serde_json::{Map, Value};

use crate::types::{
    CandidateRecommendation, EvaluationPayload, JudgePick, RecommendationPayload,
    RecommendedModel, TopModel, Verdict,
};

pub(crate) const NOTE_NON_LIST_CANDIDATES: &str =
    "Model returned a non-list candidate_models value; the fallback slate was kept.";
pub(crate) const NOTE_NON_DICT_RECOMMENDED: &str =
    "Model returned a non-dict recommended_model value; it was derived from the top candidate.";

/// Non-empty trimmed string field.
fn str_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A list field, accepted only when it actually is a list; string elements
/// are kept, anything else inside is dropped.
fn string_list(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match map.get(key) {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

fn merge_candidate_slot(
    extracted: Option<&Value>,
    fallback: &CandidateRecommendation,
) -> CandidateRecommendation {
    let Some(Value::Object(slot)) = extracted else {
        return fallback.clone();
    };
    CandidateRecommendation {
        model_id: str_field(slot, "model_id").unwrap_or_else(|| fallback.model_id.clone()),
        model_name: str_field(slot, "model_name").unwrap_or_else(|| fallback.model_name.clone()),
        sample_prompt: str_field(slot, "sample_prompt")
            .unwrap_or_else(|| fallback.sample_prompt.clone()),
        reasoning: str_field(slot, "reasoning").unwrap_or_else(|| fallback.reasoning.clone()),
        policy_notes: string_list(slot, "policy_notes")
            .unwrap_or_else(|| fallback.policy_notes.clone()),
    }
}

fn derive_recommended(slot: &CandidateRecommendation) -> RecommendedModel {
    RecommendedModel {
        model_id: slot.model_id.clone(),
        model_name: slot.model_name.clone(),
        reasoning: slot.reasoning.clone(),
        alignment: "Derived from the top sanitized candidate.".to_string(),
    }
}

/// Merge an extracted selection response against the fallback payload.
///
/// Guarantees a fully-populated [`RecommendationPayload`]: `candidate_models`
/// keeps exactly the fallback's slot count (merged index-by-index), and
/// `recommended_model` is derived from the first sanitized slot whenever the
/// extracted value is missing or not a mapping. `bedrock_status` is
/// pipeline-owned and always taken from the fallback.
pub fn merge_recommendation(
    extracted: Option<Map<String, Value>>,
    fallback: RecommendationPayload,
) -> RecommendationPayload {
    let Some(map) = extracted else {
        return fallback;
    };

    let mut repairs: Vec<String> = Vec::new();

    let candidate_models: Vec<CandidateRecommendation> = match map.get("candidate_models") {
        Some(Value::Array(items)) => fallback
            .candidate_models
            .iter()
            .enumerate()
            .map(|(index, slot)| merge_candidate_slot(items.get(index), slot))
            .collect(),
        Some(_) => {
            repairs.push(NOTE_NON_LIST_CANDIDATES.to_string());
            fallback.candidate_models.clone()
        }
        None => fallback.candidate_models.clone(),
    };

    let recommended_model = match map.get("recommended_model") {
        Some(Value::Object(picked)) => RecommendedModel {
            model_id: str_field(picked, "model_id")
                .unwrap_or_else(|| fallback.recommended_model.model_id.clone()),
            model_name: str_field(picked, "model_name")
                .unwrap_or_else(|| fallback.recommended_model.model_name.clone()),
            reasoning: str_field(picked, "reasoning")
                .unwrap_or_else(|| fallback.recommended_model.reasoning.clone()),
            alignment: str_field(picked, "alignment")
                .unwrap_or_else(|| fallback.recommended_model.alignment.clone()),
        },
        Some(_) => {
            repairs.push(NOTE_NON_DICT_RECOMMENDED.to_string());
            derive_recommended(&candidate_models[0])
        }
        None => derive_recommended(&candidate_models[0]),
    };

    let mut governance_notes =
        string_list(&map, "governance_notes").unwrap_or(fallback.governance_notes);
    governance_notes.extend(repairs);

    RecommendationPayload {
        candidate_models,
        recommended_model,
        governance_notes,
        bedrock_status: fallback.bedrock_status,
    }
}

fn merge_top_slot(extracted: Option<&Value>, fallback: &TopModel, index: usize) -> TopModel {
    let rank = (index + 1) as u8;
    let Some(Value::Object(slot)) = extracted else {
        let mut kept = fallback.clone();
        kept.relative_rank = rank;
        return kept;
    };
    TopModel {
        model_id: str_field(slot, "model_id").unwrap_or_else(|| fallback.model_id.clone()),
        model_name: str_field(slot, "model_name").unwrap_or_else(|| fallback.model_name.clone()),
        rationale: str_field(slot, "rationale").unwrap_or_else(|| fallback.rationale.clone()),
        // Slot position is authoritative; whatever rank the model claimed is
        // discarded so the payload always reads 1 then 2.
        relative_rank: rank,
    }
}

/// Merge an extracted judge response against the fallback payload.
pub fn merge_evaluation(
    extracted: Option<Map<String, Value>>,
    fallback: EvaluationPayload,
) -> EvaluationPayload {
    let Some(map) = extracted else {
        return fallback;
    };

    let verdict = map
        .get("verdict")
        .and_then(Value::as_str)
        .and_then(Verdict::parse)
        .unwrap_or(fallback.verdict);

    let top_models: Vec<TopModel> = match map.get("top_models") {
        Some(Value::Array(items)) => fallback
            .top_models
            .iter()
            .enumerate()
            .map(|(index, slot)| merge_top_slot(items.get(index), slot, index))
            .collect(),
        _ => fallback.top_models.clone(),
    };

    let recommended_model = match map.get("recommended_model") {
        Some(Value::Object(picked)) => JudgePick {
            model_id: str_field(picked, "model_id")
                .unwrap_or_else(|| fallback.recommended_model.model_id.clone()),
            model_name: str_field(picked, "model_name")
                .unwrap_or_else(|| fallback.recommended_model.model_name.clone()),
            rationale: str_field(picked, "rationale")
                .unwrap_or_else(|| fallback.recommended_model.rationale.clone()),
        },
        _ => JudgePick {
            model_id: top_models[0].model_id.clone(),
            model_name: top_models[0].model_name.clone(),
            rationale: top_models[0].rationale.clone(),
        },
    };

    EvaluationPayload {
        verdict,
        risks: string_list(&map, "risks").unwrap_or(fallback.risks),
        suggestions: string_list(&map, "suggestions").unwrap_or(fallback.suggestions),
        top_models,
        recommended_model,
    }
}
