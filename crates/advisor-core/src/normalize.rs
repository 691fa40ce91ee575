//! Candidate normalization.
//!
//! Converts heterogeneous catalog and provider-listing records into the
//! uniform [`Candidate`] representation. Field names are resolved through
//! ordered alias lists; absent or malformed fields degrade to `None` / empty
//! collections. This module never rejects a record.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::catalog;
use crate::types::{Candidate, CandidateSource, CostTier};

const ID_ALIASES: &[&str] = &["model_id", "modelId", "id", "identifier"];
const NAME_ALIASES: &[&str] = &[
    "model_name",
    "modelName",
    "name",
    "title",
    "display_name",
    "displayName",
];
const SUMMARY_ALIASES: &[&str] = &["summary", "description", "body", "excerpt"];
const CATEGORY_ALIASES: &[&str] = &["category", "family", "task"];
const PROVIDER_ALIASES: &[&str] = &["provider", "providerName", "vendor"];
const COST_ALIASES: &[&str] = &["cost", "cost_tier", "budget_tier"];
const SCORE_ALIASES: &[&str] = &["score", "_score", "relevance"];
const TAG_ALIASES: &[&str] = &["tags", "keywords", "outputModalities"];
const STRENGTH_ALIASES: &[&str] = &["strengths", "capabilities"];

fn first_string(record: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_number(record: &Map<String, Value>, aliases: &[&str]) -> Option<f64> {
    aliases.iter().filter_map(|key| record.get(*key)).find_map(|value| match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn string_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn first_list(record: &Map<String, Value>, aliases: &[&str]) -> Vec<String> {
    aliases
        .iter()
        .filter_map(|key| record.get(*key))
        .map(string_items)
        .find(|items| !items.is_empty())
        .unwrap_or_default()
}

/// Derive a provider name from a provider-prefixed model id.
fn provider_from_id(id: &str) -> Option<String> {
    catalog::SUPPORTED_PREFIXES
        .iter()
        .find(|p| id.starts_with(**p))
        .map(|p| p.trim_end_matches('.').to_string())
}

/// Normalize one record into a [`Candidate`].
///
/// `index` is the record's position in its source list; it keys the synthetic
/// id assigned when no id alias resolves. When the resolved identity matches
/// a curated default (by id, case-insensitive name, or tag overlap), the
/// default's cost and strengths are inherited unless already supplied, and an
/// id without a supported provider prefix is replaced with the default's
/// canonical id.
pub fn normalize_record(record: &Value, index: usize, source: CandidateSource) -> Candidate {
    let empty = Map::new();
    let record = record.as_object().unwrap_or(&empty);

    let name = first_string(record, NAME_ALIASES);
    let tags: BTreeSet<String> = first_list(record, TAG_ALIASES).into_iter().collect();
    let provider = first_string(record, PROVIDER_ALIASES);

    let mut id = first_string(record, ID_ALIASES).unwrap_or_else(|| match &provider {
        Some(p) => format!("{}-model-{}", p.to_ascii_lowercase(), index),
        None => format!("fallback-model-{}", index),
    });

    let mut cost = first_string(record, COST_ALIASES).and_then(|c| CostTier::parse(&c));
    let mut strengths = first_list(record, STRENGTH_ALIASES);

    let default = catalog::find_default(Some(&id), name.as_deref(), &tags);
    if let Some(default) = default {
        if cost.is_none() {
            cost = default.cost;
        }
        if strengths.is_empty() {
            strengths = default.strengths.clone();
        }
        if !catalog::is_supported_model_id(&id) {
            id = default.id.clone();
        }
    }

    let name = name
        .or_else(|| default.map(|d| d.name.clone()))
        .unwrap_or_else(|| id.clone());
    let provider = provider.or_else(|| provider_from_id(&id));

    Candidate {
        id,
        name,
        summary: first_string(record, SUMMARY_ALIASES),
        tags,
        category: first_string(record, CATEGORY_ALIASES),
        cost,
        strengths,
        score: first_number(record, SCORE_ALIASES),
        provider,
        source,
    }
}

/// Normalize a whole list of records, keying synthetic ids by position.
pub fn normalize_all(records: &[Value], source: CandidateSource) -> Vec<Candidate> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_record(record, index, source))
        .collect()
}
