//! Curated default catalog and provider lookup tables.
//!
//! These are process-wide, read-only constants initialized once at startup.
//! Concurrent requests read them without locking; nothing here is mutated
//! after initialization.

use lazy_static::lazy_static;
use std::collections::BTreeSet;

use crate::types::{Candidate, CandidateSource, CostTier};

/// Provider namespace prefixes the ranker treats as eligible.
pub const SUPPORTED_PREFIXES: &[&str] = &[
    "anthropic.",
    "meta.",
    "mistral.",
    "amazon.",
    "cohere.",
    "ai21.",
];

fn curated(
    id: &str,
    name: &str,
    provider: &str,
    cost: CostTier,
    strengths: &[&str],
    tags: &[&str],
) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: name.to_string(),
        summary: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        category: None,
        cost: Some(cost),
        strengths: strengths.iter().map(|s| s.to_string()).collect(),
        score: None,
        provider: Some(provider.to_string()),
        source: CandidateSource::Default,
    }
}

lazy_static! {
    /// Small fixed list of known-good model entries, used for identity
    /// resolution in the normalizer and as the seed of last resort in the
    /// ranker and fallback synthesizer. Curated order is ranking order.
    pub static ref DEFAULT_CATALOG: Vec<Candidate> = vec![
        curated(
            "anthropic.claude-3-sonnet-20240229-v1:0",
            "Claude 3 Sonnet",
            "anthropic",
            CostTier::High,
            &["compliance reasoning", "structured output"],
            &["compliance", "structured-output", "reasoning"],
        ),
        curated(
            "meta.llama3-70b-instruct-v1:0",
            "Llama3 70B Instruct",
            "meta",
            CostTier::Medium,
            &["general generation", "multilingual"],
            &["general", "multilingual"],
        ),
        curated(
            "mistral.mixtral-8x7b-instruct-v0:1",
            "Mixtral 8x7B",
            "mistral",
            CostTier::Medium,
            &["fast iteration", "good judge"],
            &["fast", "judge"],
        ),
    ];
}

/// Fixed provider reputation table. Unknown or missing providers rank 0.
const PROVIDER_RANKS: &[(&str, u8)] = &[
    ("anthropic", 3),
    ("meta", 2),
    ("mistral", 2),
    ("amazon", 1),
    ("cohere", 1),
    ("ai21", 1),
];

/// The curated default catalog, in curated ranking order.
pub fn default_catalog() -> &'static [Candidate] {
    &DEFAULT_CATALOG
}

/// Whether an id carries a recognized provider-namespace prefix.
pub fn is_supported_model_id(id: &str) -> bool {
    SUPPORTED_PREFIXES.iter().any(|p| id.starts_with(p))
}

/// Reputation rank of a provider name; missing providers rank 0.
pub fn provider_rank(provider: Option<&str>) -> u8 {
    let Some(provider) = provider else { return 0 };
    let provider = provider.to_ascii_lowercase();
    PROVIDER_RANKS
        .iter()
        .find(|(name, _)| *name == provider)
        .map(|(_, rank)| *rank)
        .unwrap_or(0)
}

/// Position of an id in the curated catalog, if it is a curated entry.
pub fn curated_position(id: &str) -> Option<usize> {
    DEFAULT_CATALOG.iter().position(|c| c.id == id)
}

/// Resolve a record against the curated catalog: exact id match first,
/// then case-insensitive name match, then any overlapping tag.
pub fn find_default(
    id: Option<&str>,
    name: Option<&str>,
    tags: &BTreeSet<String>,
) -> Option<&'static Candidate> {
    if let Some(id) = id {
        if let Some(entry) = DEFAULT_CATALOG.iter().find(|c| c.id == id) {
            return Some(entry);
        }
    }

    if let Some(name) = name {
        let needle = name.trim().to_ascii_lowercase();
        if let Some(entry) = DEFAULT_CATALOG
            .iter()
            .find(|c| c.name.to_ascii_lowercase() == needle)
        {
            return Some(entry);
        }
    }

    if !tags.is_empty() {
        let lowered: BTreeSet<String> = tags.iter().map(|t| t.to_ascii_lowercase()).collect();
        return DEFAULT_CATALOG
            .iter()
            .find(|c| c.tags.iter().any(|t| lowered.contains(&t.to_ascii_lowercase())));
    }

    None
}
