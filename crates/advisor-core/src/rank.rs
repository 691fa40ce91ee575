//! Deterministic candidate ranking.
//!
//! Candidates are ordered by a composite key, descending preference:
//! curated-catalog membership and position, numeric score, provider
//! reputation rank, and finally name ascending as a total tiebreak.

use std::cmp::Ordering;

use crate::catalog;
use crate::types::Candidate;

/// Composite ranking comparator.
///
/// Curated entries sort first in curated order; missing scores count as 0;
/// missing providers rank 0; name ascending makes the order total.
pub(crate) fn ranking_cmp(a: &Candidate, b: &Candidate) -> Ordering {
    let curated_a = catalog::curated_position(&a.id).unwrap_or(usize::MAX);
    let curated_b = catalog::curated_position(&b.id).unwrap_or(usize::MAX);
    let score_a = a.score.unwrap_or(0.0);
    let score_b = b.score.unwrap_or(0.0);

    curated_a
        .cmp(&curated_b)
        .then_with(|| score_b.total_cmp(&score_a))
        .then_with(|| {
            catalog::provider_rank(b.provider.as_deref())
                .cmp(&catalog::provider_rank(a.provider.as_deref()))
        })
        .then_with(|| a.name.cmp(&b.name))
}

/// Deduplicate by id, preferring live-catalog entries over static attribute
/// entries when both carry the same id. Input order is otherwise preserved.
fn dedupe_prefer_live(live: &[Candidate], attributes: &[Candidate]) -> Vec<Candidate> {
    let mut merged: Vec<Candidate> = Vec::with_capacity(live.len() + attributes.len());
    for candidate in live.iter().chain(attributes.iter()) {
        if !merged.iter().any(|c| c.id == candidate.id) {
            merged.push(candidate.clone());
        }
    }
    merged
}

fn eligible(candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| catalog::is_supported_model_id(&c.id))
        .collect()
}

/// Rank the merged candidate pool.
///
/// Only ids with a recognized provider prefix are eligible. An empty eligible
/// pool falls back to the static attribute list filtered the same way, and
/// an empty result there returns the curated default catalog verbatim.
pub fn rank_candidates(live: &[Candidate], attributes: &[Candidate]) -> Vec<Candidate> {
    let mut pool = eligible(dedupe_prefer_live(live, attributes));

    if pool.is_empty() {
        pool = eligible(attributes.to_vec());
    }
    if pool.is_empty() {
        tracing::debug!("no eligible candidates; returning curated default catalog");
        return catalog::default_catalog().to_vec();
    }

    pool.sort_by(ranking_cmp);
    pool
}
