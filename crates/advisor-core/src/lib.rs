//! # advisor-core
//!
//! Deterministic model-recommendation pipeline for compliance-sensitive
//! workloads.
//!
//! This crate turns heterogeneous model-catalog records and free-form (often
//! malformed) LLM output into complete, schema-valid recommendation and
//! evaluation payloads. It answers:
//! - Which candidate models fit this workload, in what order?
//! - What do we return when the model backend is down or its output is junk?
//!
//! ## Key Guarantees
//!
//! 1. **Total**: every request produces a schema-complete payload; no error
//!    kind in this crate is fatal to the caller
//! 2. **Deterministic**: the normalizer, ranker, and fallback synthesizer
//!    use only catalog data and fixed lookup tables
//! 3. **Observable**: degradations are recorded as advisory text in
//!    `governance_notes` / `bedrock_status`, never silently discarded
//! 4. **Share-nothing**: payloads are request-scoped; the curated catalog
//!    and provider-rank table are immutable process-wide constants
//!
//! ## Example
//!
//! ```rust,ignore
//! use advisor_core::{recommend, ModelReply, SelectionRequest};
//!
//! let reply = ModelReply::from_text(llm_output);
//! let payload = recommend(&SelectionRequest {
//!     prompt: "Draft a customer onboarding assistant for EU banking.",
//!     attribute_records: &attribute_docs,
//!     provider_listing: &catalog_listing,
//!     reply: &reply,
//! });
//! assert_eq!(payload.candidate_models.len(), 3);
//! ```

pub mod catalog;
pub mod extract;
pub mod fallback;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod sanitize;
pub mod types;

// Re-export main types at crate root
pub use catalog::{default_catalog, is_supported_model_id, SUPPORTED_PREFIXES};
pub use extract::extract_json_object;
pub use fallback::{build_evaluation, build_recommendation, CANDIDATE_SLOTS, TOP_MODEL_SLOTS};
pub use normalize::{normalize_all, normalize_record};
pub use pipeline::{
    judge, recommend, JudgePipeline, JudgeRequest, SelectionPipeline, SelectionRequest,
};
pub use rank::rank_candidates;
pub use sanitize::{merge_evaluation, merge_recommendation};
pub use types::{
    BedrockStatus, Candidate, CandidateRecommendation, CandidateSource, CostTier,
    EvaluationPayload, JudgePick, ModelReply, PipelineStage, RecommendationPayload,
    RecommendedModel, TokenUsage, TopModel, Verdict,
};
