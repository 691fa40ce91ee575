//! Async runtime for the model advisor.
//!
//! `advisor-core` is deliberately synchronous and deterministic; this crate
//! supplies everything around it that touches the outside world:
//!
//! - The [`ModelInvoker`] trait and its implementations, including the
//!   feature-gated Bedrock HTTP provider
//! - Per-family request/response payload shaping
//! - [`invoke_with_fallback`], which turns invocation errors into degraded
//!   replies the core pipeline absorbs
//! - The [`AdvisorOrchestrator`], tying prompt construction, invocation, and
//!   the core pipeline into the recommend / judge / benchmark operations
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use advisor_runtime::{AdvisorOrchestrator, NullInvoker, RequirementProfile};
//!
//! # async fn demo() {
//! let orchestrator = AdvisorOrchestrator::new(Arc::new(NullInvoker));
//! let payload = orchestrator
//!     .recommend(
//!         "Draft a customer onboarding assistant for EU banking.",
//!         &RequirementProfile::default(),
//!         &serde_json::json!({}),
//!         &[],
//!         &[],
//!     )
//!     .await;
//! assert_eq!(payload.candidate_models.len(), 3);
//! # }
//! ```

pub mod config;
pub mod invoke;
pub mod orchestrator;
pub mod prompts;
pub mod providers;

pub use config::RuntimeConfig;
pub use invoke::invoke_with_fallback;
pub use orchestrator::{AdvisorOrchestrator, RequirementProfile, TestRun};
pub use providers::{
    ApiCredential, CredentialSource, InvocationConfig, InvocationError, ModelInvoker, NullInvoker,
    ProviderFamily,
};

#[cfg(feature = "bedrock")]
pub use providers::BedrockProvider;
