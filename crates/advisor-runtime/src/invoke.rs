//! Invocation with deterministic degradation.
//!
//! Wraps a [`ModelInvoker`] call so it can never fail: an invocation error
//! becomes a degraded [`ModelReply`] carrying the error summary, which the
//! core pipeline absorbs into `bedrock_status` and `governance_notes`.

use tracing::warn;

use advisor_core::ModelReply;

use crate::providers::{InvocationConfig, ModelInvoker};

/// Invoke a model, degrading instead of erroring.
///
/// There is no retry here: a failed call transitions straight to the
/// fallback path.
pub async fn invoke_with_fallback(
    invoker: &dyn ModelInvoker,
    model_id: &str,
    prompt: &str,
    config: &InvocationConfig,
) -> ModelReply {
    match invoker.invoke(model_id, prompt, config).await {
        Ok(reply) => reply,
        Err(error) => {
            warn!(%error, model_id, provider = invoker.name(), "model invocation failed; degrading to fallback reply");
            ModelReply::degraded(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{InvocationError, NullInvoker};
    use async_trait::async_trait;

    struct ScriptedInvoker(&'static str);

    #[async_trait]
    impl ModelInvoker for ScriptedInvoker {
        async fn invoke(
            &self,
            _model_id: &str,
            _prompt: &str,
            _config: &InvocationConfig,
        ) -> Result<ModelReply, InvocationError> {
            Ok(ModelReply::from_text(self.0))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_successful_reply_passes_through() {
        let reply = invoke_with_fallback(
            &ScriptedInvoker("{\"ok\": true}"),
            "mistral.mixtral-8x7b-instruct-v0:1",
            "prompt",
            &InvocationConfig::default(),
        )
        .await;
        assert_eq!(reply.text.as_deref(), Some("{\"ok\": true}"));
        assert!(reply.error.is_none());
    }

    #[tokio::test]
    async fn test_invocation_error_becomes_degraded_reply() {
        let reply = invoke_with_fallback(
            &NullInvoker,
            "mistral.mixtral-8x7b-instruct-v0:1",
            "prompt",
            &InvocationConfig::default(),
        )
        .await;
        assert!(reply.text.is_none());
        assert!(reply.error.as_deref().unwrap().contains("offline mode"));
    }
}
