//! The text-completion seam every pipeline stage calls through.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GatewayResult;

/// `(system prompt, user prompt) -> text`.
///
/// Implementations own their retry/backoff/timeout behaviour; callers only
/// see the final outcome.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> GatewayResult<String>;

    /// Short label for logs.
    fn describe(&self) -> String {
        "model".to_string()
    }
}

#[async_trait]
impl<G: ModelGateway + ?Sized> ModelGateway for Arc<G> {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> GatewayResult<String> {
        (**self).complete(system_prompt, user_prompt).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
