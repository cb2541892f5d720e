use async_trait::async_trait;

use crate::session::Turn;
use crate::utils::GatewayError;

/// Core trait that every remote text-generation backend implements.
///
/// `history` never contains the in-flight utterance; it is passed separately.
/// Translating [`crate::session::Speaker`] into provider role labels is the
/// implementor's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Generate a reply to `utterance` given the prior conversation
    async fn generate(&self, history: &[Turn], utterance: &str) -> Result<String, GatewayError>;

    /// Model identifier for display
    fn name(&self) -> &str;
}

#[async_trait]
impl<G: LlmGateway + ?Sized> LlmGateway for Box<G> {
    async fn generate(&self, history: &[Turn], utterance: &str) -> Result<String, GatewayError> {
        (**self).generate(history, utterance).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
