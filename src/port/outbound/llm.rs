//! LLM completion port for the recommendation provider.

use async_trait::async_trait;

use crate::error::Result;

/// Client for large language model text completion.
///
/// Implementations wrap specific providers (OpenAI-compatible endpoints,
/// Anthropic) and classify HTTP failures into
/// [`ProviderError`](crate::error::ProviderError) so callers can tell
/// retryable failures from permanent ones.
///
/// Timeouts are enforced by the caller, not the implementation.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Return the provider name for logging.
    fn name(&self) -> &'static str;

    /// Send a completion request and return the generated text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider returns an
    /// error status.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
