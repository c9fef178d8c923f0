//! LLM client factory.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::llm::anthropic::Anthropic;
use crate::adapter::outbound::llm::openai::OpenAi;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::llm::{LlmConfig, LlmProvider};
use crate::port::outbound::llm::Llm;

/// Build the configured LLM client, reading its API key from the environment.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] naming the environment variable
/// when the provider's API key is not set.
pub fn build_llm_client(config: &LlmConfig) -> Result<Arc<dyn Llm>> {
    build_llm_client_with(config, |var| std::env::var(var).ok())
}

/// Like [`build_llm_client`] with an explicit key lookup.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] when `lookup` has no key for the
/// provider.
pub fn build_llm_client_with(
    config: &LlmConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn Llm>> {
    let var = config.provider.api_key_var();
    let api_key = lookup(var)
        .filter(|key| !key.trim().is_empty())
        .ok_or(ConfigError::MissingField { field: var })?;
    let model = config.model();

    let client: Arc<dyn Llm> = match config.provider {
        LlmProvider::DeepSeek => {
            let client = OpenAi::deepseek(api_key, model, config.max_tokens, config.temperature);
            Arc::new(match &config.endpoint {
                Some(endpoint) => client.with_endpoint(endpoint),
                None => client,
            })
        }
        LlmProvider::OpenAi => {
            let client = OpenAi::new(api_key, model, config.max_tokens, config.temperature);
            Arc::new(match &config.endpoint {
                Some(endpoint) => client.with_endpoint(endpoint),
                None => client,
            })
        }
        LlmProvider::Anthropic => {
            let client = Anthropic::new(api_key, model, config.max_tokens, config.temperature);
            Arc::new(match &config.endpoint {
                Some(endpoint) => client.with_endpoint(endpoint),
                None => client,
            })
        }
    };

    info!(provider = client.name(), model, "LLM client initialized");
    Ok(client)
}
