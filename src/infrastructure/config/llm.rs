//! Recommendation provider configuration.

use serde::Deserialize;

/// LLM provider configuration.
///
/// API keys are read from environment variables (`DEEPSEEK_API_KEY`,
/// `OPENAI_API_KEY` or `ANTHROPIC_API_KEY`) at runtime, never from the file.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Model identifier. Defaults per provider, see [`LlmProvider::default_model`].
    #[serde(default)]
    pub model: Option<String>,

    /// Maximum tokens in the response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Override the provider's API endpoint, e.g. for a proxy.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl LlmConfig {
    /// The configured model, or the provider default.
    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            endpoint: None,
        }
    }
}

/// LLM provider selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// DeepSeek, OpenAI-compatible API.
    #[default]
    DeepSeek,
    /// OpenAI GPT models.
    OpenAi,
    /// Anthropic Claude models.
    Anthropic,
}

impl LlmProvider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek-reasoner",
            Self::OpenAi => "gpt-4o",
            Self::Anthropic => "claude-sonnet-4-5",
        }
    }

    /// Environment variable holding the API key.
    #[must_use]
    pub const fn api_key_var(self) -> &'static str {
        match self {
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

const fn default_max_tokens() -> usize {
    3000
}

fn default_temperature() -> f64 {
    0.7
}
