//! OpenAI-compatible chat client.
//!
//! Implements the [`Llm`] trait for the Chat Completions API. DeepSeek
//! speaks the same protocol, so the same client serves both with a
//! different endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::adapter::outbound::http::check_status;
use crate::error::{ProviderError, Result};
use crate::port::outbound::llm::Llm;

/// OpenAI Chat Completions API endpoint.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// DeepSeek Chat Completions API endpoint.
pub const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/chat/completions";

/// OpenAI-compatible API client.
#[derive(Debug)]
pub struct OpenAi {
    /// HTTP client for API requests.
    client: Client,
    /// Provider label used in logs and errors.
    name: &'static str,
    endpoint: String,
    api_key: String,
    /// Model identifier (e.g., "gpt-4o-mini", "deepseek-reasoner").
    model: String,
    /// Maximum tokens to generate in the response.
    max_tokens: usize,
    /// Sampling temperature (0.0 to 2.0).
    temperature: f64,
}

impl OpenAi {
    /// Create an OpenAI client with explicit configuration.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: usize,
        temperature: f64,
    ) -> Self {
        Self {
            client: Client::new(),
            name: "openai",
            endpoint: OPENAI_API_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
            temperature,
        }
    }

    /// Create a DeepSeek client.
    #[must_use]
    pub fn deepseek(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: usize,
        temperature: f64,
    ) -> Self {
        Self {
            name: "deepseek",
            endpoint: DEEPSEEK_API_URL.to_string(),
            ..Self::new(api_key, model, max_tokens, temperature)
        }
    }

    /// Point the client at a different compatible endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: usize,
    temperature: f64,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct Response {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl Response {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
    }
}

#[async_trait]
impl Llm for OpenAi {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = Request {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = check_status(self.name, response)
            .await?
            .json::<Response>()
            .await?;

        response
            .into_text()
            .ok_or_else(|| ProviderError::EmptyResponse { provider: self.name }.into())
    }
}
