//! LLM adapter modules.
//!
//! Provides implementations of the [`Llm`](crate::port::outbound::llm::Llm) trait
//! for OpenAI-compatible chat endpoints (OpenAI, DeepSeek) and Anthropic.

pub mod anthropic;
pub mod openai;
