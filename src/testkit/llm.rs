//! Scripted recommendation provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::fixtures::valid_json;
use crate::error::{ProviderError, Result};
use crate::port::outbound::llm::Llm;

/// One scripted provider behavior.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(ProviderError),
    /// Never answer.
    Hang,
}

/// An [`Llm`] that plays back queued replies, then repeats a fallback.
///
/// Every call is counted, including ones that hang.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    delay: Duration,
    calls: Arc<AtomicU32>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    /// Answers every call with [`valid_json`].
    pub fn new() -> Self {
        Self::always(Reply::Text(valid_json()))
    }

    pub fn always(reply: Reply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicU32::new(0)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue `reply` ahead of the fallback.
    pub fn then(self, reply: Reply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    /// Wait `delay` before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

impl Default for ScriptedLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Llm for ScriptedLlm {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());
        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail(e) => Err(e.into()),
            Reply::Hang => std::future::pending::<Result<String>>().await,
        }
    }
}
