//! Scripted `TextGenerator` double for unit tests.
//!
//! Replies are served in order; once the script runs out every call fails
//! with `LlmError::EmptyContent`. Every call is counted and its prompt kept.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{GenerateOptions, LlmError, TextGenerator};

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail,
}

#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
    options: Mutex<Vec<GenerateOptions>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// A generator that fails every call.
    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Reply::Text(t.to_string())).collect())
    }

    /// Sleeps before answering; pair with `start_paused` to test timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn options(&self) -> Vec<GenerateOptions> {
        self.options.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _system: &str,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.options.lock().unwrap().push(options);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail) | None => Err(LlmError::EmptyContent),
        }
    }
}
