//! Mock text generator for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use super::traits::*;

/// Mock generator for testing.
///
/// Returns a fixed response by default. Prompts containing a scripted
/// pattern get the scripted result instead, which lets a test fail one
/// rule's call while the others succeed.
pub struct MockGenerator {
    model_id: String,
    available: AtomicBool,
    response_content: String,
    scripted: Vec<(String, Result<String, LlmError>)>,
    delay: Option<Duration>,
    call_count: AtomicU32,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    /// Create a new mock generator.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            available: AtomicBool::new(true),
            response_content: "Mock response".to_string(),
            scripted: Vec::new(),
            delay: None,
            call_count: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Set the default response content.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.response_content = content.into();
        self
    }

    /// Answer prompts containing `pattern` with `content`.
    pub fn with_response_for(mut self, pattern: impl Into<String>, content: impl Into<String>) -> Self {
        self.scripted.push((pattern.into(), Ok(content.into())));
        self
    }

    /// Fail prompts containing `pattern` with `error`.
    pub fn with_error_for(mut self, pattern: impl Into<String>, error: LlmError) -> Self {
        self.scripted.push((pattern.into(), Err(error)));
        self
    }

    /// Sleep before answering. Works with tokio's paused clock.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Get the number of times generate was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(request.prompt.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if !self.available.load(Ordering::SeqCst) {
            return Err(LlmError::Unavailable("Mock generator disabled".to_string()));
        }

        let scripted = self
            .scripted
            .iter()
            .find(|(pattern, _)| request.prompt.contains(pattern.as_str()));

        match scripted {
            Some((_, result)) => result.clone(),
            None => Ok(self.response_content.clone()),
        }
    }
}
