//! Mock provider implementation for testing.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A prompt the mock was asked to complete, with the parameters it came with.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub max_tokens: Option<i32>,
}

/// Mock text provider for testing.
///
/// Replies are consumed in order from a script; once the script is empty it
/// echoes the prompt back. Every call is recorded.
pub struct MockTextProvider {
    enabled: bool,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTextProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn push_text(self, text: impl Into<String>) -> Self {
        self.lock_script().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn push_error(self, error: ProviderError) -> Self {
        self.lock_script().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock_calls().clone()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, ProviderError>>> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        self.lock_calls().push(RecordedCall {
            prompt: prompt.to_string(),
            max_tokens: params.max_tokens,
        });

        let reply = self
            .lock_script()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("Mock response for: {}", prompt)));

        let text = reply?;
        Ok(ProviderResponse {
            output_tokens: text.len() as i32 / 4,
            text,
            input_tokens: prompt.len() as i32 / 4,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ))
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
