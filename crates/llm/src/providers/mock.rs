use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::ModelRuntime;
use crate::types::SamplingParams;

/// One call observed by [`RecordingRuntime`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub params: SamplingParams,
}

/// Runtime that answers every prompt with a fixed reply and keeps the prompts.
pub struct RecordingRuntime {
    reply: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingRuntime {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|c| c.prompt.clone())
    }
}

#[async_trait]
impl ModelRuntime for RecordingRuntime {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            params: params.clone(),
        });
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Runtime whose every call fails.
pub struct FailingRuntime {
    message: String,
}

impl FailingRuntime {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[async_trait]
impl ModelRuntime for FailingRuntime {
    async fn complete(&self, _prompt: &str, _params: &SamplingParams) -> Result<String> {
        Err(anyhow!(self.message.clone()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
