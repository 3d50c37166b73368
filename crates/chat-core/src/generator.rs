use std::sync::Arc;

use llm::ModelRuntime;
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::prompt;
use crate::session::Message;

pub const MODEL_UNAVAILABLE_REPLY: &str =
    "Üzgünüm, model yüklenemedi. Lütfen daha sonra tekrar deneyin.";
pub const GENERATION_FAILED_REPLY: &str =
    "Üzgünüm, bir hata oluştu. Lütfen daha sonra tekrar deneyin.";
pub const EMPTY_OUTPUT_REPLY: &str = "Üzgünüm, yanıt üretemedim. Lütfen tekrar deneyin.";

/// Why a canned reply was used instead of model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    ModelUnavailable,
    GenerationFailed,
    EmptyOutput,
}

impl Fallback {
    pub fn text(&self) -> &'static str {
        match self {
            Fallback::ModelUnavailable => MODEL_UNAVAILABLE_REPLY,
            Fallback::GenerationFailed => GENERATION_FAILED_REPLY,
            Fallback::EmptyOutput => EMPTY_OUTPUT_REPLY,
        }
    }
}

/// Outcome of [`ResponseGenerator::generate`]. Always carries user-facing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Generated(String),
    Fallback(Fallback),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Generated(text) => text,
            Reply::Fallback(fallback) => fallback.text(),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Reply::Generated(text) => text,
            Reply::Fallback(fallback) => fallback.text().to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Reply::Fallback(_))
    }
}

/// Turns a user message plus recent history into a model reply.
///
/// Holds the single loaded model. Calls into the runtime are serialized
/// across all sessions; model errors never escape `generate`.
pub struct ResponseGenerator {
    runtime: Option<Arc<dyn ModelRuntime>>,
    inference_slot: Mutex<()>,
}

impl ResponseGenerator {
    pub fn new(runtime: Arc<dyn ModelRuntime>) -> Self {
        Self {
            runtime: Some(runtime),
            inference_slot: Mutex::new(()),
        }
    }

    /// Generator for a model that failed to load; every reply is a fallback.
    pub fn unavailable() -> Self {
        Self {
            runtime: None,
            inference_slot: Mutex::new(()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.runtime.is_some()
    }

    pub fn runtime_name(&self) -> Option<&str> {
        self.runtime.as_deref().map(|r| r.name())
    }

    /// `user_text` must already be trimmed and non-empty.
    pub async fn generate(&self, user_text: &str, history: &[Message]) -> Reply {
        let Some(runtime) = self.runtime.as_deref() else {
            warn!("model not loaded, answering with fallback");
            return Reply::Fallback(Fallback::ModelUnavailable);
        };

        let prompt = prompt::build_prompt(history, user_text);
        let params = prompt::sampling_params();

        let raw = {
            let _slot = self.inference_slot.lock().await;
            runtime.complete(&prompt, &params).await
        };

        match raw {
            Ok(raw) => match prompt::clean_output(&raw) {
                Some(text) => Reply::Generated(text),
                None => {
                    warn!(runtime = runtime.name(), "model returned an empty reply");
                    Reply::Fallback(Fallback::EmptyOutput)
                }
            },
            Err(e) => {
                error!(runtime = runtime.name(), error = %e, "Error generating response");
                Reply::Fallback(Fallback::GenerationFailed)
            }
        }
    }
}
