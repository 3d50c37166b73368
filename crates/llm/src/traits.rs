use anyhow::Result;
use async_trait::async_trait;

use crate::types::SamplingParams;

/// A loaded instruction-tuned model that turns a prompt into text.
///
/// Implementations are not required to tolerate concurrent calls; callers
/// sharing one runtime between requests serialize access themselves.
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Generate a continuation of `prompt`.
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String>;

    /// Short runtime name for logs and status endpoints
    fn name(&self) -> &str;
}
