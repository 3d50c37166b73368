use std::sync::Arc;

use anyhow::{bail, Result};
use chat_core::ResponseGenerator;
use llm::{LlamaServer, ModelConfig, ModelFile, ModelRuntime};
use protocol::ModelStatus;
use tracing::{error, info, warn};

/// Pre-flight check of the model artifact.
///
/// A missing file only aborts startup when `strict` is set; otherwise the
/// server runs and answers every chat with the "model unavailable" reply.
pub fn check_model_file(config: &ModelConfig, strict: bool) -> Result<()> {
    if config.server_url.is_some() {
        info!(url = %config.base_url(), "using external llama-server, skipping model file check");
        return Ok(());
    }

    match ModelFile::inspect(&config.model_path) {
        Ok(file) => {
            info!("Model file found: {:.1} GB", file.size_gb());
            Ok(())
        }
        Err(e) if strict => bail!("{:#}", e),
        Err(e) => {
            warn!(
                "{:#}. Download mistral-7b-instruct-v0.1.Q4_K_M.gguf (e.g. from \
                 https://huggingface.co/TheBloke/Mistral-7B-Instruct-v0.1-GGUF) into models/",
                e
            );
            Ok(())
        }
    }
}

/// Bring up the model runtime. Failure leaves the server without a model
/// instead of aborting.
pub async fn load_model(config: &ModelConfig) -> (ResponseGenerator, ModelStatus) {
    match LlamaServer::load(config).await {
        Ok(server) => {
            info!(url = %server.base_url(), "Model loaded successfully");
            let status = ModelStatus::Loaded {
                model_path: config.model_path.display().to_string(),
                context_window: config.context_window,
                threads: config.threads,
                runtime: server.name().to_string(),
            };
            (ResponseGenerator::new(Arc::new(server)), status)
        }
        Err(e) => {
            error!("Failed to load model: {:#}", e);
            let status = ModelStatus::NotLoaded {
                error: "Model failed to load".to_string(),
            };
            (ResponseGenerator::unavailable(), status)
        }
    }
}
