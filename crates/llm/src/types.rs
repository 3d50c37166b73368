use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Sampling configuration passed with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stop: Vec<String>,
}

/// How to obtain a model runtime.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// GGUF model artifact on disk.
    pub model_path: PathBuf,
    pub context_window: u32,
    pub threads: u32,
    pub gpu_layers: u32,
    /// Use an already running llama.cpp server instead of launching one.
    pub server_url: Option<String>,
    /// Binary launched when `server_url` is unset.
    pub server_bin: String,
    pub server_port: u16,
    pub load_timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/mistral-7b-instruct-v0.1.Q4_K_M.gguf"),
            context_window: 2048,
            threads: 4,
            gpu_layers: 0,
            server_url: None,
            server_bin: "llama-server".to_string(),
            server_port: 8081,
            load_timeout: Duration::from_secs(120),
        }
    }
}

impl ModelConfig {
    /// Base URL the runtime is reachable at once loaded.
    pub fn base_url(&self) -> String {
        match &self.server_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://127.0.0.1:{}", self.server_port),
        }
    }
}
