use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use axum_extra::extract::cookie::Key;
use clap::Parser;
use llm::ModelConfig;
use tracing::warn;

const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Minimum secret length accepted for deriving the cookie signing key
const MIN_SECRET_LEN: usize = 32;

/// Server settings. Every flag can also come from the environment or `.env`.
#[derive(Debug, Clone, Parser)]
#[command(name = "chat-server", about = "Web chat front end for a local instruction-tuned model")]
pub struct Config {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Secret used to sign the session cookie (at least 32 bytes)
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    #[arg(long, env = "MODEL_PATH", default_value = "models/mistral-7b-instruct-v0.1.Q4_K_M.gguf")]
    pub model_path: PathBuf,

    /// Use a llama.cpp server that is already running instead of launching one
    #[arg(long, env = "LLAMA_SERVER_URL")]
    pub llama_server_url: Option<String>,

    #[arg(long, env = "LLAMA_SERVER_BIN", default_value = "llama-server")]
    pub llama_server_bin: String,

    #[arg(long, env = "LLAMA_SERVER_PORT", default_value_t = 8081)]
    pub llama_server_port: u16,

    #[arg(long, env = "MODEL_CONTEXT_WINDOW", default_value_t = 2048)]
    pub context_window: u32,

    #[arg(long, env = "MODEL_THREADS", default_value_t = 4)]
    pub threads: u32,

    #[arg(long, env = "MODEL_GPU_LAYERS", default_value_t = 0)]
    pub gpu_layers: u32,

    #[arg(long, env = "MODEL_LOAD_TIMEOUT_SECS", default_value_t = 120)]
    pub model_load_timeout_secs: u64,

    #[arg(long, env = "STATIC_DIR", default_value = DEFAULT_STATIC_DIR)]
    pub static_dir: PathBuf,

    /// Refuse to start when the model file is missing
    #[arg(long, env = "STRICT_STARTUP")]
    pub strict_startup: bool,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            model_path: self.model_path.clone(),
            context_window: self.context_window,
            threads: self.threads,
            gpu_layers: self.gpu_layers,
            server_url: self.llama_server_url.clone(),
            server_bin: self.llama_server_bin.clone(),
            server_port: self.llama_server_port,
            load_timeout: Duration::from_secs(self.model_load_timeout_secs),
        }
    }

    /// Signing key for the session cookie.
    ///
    /// Without `SECRET_KEY` a random key is used, so browser sessions do not
    /// survive a restart.
    pub fn cookie_key(&self) -> Result<Key> {
        match &self.secret_key {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => Ok(Key::derive_from(secret.as_bytes())),
            Some(_) => bail!("SECRET_KEY must be at least {} bytes long", MIN_SECRET_LEN),
            None => {
                warn!("SECRET_KEY not set, using a random cookie key");
                Ok(Key::generate())
            }
        }
    }
}
