use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client as Http;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::model_file::ModelFile;
use crate::traits::ModelRuntime;
use crate::types::{ModelConfig, SamplingParams};

const HEALTH_POLL: Duration = Duration::from_millis(500);

/// Model runtime backed by a llama.cpp `llama-server` process.
///
/// The server either already runs somewhere (`connect`) or is started from the
/// configured model file (`launch`). A launched process is killed when this
/// value is dropped.
pub struct LlamaServer {
    http: Http,
    base_url: String,
    _child: Option<Child>,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    top_p: f32,
    stop: &'a [String],
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

impl LlamaServer {
    /// Connect or launch depending on whether `config.server_url` is set.
    pub async fn load(config: &ModelConfig) -> Result<Self> {
        match config.server_url {
            Some(_) => Self::connect(&config.base_url(), config.load_timeout).await,
            None => Self::launch(config).await,
        }
    }

    /// Attach to a running server and wait until it reports healthy.
    pub async fn connect(base_url: &str, timeout: Duration) -> Result<Self> {
        let server = Self {
            http: Self::http()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            _child: None,
        };
        server.wait_ready(timeout, None).await?;
        info!(url = %server.base_url, "connected to llama-server");
        Ok(server)
    }

    /// Start `llama-server` on the configured model file.
    pub async fn launch(config: &ModelConfig) -> Result<Self> {
        let model = ModelFile::inspect(&config.model_path)?;
        let size_gb = format!("{:.1}", model.size_gb());
        info!(
            path = %model.path.display(),
            size_gb = %size_gb,
            bin = %config.server_bin,
            "launching llama-server"
        );

        let mut cmd = Command::new(&config.server_bin);
        cmd.arg("-m")
            .arg(&model.path)
            .arg("-c")
            .arg(config.context_window.to_string())
            .arg("-t")
            .arg(config.threads.to_string())
            .arg("-ngl")
            .arg(config.gpu_layers.to_string())
            .arg("--host")
            .arg("127.0.0.1")
            .arg("--port")
            .arg(config.server_port.to_string());

        cmd.stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to start {}", config.server_bin))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "llm::llama_server", "{}", line);
                }
            });
        }

        let mut server = Self {
            http: Self::http()?,
            base_url: config.base_url(),
            _child: None,
        };
        server.wait_ready(config.load_timeout, Some(&mut child)).await?;
        server._child = Some(child);
        info!(url = %server.base_url, "llama-server ready");
        Ok(server)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn http() -> Result<Http> {
        Ok(Http::builder().pool_max_idle_per_host(8).build()?)
    }

    async fn wait_ready(&self, timeout: Duration, mut child: Option<&mut Child>) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let start = Instant::now();
        loop {
            if let Some(child) = child.as_mut() {
                if let Some(status) = child.try_wait()? {
                    bail!("llama-server exited during startup ({})", status);
                }
            }
            match self.http.get(&url).send().await {
                Ok(r) if r.status().is_success() => return Ok(()),
                // 503 while the model is still loading
                Ok(r) => debug!(status = %r.status(), "llama-server not ready"),
                Err(e) => debug!(error = %e, "llama-server unreachable"),
            }
            if start.elapsed() >= timeout {
                bail!("timed out after {:?} waiting for {}", timeout, url);
            }
            sleep(HEALTH_POLL).await;
        }
    }
}

#[async_trait]
impl ModelRuntime for LlamaServer {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String> {
        let url = format!("{}/completion", self.base_url);
        let body = CompletionRequest {
            prompt,
            n_predict: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stop: &params.stop,
            stream: false,
        };

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .context("request failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!(
                "llama-server {}: {}",
                status,
                resp.text().await.unwrap_or_default()
            ));
        }

        let out: CompletionResponse = resp.json().await.context("invalid json")?;
        Ok(out.content)
    }

    fn name(&self) -> &str {
        "llama.cpp"
    }
}
