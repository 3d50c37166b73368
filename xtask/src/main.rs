use anyhow::{Context, Result};
use llm::{ModelConfig, ModelFile};
use serde_json::{json, Value};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{sleep, Duration};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [cmd, ..] if cmd == "doctor" => doctor(),
        [cmd, rest @ ..] if cmd == "e2e" => e2e(rest).await,
        _ => {
            eprintln!("Usage: cargo run -p xtask -- doctor | e2e [--port N] [--text '...']");
            Ok(())
        }
    }
}

/// Prerequisite checks before starting the chat server.
fn doctor() -> Result<()> {
    println!("\x1b[36m[doctor]\x1b[0m Checking prerequisites…");
    let mut ok = true;

    let external = std::env::var("LLAMA_SERVER_URL").ok();
    match &external {
        Some(url) => println!("  ✔ using external llama-server at {}", url),
        None => {
            let bin = std::env::var("LLAMA_SERVER_BIN").unwrap_or_else(|_| "llama-server".to_string());
            match which::which(&bin) {
                Ok(path) => println!("  ✔ {} found at {}", bin, path.display()),
                Err(_) => {
                    println!("  ✘ {} not found on PATH (build llama.cpp or set LLAMA_SERVER_BIN)", bin);
                    ok = false;
                }
            }
        }
    }

    if external.is_none() {
        let model = std::env::var("MODEL_PATH")
            .map(Into::into)
            .unwrap_or_else(|_| ModelConfig::default().model_path);
        match ModelFile::inspect(&model) {
            Ok(file) => println!("  ✔ model file found: {:.1} GB", file.size_gb()),
            Err(e) => {
                println!("  ✘ {:#}", e);
                println!("    download mistral-7b-instruct-v0.1.Q4_K_M.gguf from");
                println!("    https://huggingface.co/TheBloke/Mistral-7B-Instruct-v0.1-GGUF into models/");
                ok = false;
            }
        }
    }

    if !ok {
        anyhow::bail!("prerequisites missing");
    }
    println!("\x1b[32mDOCTOR PASS\x1b[0m");
    Ok(())
}

async fn e2e(args: &[String]) -> Result<()> {
    let port = flag(args, "--port").unwrap_or_else(|| "5055".to_string());
    let text = flag(args, "--text").unwrap_or_else(|| "Merhaba".to_string());
    let base = format!("http://127.0.0.1:{}", port);

    println!("\x1b[36m[e2e]\x1b[0m Building workspace (warnings as errors)…");
    let mut build = Command::new("cargo")
        .arg("build").arg("--workspace")
        .env("RUSTFLAGS", "-D warnings")
        .stdout(Stdio::inherit()).stderr(Stdio::inherit())
        .spawn()?;
    let status = build.wait().await?;
    if !status.success() { anyhow::bail!("build failed"); }

    println!("\x1b[36m[e2e]\x1b[0m Starting chat-server on port {}…", port);
    let mut server = Command::new("cargo")
        .arg("run").arg("-p").arg("chat-server")
        .env("PORT", &port)
        .env("HOST", "127.0.0.1")
        .stdout(Stdio::inherit()).stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn().context("spawn chat-server")?;

    let health = format!("{}/api/health", base);
    println!("\x1b[36m[e2e]\x1b[0m Waiting for health: {}", &health);
    if let Err(e) = wait_health(&health, Duration::from_secs(300)).await {
        let _ = server.start_kill();
        return Err(e).context("chat-server health");
    }

    let result = scenario(&base, &text).await;
    let _ = server.start_kill();
    result?;

    println!("\x1b[32mE2E PASS\x1b[0m");
    Ok(())
}

/// One chat turn on a fresh session, then check the stored history.
async fn scenario(base: &str, text: &str) -> Result<()> {
    let client = reqwest::Client::builder().cookie_store(true).build()?;

    println!("\x1b[36m[e2e]\x1b[0m POST /api/chat {:?}", text);
    let resp = client.post(format!("{}/api/chat", base))
        .json(&json!({ "message": text }))
        .send().await?;
    if resp.status() != 200 { anyhow::bail!("chat status {}", resp.status()); }
    let body: Value = resp.json().await?;
    let reply = body["response"].as_str().unwrap_or_default();
    if body["success"] != true || reply.is_empty() { anyhow::bail!("unexpected chat body {}", body); }
    println!("\x1b[36m[e2e]\x1b[0m reply: {}", reply);

    let history: Value = client.get(format!("{}/api/history", base)).send().await?.json().await?;
    let messages = history["messages"].as_array().cloned().unwrap_or_default();
    if messages.len() != 2 { anyhow::bail!("expected 2 history messages, got {}", messages.len()); }
    if messages[0]["type"] != "user" || messages[0]["message"] != text { anyhow::bail!("bad user entry {}", messages[0]); }
    if messages[1]["type"] != "bot" { anyhow::bail!("bad bot entry {}", messages[1]); }

    let blank = client.post(format!("{}/api/chat", base))
        .json(&json!({ "message": "   " }))
        .send().await?;
    if blank.status() != 400 { anyhow::bail!("blank message returned {}", blank.status()); }
    Ok(())
}

fn flag(args: &[String], name: &str) -> Option<String> {
    args.iter().skip_while(|s| *s != name).nth(1).cloned()
}

async fn wait_health(url: &str, timeout_total: Duration) -> Result<()> {
    let client = reqwest::Client::new();
    let start = tokio::time::Instant::now();
    loop {
        if start.elapsed() > timeout_total { anyhow::bail!("timeout waiting health"); }
        match client.get(url).send().await {
            Ok(r) if r.status().is_success() => return Ok(()),
            _ => sleep(Duration::from_millis(300)).await,
        }
    }
}
