use anyhow::Result;
use chat_core::{ChatCore, SessionStore};
use chat_server::{router, startup, AppState, Config};
use clap::Parser;
use dotenvy::dotenv;
use std::env;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "chat_server=info,chat_core=info,llm=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let model_config = config.model_config();

    startup::check_model_file(&model_config, config.strict_startup)?;
    let cookie_key = config.cookie_key()?;

    let (generator, model) = startup::load_model(&model_config).await;
    let state = AppState::new(ChatCore::new(SessionStore::new(), generator), model, cookie_key);
    let app = router(state, &config.static_dir);

    let addr = config.addr();
    info!("Server listening on {}", addr);
    info!("Open http://localhost:{} in a browser", addr.port());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Chat server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
