use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::Key;
use chat_core::ChatCore;
use protocol::ModelStatus;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::error::panic_response;
use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub core: Arc<ChatCore>,
    pub model: Arc<ModelStatus>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(core: ChatCore, model: ModelStatus, cookie_key: Key) -> Self {
        Self {
            core: Arc::new(core),
            model: Arc::new(model),
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/chat", post(handlers::chat))
        .route("/api/history", get(handlers::history))
        .route("/api/clear", post(handlers::clear))
        .route("/api/health", get(handlers::health))
        .route("/api/model", get(handlers::model_info))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
