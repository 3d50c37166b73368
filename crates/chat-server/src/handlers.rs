use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    Json,
};
use axum_extra::extract::cookie::SignedCookieJar;
use chrono::Utc;
use protocol::{
    Ack, ChatReply, ChatRequest, HealthResponse, HistoryEntry, HistoryResponse, ModelStatus,
    HEALTHY,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::session::{session_from, with_session};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Chat page. Makes sure the browser carries a session cookie.
pub async fn index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Html<&'static str>) {
    let (id, _) = state.core.store().get_or_create(session_from(&jar)).await;
    (with_session(jar, id), Html(INDEX_HTML))
}

pub async fn chat(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<(SignedCookieJar, Json<ChatReply>), ApiError> {
    let Json(request) = payload?;
    let text = request.trimmed().ok_or(ApiError::EmptyMessage)?;

    let turn = state.core.chat(session_from(&jar), text).await;

    let reply = ChatReply {
        success: true,
        response: turn.reply.into_text(),
        message_id: turn.message_id.to_string(),
    };
    Ok((with_session(jar, turn.session_id), Json(reply)))
}

pub async fn history(State(state): State<AppState>, jar: SignedCookieJar) -> Json<HistoryResponse> {
    let messages = match session_from(&jar) {
        Some(id) => state.core.store().list(id).await,
        None => Vec::new(),
    };
    Json(HistoryResponse {
        messages: messages.iter().map(HistoryEntry::from).collect(),
    })
}

pub async fn clear(State(state): State<AppState>, jar: SignedCookieJar) -> Json<Ack> {
    if let Some(id) = session_from(&jar) {
        state.core.store().clear(id).await;
    }
    Json(Ack::ok())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTHY.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(state.model.as_ref().clone())
}
