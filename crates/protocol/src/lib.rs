use serde::{Deserialize, Serialize};

/// Error text returned when a chat message is blank after trimming.
pub const EMPTY_MESSAGE_ERROR: &str = "Message cannot be empty";

/// Value of `status` in a health response.
pub const HEALTHY: &str = "healthy";

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { message: Some(message.into()) }
    }

    /// The message with surrounding whitespace removed, or `None` when nothing is left.
    pub fn trimmed(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Successful reply to `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub success: bool,
    pub response: String,
    pub message_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `{"success": true}` acknowledgement (used by `POST /api/clear`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub messages: Vec<HistoryEntry>,
}

/// One transcript line as the browser sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub message: String,
    pub timestamp: String, // ISO-8601
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Body of `GET /api/model`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelStatus {
    Loaded {
        model_path: String,
        context_window: u32,
        threads: u32,
        runtime: String,
    },
    NotLoaded {
        error: String,
    },
}

impl ModelStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelStatus::Loaded { .. })
    }
}
