use std::fmt;

use chrono::{DateTime, Utc};
use protocol::{EntryKind, HistoryEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// One transcript line. Never modified after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    text: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new<S: Into<String>>(role: Role, text: S) -> Self {
        Self {
            id: MessageId::new(),
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user<S: Into<String>>(text: S) -> Self {
        Self::new(Role::User, text)
    }

    pub fn bot<S: Into<String>>(text: S) -> Self {
        Self::new(Role::Bot, text)
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl From<&Message> for HistoryEntry {
    fn from(msg: &Message) -> Self {
        HistoryEntry {
            id: msg.id.to_string(),
            kind: match msg.role {
                Role::User => EntryKind::User,
                Role::Bot => EntryKind::Bot,
            },
            message: msg.text.clone(),
            timestamp: msg.created_at.to_rfc3339(),
        }
    }
}
