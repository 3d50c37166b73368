use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::debug;
use uuid::Uuid;

use super::message::Message;

/// Opaque per-browser session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Messages of a session plus a counter bumped on every clear.
#[derive(Default)]
struct Transcript {
    messages: Vec<Message>,
    epoch: u64,
}

/// Transcript of one browser session.
///
/// `transcript` guards the messages. `turn` is held for a whole chat
/// exchange so two exchanges on the same session never interleave, while
/// readers and clears only wait on `transcript`.
pub struct Session {
    id: SessionId,
    transcript: Mutex<Transcript>,
    turn: Mutex<()>,
}

impl Session {
    fn new(id: SessionId) -> Self {
        Self {
            id,
            transcript: Mutex::new(Transcript::default()),
            turn: Mutex::new(()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.transcript.lock().await.messages.clone()
    }

    pub async fn len(&self) -> usize {
        self.transcript.lock().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Wait for exclusive use of this session for one chat exchange.
    pub async fn begin_turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    /// Append and return the epoch the message landed in.
    pub(crate) async fn push(&self, message: Message) -> u64 {
        let mut transcript = self.transcript.lock().await;
        transcript.messages.push(message);
        transcript.epoch
    }

    /// Append only if no clear happened since `epoch`.
    pub(crate) async fn push_in_epoch(&self, message: Message, epoch: u64) -> bool {
        let mut transcript = self.transcript.lock().await;
        if transcript.epoch != epoch {
            return false;
        }
        transcript.messages.push(message);
        true
    }

    async fn reset(&self) {
        let mut transcript = self.transcript.lock().await;
        transcript.messages.clear();
        transcript.epoch += 1;
    }
}

/// Process-wide map of live sessions. Cheap to clone.
///
/// The outer lock is only held for lookups and inserts; every session has its
/// own locks, so work on one session never waits for another. Sessions live
/// until the process exits.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for `id`, or mint a fresh one when `id` is absent or unknown.
    pub async fn get_or_create(&self, id: Option<SessionId>) -> (SessionId, Arc<Session>) {
        if let Some(id) = id {
            if let Some(session) = self.get(id).await {
                return (id, session);
            }
        }

        let id = SessionId::new();
        let session = Arc::new(Session::new(id));
        self.sessions.write().await.insert(id, session.clone());
        debug!(session = %id, "session created");
        (id, session)
    }

    pub async fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Append to the end of the session's transcript.
    ///
    /// An unknown `id` is not an error: an empty session is created under that
    /// id first.
    pub async fn append(&self, id: SessionId, message: Message) {
        let session = match self.get(id).await {
            Some(session) => session,
            None => self
                .sessions
                .write()
                .await
                .entry(id)
                .or_insert_with(|| Arc::new(Session::new(id)))
                .clone(),
        };
        session.push(message).await;
    }

    /// Full transcript in arrival order; empty for an unknown id.
    pub async fn list(&self, id: SessionId) -> Vec<Message> {
        match self.get(id).await {
            Some(session) => session.messages().await,
            None => Vec::new(),
        }
    }

    /// Forget the transcript but keep the session id. No-op for an unknown id.
    pub async fn clear(&self, id: SessionId) {
        if let Some(session) = self.get(id).await {
            session.reset().await;
            debug!(session = %id, "session cleared");
        }
    }

    pub async fn contains(&self, id: SessionId) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
