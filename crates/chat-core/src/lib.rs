pub mod generator;
pub mod prompt;
pub mod session;

pub use generator::{Fallback, Reply, ResponseGenerator};
pub use session::{Message, MessageId, Role, Session, SessionId, SessionStore};

use tracing::{debug, info};

/// Result of one chat exchange.
#[derive(Debug, Clone)]
pub struct Turn {
    pub session_id: SessionId,
    pub reply: Reply,
    /// Id of the stored bot message.
    pub message_id: MessageId,
}

/// Headless chat core: session bookkeeping around the response generator.
pub struct ChatCore {
    store: SessionStore,
    generator: ResponseGenerator,
}

impl ChatCore {
    pub fn new(store: SessionStore, generator: ResponseGenerator) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Record `text` as a user message, generate the reply and record it.
    ///
    /// `text` must be trimmed and non-empty. An absent or unknown `session`
    /// starts a new one; the id actually used is returned in the [`Turn`].
    ///
    /// If the session is cleared while the model runs, the reply is still
    /// returned but not stored, so the transcript never starts with a bot
    /// message.
    pub async fn chat(&self, session: Option<SessionId>, text: &str) -> Turn {
        let (session_id, session) = self.store.get_or_create(session).await;
        let _turn = session.begin_turn().await;

        // Context is what came before this message.
        let history = session.messages().await;
        let epoch = session.push(Message::user(text)).await;

        let reply = self.generator.generate(text, &history).await;

        let bot = Message::bot(reply.text());
        let message_id = bot.id();
        if !session.push_in_epoch(bot, epoch).await {
            debug!(session = %session_id, "session cleared during turn, reply not stored");
        }

        info!(
            session = %session_id,
            fallback = reply.is_fallback(),
            history = history.len(),
            "chat turn complete"
        );

        Turn {
            session_id,
            reply,
            message_id,
        }
    }
}
