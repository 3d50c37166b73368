pub mod message;
pub mod store;

pub use message::{Message, MessageId, Role};
pub use store::{Session, SessionId, SessionStore};
