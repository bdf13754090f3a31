pub mod conversation;
pub mod identity;

pub use conversation::{ChatId, Conversation, Message, MessageId, PLACEHOLDER_ID};
pub use identity::Username;
