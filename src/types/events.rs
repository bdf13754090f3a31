use bmcore::error::ErrorRedirect;
use bmcore::types::{ChatId, Message, Username};
use std::sync::Arc;
use tokio::sync::broadcast;

// The size of the broadcast channel buffer.
const CHANNEL_CAPACITY: usize = 100;

/// The live feed came up.
#[derive(Debug, Clone)]
pub struct Connected;

/// The live feed went away (expected or not).
#[derive(Debug, Clone)]
pub struct Disconnected;

/// A request was rejected with 401; the session should return to login.
#[derive(Debug, Clone)]
pub struct AuthRequired;

/// A placeholder conversation received its server-assigned id.
#[derive(Debug, Clone)]
pub struct ConversationPromoted {
    pub id: ChatId,
    pub other: Username,
}

// Macro to generate EventBus fields and constructor
macro_rules! define_event_bus {
    ($(($field:ident, $type:ty)),* $(,)?) => {
        /// Typed event bus that provides separate broadcast channels for each event type.
        #[derive(Debug)]
        pub struct EventBus {
            $(
                pub $field: broadcast::Sender<$type>,
            )*
        }

        impl EventBus {
            pub fn new() -> Self {
                Self {
                    $(
                        $field: broadcast::channel(CHANNEL_CAPACITY).0,
                    )*
                }
            }
        }
    };
}

define_event_bus! {
    // Connection events
    (connected, Arc<Connected>),
    (disconnected, Arc<Disconnected>),

    // Chat events
    (message, Arc<Message>),
    (conversation_promoted, Arc<ConversationPromoted>),

    // Error events
    (auth_required, Arc<AuthRequired>),
    (error_redirect, Arc<ErrorRedirect>),
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
