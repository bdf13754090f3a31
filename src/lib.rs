// Re-export core modules for compatibility
pub use bmcore::{confirm, error, fetch, net, state};

// Core types are re-exported, but events (with EventBus) remain here for platform-specific functionality
pub mod types {
    pub use bmcore::types::*;
    pub mod events;
}

// Platform-specific modules remain here
pub mod api;
pub mod client;
pub mod config;
pub mod conversations;
pub mod http;
pub mod keepalive;
pub mod message;
pub mod send;
pub mod socket;
pub mod transport;
