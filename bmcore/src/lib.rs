pub mod confirm;
pub mod error;
pub mod fetch;
pub mod net;
pub mod state;
pub mod types;
