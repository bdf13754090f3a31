pub mod error;
pub mod feed_socket;

pub use error::{Result, SocketError};
pub use feed_socket::{FeedSocket, FeedSocketFactory};
