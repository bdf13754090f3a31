/// REST base path on the backend host.
pub const API_PATH: &str = "/api/v1";

/// Page size used when fetching conversation list pages.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page size used when (re)fetching a conversation's history.
pub const MESSAGE_PAGE_SIZE: usize = 100;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// REST base URL, including the API path (e.g. `http://host:8080/api/v1`).
    pub base_url: String,
    /// Live feed endpoint (e.g. `ws://host:8080/ws/chat`).
    pub feed_url: String,
    pub page_size: usize,
}

impl ClientConfig {
    pub fn for_host(host: &str) -> Self {
        Self {
            base_url: format!("http://{host}{API_PATH}"),
            feed_url: format!("ws://{host}/ws/chat"),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_host("localhost:8080")
    }
}
