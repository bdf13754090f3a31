//! Thin wrapper over the REST surface of the chat backend.
//!
//! Every operation maps a non-2xx response (or a request that never got one)
//! to a [`TransportError`]; nothing here retries. Retry policy, if any, is the
//! caller's responsibility.

use bmcore::error::TransportError;
use bmcore::net::{HttpClient, HttpRequest, HttpResponse};
use bmcore::types::{ChatId, Conversation, Message, Username};
use log::debug;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Server-side mutation applied through `PUT /chats/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifyAction {
    /// Mark every message in the conversation as read.
    Read,
    Rename(String),
}

pub struct ChatApi {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl ChatApi {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(target: "ChatApi", "--> {} {}", request.method, request.url);
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;
        if response.is_success() {
            Ok(response)
        } else {
            let status = response.status_code;
            let body = response.body_string();
            let message = if body.trim().is_empty() {
                "request failed".to_string()
            } else {
                body
            };
            Err(TransportError::new(status, message))
        }
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<T, TransportError> {
        let response = self.execute(request).await?;
        serde_json::from_slice(&response.body)
            .map_err(|e| TransportError::network(format!("invalid response body: {e}")))
    }

    pub async fn list_conversations(
        &self,
        page: usize,
        size: usize,
    ) -> Result<Vec<Conversation>, TransportError> {
        self.fetch_json(HttpRequest::get(
            self.url(&format!("/chats?page={page}&size={size}")),
        ))
        .await
    }

    pub async fn list_messages(
        &self,
        chat_id: ChatId,
        page: usize,
        size: usize,
    ) -> Result<Vec<Message>, TransportError> {
        self.fetch_json(HttpRequest::get(self.url(&format!(
            "/chats/{chat_id}/messages?page={page}&size={size}"
        ))))
        .await
    }

    pub async fn create_conversation(
        &self,
        user1: &Username,
        user2: &Username,
        name: Option<&str>,
    ) -> Result<Conversation, TransportError> {
        let mut body = serde_json::json!({ "user1": user1, "user2": user2 });
        if let Some(name) = name {
            body["name"] = serde_json::Value::String(name.to_string());
        }
        let request = HttpRequest::post(self.url("/chats"))
            .with_header("Content-Type", "application/json")
            .with_body(body.to_string().into_bytes());
        self.fetch_json(request).await
    }

    pub async fn modify_conversation(
        &self,
        chat_id: ChatId,
        action: &ModifyAction,
    ) -> Result<(), TransportError> {
        let fields: Vec<(&str, &str)> = match action {
            ModifyAction::Read => vec![("action", "read")],
            ModifyAction::Rename(name) => vec![("action", "rename"), ("name", name.as_str())],
        };
        let request =
            HttpRequest::put(self.url(&format!("/chats/{chat_id}"))).with_form(&fields);
        self.execute(request).await.map(|_| ())
    }

    pub async fn mark_read(&self, chat_id: ChatId) -> Result<(), TransportError> {
        self.modify_conversation(chat_id, &ModifyAction::Read).await
    }

    pub async fn delete_conversation(&self, chat_id: ChatId) -> Result<(), TransportError> {
        let request = HttpRequest::delete(self.url(&format!("/chats/{chat_id}")));
        self.execute(request).await.map(|_| ())
    }

    /// Publishes a message. Best effort: the persisted copy is not returned;
    /// confirmation arrives over the live feed or on the next history fetch.
    pub async fn send_message(
        &self,
        sender: &Username,
        receiver: &Username,
        content: &str,
    ) -> Result<(), TransportError> {
        let request = HttpRequest::post(self.url("/chats/messages?type=text")).with_form(&[
            ("sender", sender.as_str()),
            ("receiver", receiver.as_str()),
            ("content", content),
        ]);
        self.execute(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingHttp {
        requests: Mutex<Vec<HttpRequest>>,
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClient for RecordingHttp {
        async fn execute(&self, request: HttpRequest) -> anyhow::Result<HttpResponse> {
            self.requests.lock().await.push(request);
            Ok(HttpResponse {
                status_code: self.status,
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    fn api(status: u16, body: &'static str) -> (ChatApi, Arc<RecordingHttp>) {
        let http = Arc::new(RecordingHttp {
            requests: Mutex::new(Vec::new()),
            status,
            body,
        });
        (ChatApi::new(http.clone(), "http://test/api/v1"), http)
    }

    #[tokio::test]
    async fn test_send_message_request_shape() {
        let (api, http) = api(200, "");
        api.send_message(&"alice".into(), &"bob".into(), "hi there")
            .await
            .unwrap();
        let requests = http.requests.lock().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, "http://test/api/v1/chats/messages?type=text");
        let body = String::from_utf8(requests[0].body.clone().unwrap()).unwrap();
        assert_eq!(body, "sender=alice&receiver=bob&content=hi+there");
    }

    #[tokio::test]
    async fn test_error_status_maps_to_transport_error() {
        let (api, _http) = api(404, "conversation not found");
        let err = api.list_messages(9, 0, 50).await.unwrap_err();
        assert_eq!(err.status, 404);
        assert_eq!(err.message, "conversation not found");
    }

    #[tokio::test]
    async fn test_create_conversation_posts_json() {
        let (api, http) = api(200, r#"{"id": 12, "user1": "alice", "user2": "bob"}"#);
        let created = api
            .create_conversation(&"alice".into(), &"bob".into(), None)
            .await
            .unwrap();
        assert_eq!(created.id, 12);
        let requests = http.requests.lock().await;
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, "http://test/api/v1/chats");
        assert_eq!(
            requests[0].headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_rename_uses_modify_endpoint() {
        let (api, http) = api(200, "");
        api.modify_conversation(5, &ModifyAction::Rename("weekend plans".into()))
            .await
            .unwrap();
        let requests = http.requests.lock().await;
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(requests[0].url, "http://test/api/v1/chats/5");
        let body = String::from_utf8(requests[0].body.clone().unwrap()).unwrap();
        assert_eq!(body, "action=rename&name=weekend+plans");
    }

    #[tokio::test]
    async fn test_list_conversations_parses_page() {
        let (api, http) = api(200, r#"[{"id": 3, "user1": "alice", "user2": "bob"}]"#);
        let page = api.list_conversations(2, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 3);
        let requests = http.requests.lock().await;
        assert_eq!(requests[0].url, "http://test/api/v1/chats?page=2&size=10");
    }
}
