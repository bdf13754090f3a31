use crate::types::identity::Username;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ChatId = u64;
pub type MessageId = u64;

/// Conversation/message id used before the server has assigned a real one.
pub const PLACEHOLDER_ID: ChatId = 0;

/// A single chat message as it appears on the wire and in the transcript.
///
/// `id == 0` marks a locally-created optimistic entry that has not been
/// confirmed by the server yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: MessageId,
    pub sender: Username,
    pub receiver: Username,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Message {
    pub fn is_confirmed(&self) -> bool {
        self.id != PLACEHOLDER_ID
    }

    /// The participant on the other side of this message from `local`.
    pub fn counterpart_of(&self, local: &Username) -> &Username {
        if &self.sender == local {
            &self.receiver
        } else {
            &self.sender
        }
    }
}

/// A 1:1 conversation between the local user and one counterpart.
///
/// Exactly one of `user1`/`user2` is the local user. `id == 0` marks a
/// local-only placeholder that has not been persisted by the server yet;
/// it is promoted in place once the server assigns a real id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(default)]
    pub id: ChatId,
    pub user1: Username,
    pub user2: Username,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub last_message_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unread_count: u32,
}

impl Conversation {
    /// Synthesizes a not-yet-persisted conversation between `local` and `other`.
    pub fn placeholder(local: Username, other: Username) -> Self {
        Self {
            id: PLACEHOLDER_ID,
            user1: local,
            user2: other,
            name: None,
            messages: Vec::new(),
            last_message_time: None,
            unread_count: 0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_ID
    }

    /// The participant that is not `local`.
    ///
    /// Contract: exactly one participant equals `local`. This is the single
    /// place "other participant" is computed; callers never compare the
    /// `user1`/`user2` fields directly.
    pub fn counterpart_of(&self, local: &Username) -> &Username {
        if &self.user1 == local {
            &self.user2
        } else {
            &self.user1
        }
    }

    pub fn involves(&self, user: &Username) -> bool {
        &self.user1 == user || &self.user2 == user
    }

    /// Restores the transcript to ascending-by-timestamp order.
    ///
    /// Applied after every history (re)load. Live-appended messages are
    /// pushed without a re-sort, relying on monotonic arrival.
    pub fn sort_transcript(&mut self) {
        self.messages.sort_by_key(|m| m.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sender: &str, receiver: &str, content: &str, secs: i64) -> Message {
        Message {
            id: 1,
            sender: sender.into(),
            receiver: receiver.into(),
            content: content.to_string(),
            timestamp: DateTime::from_timestamp(secs, 0).unwrap(),
            read: false,
        }
    }

    #[test]
    fn test_counterpart_of() {
        let conv = Conversation::placeholder("alice".into(), "bob".into());
        assert_eq!(conv.counterpart_of(&"alice".into()).as_str(), "bob");
        assert_eq!(conv.counterpart_of(&"bob".into()).as_str(), "alice");
    }

    #[test]
    fn test_sort_transcript_ascending() {
        let mut conv = Conversation::placeholder("alice".into(), "bob".into());
        conv.messages = vec![
            msg("bob", "alice", "third", 30),
            msg("bob", "alice", "first", 10),
            msg("alice", "bob", "second", 20),
        ];
        conv.sort_transcript();
        let order: Vec<&str> = conv.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(order, ["first", "second", "third"]);
    }

    #[test]
    fn test_message_wire_shape() {
        let raw = r#"{
            "id": 42,
            "sender": "bob",
            "receiver": "alice",
            "content": "hey",
            "timestamp": "2026-08-06T12:00:00Z",
            "read": false
        }"#;
        let parsed: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.id, 42);
        assert_eq!(parsed.sender.as_str(), "bob");
        assert!(parsed.is_confirmed());
    }

    #[test]
    fn test_conversation_wire_defaults() {
        // Server list pages omit the transcript and counters.
        let raw = r#"{"id": 7, "user1": "alice", "user2": "bob"}"#;
        let parsed: Conversation = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.id, 7);
        assert!(parsed.messages.is_empty());
        assert_eq!(parsed.unread_count, 0);
        assert!(parsed.last_message_time.is_none());
    }
}
