use crate::confirm::ConfirmAction;
use crate::error::TransportError;
use crate::fetch::FetchState;
use crate::types::{ChatId, Conversation, Message, PLACEHOLDER_ID, Username};
use chrono::{DateTime, Utc};
use log::debug;

/// What the caller should do with a live-feed message after it has been
/// folded into the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingOutcome {
    /// Folded into an existing entry, which moved to the front of the list.
    Merged { open: bool },
    /// Folded into the open placeholder; the caller should fetch the first
    /// conversation page to discover the server-assigned id.
    ReconcilePlaceholder { other: Username },
    /// Unknown counterpart while nothing is open; the caller should reload
    /// the first page from scratch.
    RefreshList,
    /// Unknown counterpart while another conversation is open; the entry
    /// will surface on the next list refresh.
    Ignored,
}

/// Result of queuing an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendDisposition {
    /// Blank content or no open conversation; nothing was queued.
    Rejected,
    /// An optimistic entry was appended to the open conversation.
    Queued { placeholder: bool, receiver: Username },
}

/// Single source of truth for what the chat UI currently shows.
///
/// Pure state: no IO and no clock access; timestamps come from the caller.
/// Conversations are 1:1, so the counterpart identity is a unique key; the
/// open conversation is recorded as a counterpart so the open entry and its
/// list entry are the same storage and a mutation through one is visible
/// through the other.
#[derive(Debug)]
pub struct ChatState {
    local: Username,
    conversations: Vec<Conversation>,
    /// Counterpart of the open conversation, if any.
    active: Option<Username>,
    list_fetch: FetchState,
    /// Next page index to request when appending to the list.
    next_page: usize,
    history_fetch: FetchState,
    pending_confirm: Option<ConfirmAction>,
}

impl ChatState {
    pub fn new(local: Username) -> Self {
        Self {
            local,
            conversations: Vec::new(),
            active: None,
            list_fetch: FetchState::default(),
            next_page: 0,
            history_fetch: FetchState::default(),
            pending_confirm: None,
        }
    }

    pub fn local(&self) -> &Username {
        &self.local
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active(&self) -> Option<&Conversation> {
        let other = self.active.as_ref()?;
        self.conversations
            .iter()
            .find(|c| c.counterpart_of(&self.local) == other)
    }

    pub fn active_counterpart(&self) -> Option<&Username> {
        self.active.as_ref()
    }

    pub fn list_fetch(&self) -> &FetchState {
        &self.list_fetch
    }

    pub fn history_fetch(&self) -> &FetchState {
        &self.history_fetch
    }

    fn position_by_counterpart(&self, other: &Username) -> Option<usize> {
        self.conversations
            .iter()
            .position(|c| c.counterpart_of(&self.local) == other)
    }

    fn position_by_id(&self, id: ChatId) -> Option<usize> {
        self.conversations.iter().position(|c| c.id == id)
    }

    // ---- conversation list pagination ----

    /// Claims the next list page for fetching. Returns `None` when a fetch is
    /// already outstanding or the list is exhausted.
    pub fn begin_list_fetch(&mut self) -> Option<usize> {
        if !self.list_fetch.can_fetch() {
            return None;
        }
        self.list_fetch = FetchState::Loading;
        Some(self.next_page)
    }

    /// Appends a fetched page. Entries whose id is already present are
    /// skipped, so the list never holds duplicate identifiers; a fetched
    /// conversation matching an existing placeholder promotes it in place.
    pub fn apply_conversation_page(&mut self, page: Vec<Conversation>, page_size: usize) {
        let exhausted = page.len() < page_size;
        self.merge_page(page);
        self.next_page += 1;
        self.list_fetch = if exhausted {
            FetchState::Exhausted
        } else {
            FetchState::Idle
        };
    }

    pub fn fail_list_fetch(&mut self, err: TransportError) {
        self.list_fetch = FetchState::Failed(err);
    }

    /// Reloads the list from the first page, dropping everything except the
    /// open entry (so the visible transcript survives the reload).
    pub fn replace_list(&mut self, page: Vec<Conversation>, page_size: usize) {
        let exhausted = page.len() < page_size;
        let local = self.local.clone();
        let active = self.active.clone();
        self.conversations
            .retain(|c| active.as_ref() == Some(c.counterpart_of(&local)));
        self.merge_page(page);
        self.next_page = 1;
        self.list_fetch = if exhausted {
            FetchState::Exhausted
        } else {
            FetchState::Idle
        };
    }

    fn merge_page(&mut self, page: Vec<Conversation>) {
        let local = self.local.clone();
        for mut conv in page {
            if !conv.is_placeholder() && self.position_by_id(conv.id).is_some() {
                continue;
            }
            conv.sort_transcript();
            let other = conv.counterpart_of(&local).clone();
            match self.position_by_counterpart(&other) {
                Some(pos) if self.conversations[pos].is_placeholder() => {
                    self.promote_entry(pos, conv)
                }
                Some(_) => {}
                None => self.conversations.push(conv),
            }
        }
    }

    // ---- opening and history ----

    /// Marks the conversation open and optimistically zeroes its unread
    /// counter, ahead of the server's mark-read confirmation. Returns the
    /// counterpart for the caller's history fetch.
    pub fn open(&mut self, id: ChatId) -> Option<Username> {
        let pos = self.position_by_id(id)?;
        let other = self.conversations[pos].counterpart_of(&self.local).clone();
        self.conversations[pos].unread_count = 0;
        self.history_fetch = if id == PLACEHOLDER_ID {
            FetchState::Idle
        } else {
            FetchState::Loading
        };
        self.active = Some(other.clone());
        Some(other)
    }

    /// Closes the open conversation without removing it from the list.
    pub fn close_active(&mut self) {
        self.active = None;
        self.history_fetch = FetchState::Idle;
    }

    /// Installs a fetched history, sorted ascending by timestamp. A late
    /// response for a conversation that is no longer open is discarded.
    pub fn apply_history(&mut self, other: &Username, mut messages: Vec<Message>) -> bool {
        if self.active.as_ref() != Some(other) {
            debug!(target: "ChatState", "Dropping stale history for {other}");
            return false;
        }
        let Some(pos) = self.position_by_counterpart(other) else {
            return false;
        };
        messages.sort_by_key(|m| m.timestamp);
        let entry = &mut self.conversations[pos];
        if let Some(last) = messages.last() {
            entry.last_message_time = Some(last.timestamp);
        }
        entry.messages = messages;
        entry.unread_count = 0;
        self.history_fetch = FetchState::Idle;
        true
    }

    pub fn fail_history_fetch(&mut self, other: &Username, err: TransportError) {
        if self.active.as_ref() == Some(other) {
            self.history_fetch = FetchState::Failed(err);
        }
    }

    /// Opens the conversation with `other`, synthesizing a local-only
    /// placeholder (id 0, empty transcript, no network call) when none is
    /// listed yet. Returns the id of the opened entry.
    pub fn open_or_create_placeholder(&mut self, other: Username) -> ChatId {
        if let Some(pos) = self.position_by_counterpart(&other) {
            let id = self.conversations[pos].id;
            self.conversations[pos].unread_count = 0;
            self.history_fetch = if id == PLACEHOLDER_ID {
                FetchState::Idle
            } else {
                FetchState::Loading
            };
            self.active = Some(other);
            return id;
        }
        self.conversations
            .insert(0, Conversation::placeholder(self.local.clone(), other.clone()));
        self.active = Some(other);
        self.history_fetch = FetchState::Idle;
        PLACEHOLDER_ID
    }

    // ---- sending ----

    /// Appends an optimistic message (id 0, unread) to the open conversation.
    /// No-op on blank content or when nothing is open. A confirmed entry is
    /// moved to the front of the list immediately; a placeholder waits for
    /// the id-discovery reconciliation the caller schedules.
    pub fn push_optimistic(&mut self, content: &str, now: DateTime<Utc>) -> SendDisposition {
        let content = content.trim();
        if content.is_empty() {
            return SendDisposition::Rejected;
        }
        let Some(other) = self.active.clone() else {
            return SendDisposition::Rejected;
        };
        let Some(pos) = self.position_by_counterpart(&other) else {
            return SendDisposition::Rejected;
        };
        let entry = &mut self.conversations[pos];
        let placeholder = entry.is_placeholder();
        entry.messages.push(Message {
            id: 0,
            sender: self.local.clone(),
            receiver: other.clone(),
            content: content.to_string(),
            timestamp: now,
            read: false,
        });
        entry.last_message_time = Some(now);
        self.conversations[..=pos].rotate_right(1);
        SendDisposition::Queued {
            placeholder,
            receiver: other,
        }
    }

    // ---- live feed ----

    /// Folds a live-feed message into the state. Messages are pushed without
    /// a transcript re-sort (monotonic arrival is assumed for the feed).
    pub fn apply_incoming(&mut self, message: Message) -> IncomingOutcome {
        let other = message.counterpart_of(&self.local).clone();
        if let Some(pos) = self.position_by_counterpart(&other) {
            let open = self.active.as_ref() == Some(&other);
            let from_local = message.sender == self.local;
            let placeholder = self.conversations[pos].is_placeholder();
            let local = self.local.clone();
            let entry = &mut self.conversations[pos];
            entry.last_message_time = Some(message.timestamp);
            if from_local {
                // Server echo of our own send: replace the oldest matching
                // optimistic entry instead of duplicating it.
                let slot = entry
                    .messages
                    .iter_mut()
                    .find(|m| !m.is_confirmed() && m.sender == local && m.content == message.content);
                match slot {
                    Some(slot) => *slot = message,
                    None => entry.messages.push(message),
                }
            } else {
                entry.messages.push(message);
                if !open {
                    entry.unread_count += 1;
                }
            }
            self.conversations[..=pos].rotate_right(1);
            if placeholder && open {
                return IncomingOutcome::ReconcilePlaceholder { other };
            }
            return IncomingOutcome::Merged { open };
        }
        if self.active.is_none() {
            IncomingOutcome::RefreshList
        } else {
            IncomingOutcome::Ignored
        }
    }

    // ---- placeholder promotion ----

    /// Splices a server-assigned conversation over the placeholder for
    /// `other`, keeping every message that was appended locally while the
    /// placeholder was pending, in original relative order. A placeholder is
    /// promoted at most once; returns whether a promotion happened.
    pub fn reconcile_placeholder(&mut self, other: &Username, fetched: Vec<Conversation>) -> bool {
        let local = self.local.clone();
        let Some(pos) = self
            .conversations
            .iter()
            .position(|c| c.is_placeholder() && c.counterpart_of(&local) == other)
        else {
            return false;
        };
        let Some(server) = fetched
            .into_iter()
            .find(|c| !c.is_placeholder() && c.involves(&local) && c.counterpart_of(&local) == other)
        else {
            debug!(target: "ChatState", "No server conversation with {other} yet");
            return false;
        };
        self.promote_entry(pos, server);
        true
    }

    fn promote_entry(&mut self, mut pos: usize, mut server: Conversation) {
        server.sort_transcript();
        // A concurrent list refresh may have inserted the server copy already.
        if let Some(dup) = self
            .conversations
            .iter()
            .position(|c| c.id == server.id && !c.is_placeholder())
            && dup != pos
        {
            self.conversations.remove(dup);
            if dup < pos {
                pos -= 1;
            }
        }
        let pending = std::mem::take(&mut self.conversations[pos].messages);
        for message in pending {
            let confirmed_already = if message.is_confirmed() {
                server.messages.iter().any(|s| s.id == message.id)
            } else {
                server
                    .messages
                    .iter()
                    .any(|s| s.sender == message.sender && s.content == message.content)
            };
            if !confirmed_already {
                server.messages.push(message);
            }
        }
        let other = server.counterpart_of(&self.local).clone();
        if self.active.as_ref() == Some(&other) {
            server.unread_count = 0;
        }
        if server.last_message_time < self.conversations[pos].last_message_time {
            server.last_message_time = self.conversations[pos].last_message_time;
        }
        debug!(target: "ChatState", "Promoted placeholder with {other} to id {}", server.id);
        self.conversations[pos] = server;
    }

    // ---- deletion ----

    /// Removes a conversation from the list; clears the open slot and its
    /// transcript if it was the open one.
    pub fn remove_conversation(&mut self, id: ChatId) -> bool {
        let Some(pos) = self.position_by_id(id) else {
            return false;
        };
        let other = self.conversations[pos].counterpart_of(&self.local).clone();
        if self.active.as_ref() == Some(&other) {
            self.close_active();
        }
        self.conversations.remove(pos);
        true
    }

    // ---- pending confirmation ----

    pub fn request_confirm(&mut self, action: ConfirmAction) {
        self.pending_confirm = Some(action);
    }

    pub fn pending_confirm(&self) -> Option<&ConfirmAction> {
        self.pending_confirm.as_ref()
    }

    pub fn take_pending_confirm(&mut self) -> Option<ConfirmAction> {
        self.pending_confirm.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_SIZE: usize = 3;

    fn state() -> ChatState {
        ChatState::new("alice".into())
    }

    fn conv(id: ChatId, other: &str) -> Conversation {
        Conversation {
            id,
            user1: "alice".into(),
            user2: other.into(),
            name: None,
            messages: Vec::new(),
            last_message_time: None,
            unread_count: 0,
        }
    }

    fn incoming(id: u64, sender: &str, receiver: &str, content: &str, secs: i64) -> Message {
        Message {
            id,
            sender: sender.into(),
            receiver: receiver.into(),
            content: content.to_string(),
            timestamp: DateTime::from_timestamp(secs, 0).unwrap(),
            read: false,
        }
    }

    fn ids(st: &ChatState) -> Vec<ChatId> {
        st.conversations().iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_pages_append_in_order_without_duplicates() {
        let mut st = state();
        assert_eq!(st.begin_list_fetch(), Some(0));
        st.apply_conversation_page(vec![conv(1, "bob"), conv(2, "carol"), conv(3, "dan")], PAGE_SIZE);
        assert_eq!(st.begin_list_fetch(), Some(1));
        // Server shifted: id 3 reappears on the second page.
        st.apply_conversation_page(vec![conv(3, "dan"), conv(4, "erin"), conv(5, "fred")], PAGE_SIZE);
        assert_eq!(ids(&st), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_list_fetch_not_reentrant() {
        let mut st = state();
        assert_eq!(st.begin_list_fetch(), Some(0));
        // A second load while the first is outstanding is refused.
        assert_eq!(st.begin_list_fetch(), None);
        st.apply_conversation_page(vec![conv(1, "bob")], PAGE_SIZE);
    }

    #[test]
    fn test_short_page_exhausts_the_list() {
        let mut st = state();
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(1, "bob")], PAGE_SIZE);
        assert!(st.list_fetch().is_exhausted());
        // Subsequent loads are no-ops.
        assert_eq!(st.begin_list_fetch(), None);
        assert_eq!(ids(&st), [1]);
    }

    #[test]
    fn test_failed_fetch_resets_loading_and_allows_retry() {
        let mut st = state();
        st.begin_list_fetch();
        st.fail_list_fetch(TransportError::new(500, "boom"));
        assert!(matches!(st.list_fetch(), FetchState::Failed(_)));
        assert_eq!(st.begin_list_fetch(), Some(0));
    }

    #[test]
    fn test_new_chat_scenario() {
        let mut st = state();
        let id = st.open_or_create_placeholder("bob".into());
        assert_eq!(id, PLACEHOLDER_ID);
        let placeholder = st.active().unwrap();
        assert!(placeholder.is_placeholder());
        assert!(placeholder.involves(&"alice".into()));
        assert!(placeholder.involves(&"bob".into()));
        assert!(placeholder.messages.is_empty());

        let now = Utc::now();
        let disposition = st.push_optimistic("hi", now);
        assert_eq!(
            disposition,
            SendDisposition::Queued {
                placeholder: true,
                receiver: "bob".into()
            }
        );
        let log = &st.active().unwrap().messages;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].content, "hi");
        assert_eq!(log[0].sender.as_str(), "alice");
        assert!(!log[0].is_confirmed());
    }

    #[test]
    fn test_blank_send_and_no_open_conversation_are_rejected() {
        let mut st = state();
        assert_eq!(st.push_optimistic("hello", Utc::now()), SendDisposition::Rejected);
        st.open_or_create_placeholder("bob".into());
        assert_eq!(st.push_optimistic("   ", Utc::now()), SendDisposition::Rejected);
        assert!(st.active().unwrap().messages.is_empty());
    }

    #[test]
    fn test_unread_accounting() {
        let mut st = state();
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(1, "bob"), conv(2, "carol")], PAGE_SIZE);

        let outcome = st.apply_incoming(incoming(10, "bob", "alice", "ping", 100));
        assert_eq!(outcome, IncomingOutcome::Merged { open: false });
        let entry = st.conversations().iter().find(|c| c.id == 1).unwrap();
        assert_eq!(entry.unread_count, 1);

        st.open(1).unwrap();
        assert_eq!(st.active().unwrap().unread_count, 0);
    }

    #[test]
    fn test_open_conversation_does_not_count_unread() {
        let mut st = state();
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(1, "bob")], PAGE_SIZE);
        st.open(1).unwrap();
        st.apply_incoming(incoming(10, "bob", "alice", "ping", 100));
        assert_eq!(st.active().unwrap().unread_count, 0);
        assert_eq!(st.active().unwrap().messages.len(), 1);
    }

    #[test]
    fn test_history_is_sorted_ascending() {
        let mut st = state();
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(1, "bob")], PAGE_SIZE);
        st.open(1).unwrap();
        let history = vec![
            incoming(3, "bob", "alice", "t3", 30),
            incoming(1, "bob", "alice", "t1", 10),
            incoming(2, "alice", "bob", "t2", 20),
        ];
        assert!(st.apply_history(&"bob".into(), history));
        let order: Vec<&str> = st
            .active()
            .unwrap()
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(order, ["t1", "t2", "t3"]);
        assert!(st.history_fetch() == &FetchState::Idle);
    }

    #[test]
    fn test_stale_history_is_dropped() {
        let mut st = state();
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(1, "bob"), conv(2, "carol")], PAGE_SIZE);
        st.open(1).unwrap();
        st.open(2).unwrap();
        // The response for bob's history lands after carol was opened.
        assert!(!st.apply_history(&"bob".into(), vec![incoming(1, "bob", "alice", "old", 10)]));
        let bob = st.conversations().iter().find(|c| c.id == 1).unwrap();
        assert!(bob.messages.is_empty());
    }

    #[test]
    fn test_incoming_moves_conversation_to_front() {
        let mut st = state();
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(1, "a1"), conv(2, "b2"), conv(3, "c3")], PAGE_SIZE);
        st.apply_incoming(incoming(10, "c3", "alice", "hey", 100));
        assert_eq!(ids(&st), [3, 1, 2]);
    }

    #[test]
    fn test_unknown_counterpart_refreshes_when_idle_and_is_ignored_when_busy() {
        let mut st = state();
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(1, "bob")], PAGE_SIZE);

        assert_eq!(
            st.apply_incoming(incoming(10, "zoe", "alice", "hi", 100)),
            IncomingOutcome::RefreshList
        );

        st.open(1).unwrap();
        assert_eq!(
            st.apply_incoming(incoming(11, "zoe", "alice", "hi again", 110)),
            IncomingOutcome::Ignored
        );
    }

    #[test]
    fn test_own_echo_replaces_optimistic_message() {
        let mut st = state();
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(1, "bob")], PAGE_SIZE);
        st.open(1).unwrap();
        st.push_optimistic("hello", Utc::now());

        let outcome = st.apply_incoming(incoming(42, "alice", "bob", "hello", 100));
        assert_eq!(outcome, IncomingOutcome::Merged { open: true });
        let log = &st.active().unwrap().messages;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].id, 42);
        assert_eq!(log[0].content, "hello");
    }

    #[test]
    fn test_placeholder_round_trip_preserves_pending_messages() {
        let mut st = state();
        st.open_or_create_placeholder("bob".into());
        st.push_optimistic("first", DateTime::from_timestamp(100, 0).unwrap());
        st.push_optimistic("second", DateTime::from_timestamp(101, 0).unwrap());

        // The server confirmed "first" and assigned the conversation id 9.
        let mut server = conv(9, "bob");
        server.messages = vec![incoming(70, "alice", "bob", "first", 100)];
        server.last_message_time = Some(DateTime::from_timestamp(100, 0).unwrap());

        assert!(st.reconcile_placeholder(&"bob".into(), vec![server]));
        let entry = st.active().unwrap();
        assert_eq!(entry.id, 9);
        assert!(!entry.is_placeholder());
        let contents: Vec<&str> = entry.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
        assert_eq!(entry.messages[0].id, 70);
        assert!(!entry.messages[1].is_confirmed());

        // Promotion happens at most once.
        assert!(!st.reconcile_placeholder(&"bob".into(), vec![conv(9, "bob")]));
    }

    #[test]
    fn test_reconcile_without_matching_server_entry_keeps_placeholder() {
        let mut st = state();
        st.open_or_create_placeholder("bob".into());
        st.push_optimistic("hi", Utc::now());
        assert!(!st.reconcile_placeholder(&"bob".into(), vec![conv(3, "carol")]));
        assert!(st.active().unwrap().is_placeholder());
        assert_eq!(st.active().unwrap().messages.len(), 1);
    }

    #[test]
    fn test_incoming_on_open_placeholder_requests_reconciliation() {
        let mut st = state();
        st.open_or_create_placeholder("bob".into());
        st.push_optimistic("hi", Utc::now());
        let outcome = st.apply_incoming(incoming(50, "bob", "alice", "welcome", 200));
        assert_eq!(
            outcome,
            IncomingOutcome::ReconcilePlaceholder { other: "bob".into() }
        );
        // The message itself was absorbed, not dropped.
        assert_eq!(st.active().unwrap().messages.len(), 2);
    }

    #[test]
    fn test_page_merge_promotes_listed_placeholder() {
        let mut st = state();
        st.open_or_create_placeholder("bob".into());
        st.push_optimistic("hi", Utc::now());
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(7, "bob"), conv(8, "carol")], PAGE_SIZE);
        assert_eq!(ids(&st), [7, 8]);
        let entry = st.active().unwrap();
        assert_eq!(entry.id, 7);
        assert_eq!(entry.messages.len(), 1);
    }

    #[test]
    fn test_replace_list_keeps_open_entry() {
        let mut st = state();
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(1, "bob"), conv(2, "carol")], PAGE_SIZE);
        st.open(1).unwrap();
        st.replace_list(vec![conv(2, "carol"), conv(3, "dan")], PAGE_SIZE);
        assert_eq!(ids(&st), [1, 2, 3]);
        assert_eq!(st.active().unwrap().id, 1);
    }

    #[test]
    fn test_remove_open_conversation_clears_active_slot() {
        let mut st = state();
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(1, "bob"), conv(2, "carol")], PAGE_SIZE);
        st.open(1).unwrap();
        assert!(st.remove_conversation(1));
        assert!(st.active().is_none());
        assert_eq!(ids(&st), [2]);
        assert!(!st.remove_conversation(1));
    }

    #[test]
    fn test_pending_confirm_is_consumed_once() {
        let mut st = state();
        st.request_confirm(ConfirmAction::DeleteConversation { id: 4 });
        assert!(st.pending_confirm().is_some());
        assert_eq!(
            st.take_pending_confirm(),
            Some(ConfirmAction::DeleteConversation { id: 4 })
        );
        assert!(st.take_pending_confirm().is_none());
    }

    #[test]
    fn test_confirmed_send_moves_entry_to_front() {
        let mut st = state();
        st.begin_list_fetch();
        st.apply_conversation_page(vec![conv(1, "bob"), conv(2, "carol")], PAGE_SIZE);
        st.open(2).unwrap();
        let disposition = st.push_optimistic("yo", Utc::now());
        assert_eq!(
            disposition,
            SendDisposition::Queued {
                placeholder: false,
                receiver: "carol".into()
            }
        );
        assert_eq!(ids(&st), [2, 1]);
        assert!(st.conversations()[0].last_message_time.is_some());
    }
}
