use crate::client::{Client, ClientError};
use crate::config::MESSAGE_PAGE_SIZE;
use bmcore::confirm::ConfirmAction;
use bmcore::types::{ChatId, PLACEHOLDER_ID, Username};
use log::warn;

impl Client {
    /// Appends the next page to the conversation list. No-op while a load is
    /// outstanding or after the final page was seen.
    pub async fn load_conversations(&self) -> Result<(), ClientError> {
        let Some(page) = self.state.lock().await.begin_list_fetch() else {
            return Ok(());
        };
        match self
            .api
            .list_conversations(page, self.config.page_size)
            .await
        {
            Ok(items) => {
                self.state
                    .lock()
                    .await
                    .apply_conversation_page(items, self.config.page_size);
                Ok(())
            }
            Err(e) => {
                self.state.lock().await.fail_list_fetch(e.clone());
                self.publish_api_error(&e);
                Err(e.into())
            }
        }
    }

    /// Reloads the first page from scratch, keeping only the open entry.
    /// Used when a message arrives for a conversation not known locally.
    pub(crate) async fn refresh_first_page(&self) -> Result<(), ClientError> {
        match self.api.list_conversations(0, self.config.page_size).await {
            Ok(items) => {
                self.state
                    .lock()
                    .await
                    .replace_list(items, self.config.page_size);
                Ok(())
            }
            Err(e) => {
                self.publish_api_error(&e);
                Err(e.into())
            }
        }
    }

    /// Opens a listed conversation: zeroes its unread count immediately, then
    /// refetches its history and marks it read on the server.
    pub async fn open_conversation(&self, id: ChatId) -> Result<(), ClientError> {
        let Some(other) = self.state.lock().await.open(id) else {
            return Err(ClientError::UnknownConversation(id));
        };
        if id == PLACEHOLDER_ID {
            // Local-only placeholder: nothing to fetch yet.
            return Ok(());
        }

        let (history, marked) = tokio::join!(
            self.api.list_messages(id, 0, MESSAGE_PAGE_SIZE),
            self.api.mark_read(id),
        );

        if let Err(e) = marked {
            warn!(target: "Client/Chats", "Mark-read for conversation {id} failed: {e}");
            self.publish_api_error(&e);
        }

        match history {
            Ok(messages) => {
                self.state.lock().await.apply_history(&other, messages);
                Ok(())
            }
            Err(e) => {
                self.state
                    .lock()
                    .await
                    .fail_history_fetch(&other, e.clone());
                self.publish_api_error(&e);
                Err(e.into())
            }
        }
    }

    /// Opens the conversation with `other`, synthesizing a local placeholder
    /// (no network call) when none is listed yet.
    pub async fn open_chat_with(&self, other: Username) -> Result<(), ClientError> {
        let id = self.state.lock().await.open_or_create_placeholder(other);
        if id == PLACEHOLDER_ID {
            return Ok(());
        }
        self.open_conversation(id).await
    }

    /// Stages a deletion for confirmation; nothing is removed until
    /// [`Client::confirm_pending`] runs.
    pub async fn request_delete(&self, id: ChatId) {
        self.state
            .lock()
            .await
            .request_confirm(ConfirmAction::DeleteConversation { id });
    }

    pub async fn cancel_pending(&self) {
        let _ = self.state.lock().await.take_pending_confirm();
    }

    /// Resolves the staged confirmation, if any.
    pub async fn confirm_pending(&self) -> Result<(), ClientError> {
        let Some(action) = self.state.lock().await.take_pending_confirm() else {
            return Ok(());
        };
        match action {
            ConfirmAction::DeleteConversation { id } => self.delete_conversation(id).await,
        }
    }

    pub async fn delete_conversation(&self, id: ChatId) -> Result<(), ClientError> {
        if let Err(e) = self.api.delete_conversation(id).await {
            self.publish_api_error(&e);
            return Err(e.into());
        }
        self.state.lock().await.remove_conversation(id);
        Ok(())
    }
}
