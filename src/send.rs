use crate::client::{Client, ClientError};
use crate::types::events::ConversationPromoted;
use bmcore::state::SendDisposition;
use bmcore::types::Username;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::time::{Duration, sleep};

/// How long to wait after the first send on a placeholder before fetching
/// the conversation list to discover the server-assigned id.
pub(crate) const RECONCILE_DELAY: Duration = Duration::from_millis(500);

impl Client {
    /// Appends an optimistic message to the open conversation and publishes
    /// it. No-op when the content is blank or nothing is open. The optimistic
    /// entry is superseded by the confirmed copy from the live feed.
    pub async fn send_message(self: &Arc<Self>, content: &str) -> Result<(), ClientError> {
        let disposition = self
            .state
            .lock()
            .await
            .push_optimistic(content, Utc::now());
        let SendDisposition::Queued {
            placeholder,
            receiver,
        } = disposition
        else {
            debug!(target: "Client/Send", "Nothing to send (blank content or no open conversation)");
            return Ok(());
        };

        if let Err(e) = self
            .api
            .send_message(&self.local, &receiver, content.trim())
            .await
        {
            warn!(target: "Client/Send", "Publish to {receiver} failed: {e}");
            self.publish_api_error(&e);
            return Err(e.into());
        }

        if placeholder {
            self.schedule_placeholder_reconcile(receiver);
        }
        Ok(())
    }

    /// One-shot deferred fetch that discovers the server-assigned id of the
    /// placeholder with `other` and splices it in. Raced against shutdown so
    /// a torn-down client never mutates state. Single attempt; if the server
    /// has not persisted the conversation yet, a later list refresh picks it
    /// up.
    pub(crate) fn schedule_placeholder_reconcile(self: &Arc<Self>, other: Username) {
        let client = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = sleep(RECONCILE_DELAY) => {}
                _ = client.shutdown_notifier.notified() => {
                    debug!(target: "Client/Reconcile", "Shutdown signaled, dropping reconciliation for {other}");
                    return;
                }
            }

            match client.api.list_conversations(0, client.config.page_size).await {
                Ok(page) => {
                    let mut state = client.state.lock().await;
                    if state.reconcile_placeholder(&other, page) {
                        let id = state
                            .conversations()
                            .iter()
                            .find(|c| c.counterpart_of(&client.local) == &other)
                            .map(|c| c.id)
                            .unwrap_or_default();
                        info!(target: "Client/Reconcile", "Conversation with {other} confirmed as id {id}");
                        let _ = client
                            .event_bus
                            .conversation_promoted
                            .send(Arc::new(ConversationPromoted { id, other }));
                    } else {
                        debug!(target: "Client/Reconcile", "No server conversation with {other} yet");
                    }
                }
                Err(e) => {
                    warn!(target: "Client/Reconcile", "Reconciliation fetch failed: {e}");
                    client.publish_api_error(&e);
                }
            }
        });
    }
}
