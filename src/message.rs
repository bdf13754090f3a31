use crate::client::Client;
use crate::types::events::{Connected, Disconnected};
use bmcore::net::TransportEvent;
use bmcore::state::IncomingOutcome;
use bmcore::types::Message;
use log::{debug, info, trace, warn};
use std::sync::Arc;
use std::sync::atomic::Ordering;

impl Client {
    /// Drains live-feed events until the feed drops or shutdown is signaled.
    /// Returns an error when the drop was not requested, so the run loop
    /// reconnects.
    pub(crate) async fn read_events_loop(self: &Arc<Self>) -> Result<(), anyhow::Error> {
        info!(target: "Client", "Starting feed processing loop...");

        let mut rx_guard = self.transport_events.lock().await;
        let mut transport_events = rx_guard
            .take()
            .ok_or_else(|| anyhow::anyhow!("Cannot start feed loop: not connected"))?;
        drop(rx_guard);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_notifier.notified() => {
                    debug!(target: "Client", "Shutdown signaled, exiting feed loop.");
                    return Ok(());
                }
                event = transport_events.recv() => match event {
                    Some(TransportEvent::Connected) => {
                        info!(target: "Client", "Live feed established for {}", self.local);
                        let _ = self.event_bus.connected.send(Arc::new(Connected));
                    }
                    Some(TransportEvent::DataReceived(frame)) => {
                        self.handle_frame(&frame).await;
                    }
                    Some(TransportEvent::Disconnected) | None => {
                        let _ = self.event_bus.disconnected.send(Arc::new(Disconnected));
                        if self.expected_disconnect.load(Ordering::Relaxed) {
                            return Ok(());
                        }
                        return Err(anyhow::anyhow!("live feed dropped"));
                    }
                }
            }
        }
    }

    async fn handle_frame(self: &Arc<Self>, frame: &[u8]) {
        let message: Message = match serde_json::from_slice(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!(target: "Client", "Dropping malformed feed frame: {e}");
                return;
            }
        };
        debug!(
            target: "Client",
            "<-- message {} from {}", message.id, message.sender
        );

        let _ = self.event_bus.message.send(Arc::new(message.clone()));

        let outcome = self.state.lock().await.apply_incoming(message);
        match outcome {
            IncomingOutcome::Merged { .. } => {}
            IncomingOutcome::ReconcilePlaceholder { other } => {
                self.schedule_placeholder_reconcile(other);
            }
            IncomingOutcome::RefreshList => {
                if let Err(e) = self.refresh_first_page().await {
                    warn!(target: "Client", "Failed to refresh conversation list: {e}");
                }
            }
            IncomingOutcome::Ignored => {
                trace!(target: "Client", "Message for unlisted conversation; surfaces on next refresh");
            }
        }
    }
}
