use crate::client::Client;
use log::{debug, info, warn};
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

const KEEP_ALIVE_INTERVAL_MIN: Duration = Duration::from_secs(20);
const KEEP_ALIVE_INTERVAL_MAX: Duration = Duration::from_secs(30);
const KEEP_ALIVE_MAX_FAIL_TIME: Duration = Duration::from_secs(180); // 3 minutes

impl Client {
    /// Sends a single keepalive ping. Returns true on success.
    async fn send_keepalive(&self) -> bool {
        if !self.is_connected() {
            return false;
        }
        let transport = self.transport.lock().await.clone();
        let Some(transport) = transport else {
            return false;
        };

        debug!(target: "Client/Keepalive", "Sending keepalive ping");
        match transport.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "Client/Keepalive", "Keepalive ping failed: {e:?}");
                false
            }
        }
    }

    /// The main keepalive loop. This should be spawned as a background task.
    pub(crate) async fn keepalive_loop(self: Arc<Self>) {
        let mut last_success = chrono::Utc::now();
        let mut error_count = 0u32;
        let max_fail = chrono::Duration::seconds(KEEP_ALIVE_MAX_FAIL_TIME.as_secs() as i64);

        loop {
            let interval_ms = rand::rng().random_range(
                KEEP_ALIVE_INTERVAL_MIN.as_millis()..=KEEP_ALIVE_INTERVAL_MAX.as_millis(),
            );
            let interval = Duration::from_millis(interval_ms as u64);

            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    if !self.is_connected() {
                        debug!(target: "Client/Keepalive", "Not connected, exiting keepalive loop.");
                        return;
                    }

                    if self.send_keepalive().await {
                        if error_count > 0 {
                            info!(target: "Client/Keepalive", "Keepalive restored.");
                        }
                        error_count = 0;
                        last_success = chrono::Utc::now();
                    } else {
                        error_count += 1;
                        warn!(target: "Client/Keepalive", "Keepalive failure, error count: {error_count}");

                        // Drop the transport so the run loop reconnects with backoff.
                        if self.enable_auto_reconnect.load(Ordering::Relaxed)
                            && chrono::Utc::now().signed_duration_since(last_success) > max_fail
                        {
                            warn!(target: "Client/Keepalive", "Forcing reconnect after keepalive failure for over {} seconds.", KEEP_ALIVE_MAX_FAIL_TIME.as_secs());
                            if let Some(transport) = self.transport.lock().await.take() {
                                transport.disconnect().await;
                            }
                            return;
                        }
                    }
                },
                _ = self.shutdown_notifier.notified() => {
                    debug!(target: "Client/Keepalive", "Shutdown signaled, exiting keepalive loop.");
                    return;
                }
            }
        }
    }
}
