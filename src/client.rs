use crate::api::ChatApi;
use crate::config::ClientConfig;
use crate::types::events::{AuthRequired, EventBus};
use anyhow::Result;
use bmcore::error::{ErrorKind, ErrorRedirect, TransportError};
use bmcore::net::{HttpClient, Transport, TransportEvent, TransportFactory};
use bmcore::state::ChatState;
use bmcore::types::{ChatId, Conversation, Message, Username};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use thiserror::Error;
use tokio::sync::{Mutex, Notify, mpsc};
use tokio::time::{Duration, sleep};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client is already connected")]
    AlreadyConnected,
    #[error("no conversation with id {0}")]
    UnknownConversation(ChatId),
    #[error("api error: {0}")]
    Api(#[from] TransportError),
}

/// Chat session client for one local user: owns the live-feed connection
/// lifecycle, the REST surface, and the view state they reconcile into.
pub struct Client {
    pub(crate) config: ClientConfig,
    pub(crate) local: Username,
    pub(crate) api: ChatApi,
    pub(crate) state: Mutex<ChatState>,
    pub event_bus: EventBus,

    pub(crate) is_connected: AtomicBool,
    pub(crate) is_connecting: AtomicBool,
    pub(crate) is_running: AtomicBool,
    pub(crate) expected_disconnect: AtomicBool,
    pub(crate) shutdown_notifier: Notify,

    pub(crate) transport: Mutex<Option<Arc<dyn Transport>>>,
    pub(crate) transport_events: Mutex<Option<mpsc::Receiver<TransportEvent>>>,
    pub(crate) transport_factory: Arc<dyn TransportFactory>,

    pub enable_auto_reconnect: AtomicBool,
    pub auto_reconnect_errors: AtomicU32,
}

impl Client {
    pub fn new(
        local: Username,
        config: ClientConfig,
        transport_factory: Arc<dyn TransportFactory>,
        http_client: Arc<dyn HttpClient>,
    ) -> Arc<Self> {
        let api = ChatApi::new(http_client, config.base_url.clone());
        Arc::new(Self {
            local: local.clone(),
            api,
            state: Mutex::new(ChatState::new(local)),
            event_bus: EventBus::new(),
            config,

            is_connected: AtomicBool::new(false),
            is_connecting: AtomicBool::new(false),
            is_running: AtomicBool::new(false),
            expected_disconnect: AtomicBool::new(false),
            shutdown_notifier: Notify::new(),

            transport: Mutex::new(None),
            transport_events: Mutex::new(None),
            transport_factory,

            enable_auto_reconnect: AtomicBool::new(true),
            auto_reconnect_errors: AtomicU32::new(0),
        })
    }

    pub fn local(&self) -> &Username {
        &self.local
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::Relaxed)
    }

    /// Connect / feed-loop / reconnect driver. Runs until [`Client::disconnect`]
    /// is called or auto-reconnect is disabled and the feed drops.
    pub async fn run(self: &Arc<Self>) {
        if self.is_running.swap(true, Ordering::SeqCst) {
            warn!("Client `run` method called while already running.");
            return;
        }
        while self.is_running.load(Ordering::Relaxed) {
            if !self.is_connected() {
                self.expected_disconnect.store(false, Ordering::Relaxed);
                if let Err(e) = self.connect().await {
                    error!("Failed to connect: {e:?}. Will retry...");
                }
            }

            if self.is_connected() {
                if self.read_events_loop().await.is_err() {
                    warn!("Feed loop exited with an error. Will attempt to reconnect if enabled.");
                } else if self.expected_disconnect.load(Ordering::Relaxed) {
                    debug!("Feed loop exited gracefully (expected disconnect).");
                } else {
                    info!("Feed loop exited gracefully.");
                }
                self.cleanup_connection_state().await;
            }

            if self.expected_disconnect.load(Ordering::Relaxed) {
                self.is_running.store(false, Ordering::Relaxed);
                break;
            }

            if !self.enable_auto_reconnect.load(Ordering::Relaxed) {
                info!("Auto-reconnect disabled, shutting down.");
                self.is_running.store(false, Ordering::Relaxed);
                break;
            }

            let error_count = self.auto_reconnect_errors.fetch_add(1, Ordering::SeqCst);
            let delay = Duration::from_secs((1u64 << error_count.min(5)).min(30));
            info!(
                "Will attempt to reconnect in {:?} (attempt {})",
                delay,
                error_count + 1
            );
            tokio::select! {
                _ = sleep(delay) => {}
                _ = self.shutdown_notifier.notified() => break,
            }
        }
        info!("Client run loop has shut down.");
    }

    /// Establishes the live session for the local user. A call while already
    /// connected is a no-op; a concurrent call while a connect is in flight
    /// is rejected.
    pub async fn connect(self: &Arc<Self>) -> Result<(), anyhow::Error> {
        if self.is_connecting.swap(true, Ordering::SeqCst) {
            return Err(ClientError::AlreadyConnected.into());
        }

        let _guard = scopeguard::guard((), |_| {
            self.is_connecting.store(false, Ordering::Relaxed);
        });

        if self.is_connected() {
            debug!("connect called while already connected");
            return Ok(());
        }

        let (transport, transport_events) =
            self.transport_factory.create_transport(&self.local).await?;

        *self.transport.lock().await = Some(transport);
        *self.transport_events.lock().await = Some(transport_events);
        self.is_connected.store(true, Ordering::Relaxed);
        self.auto_reconnect_errors.store(0, Ordering::Relaxed);

        let client_clone = self.clone();
        tokio::spawn(async move { client_clone.keepalive_loop().await });

        Ok(())
    }

    /// Tears down the session. Safe to call when already disconnected.
    pub async fn disconnect(&self) {
        info!("Disconnecting client intentionally.");
        self.expected_disconnect.store(true, Ordering::Relaxed);
        self.is_running.store(false, Ordering::Relaxed);
        self.shutdown_notifier.notify_waiters();

        if let Some(transport) = self.transport.lock().await.take() {
            transport.disconnect().await;
        }
        self.cleanup_connection_state().await;
    }

    pub(crate) async fn cleanup_connection_state(&self) {
        self.is_connected.store(false, Ordering::Relaxed);
        *self.transport.lock().await = None;
        *self.transport_events.lock().await = None;
    }

    // ---- state snapshots ----

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.lock().await.conversations().to_vec()
    }

    pub async fn active_conversation(&self) -> Option<Conversation> {
        self.state.lock().await.active().cloned()
    }

    pub async fn active_transcript(&self) -> Vec<Message> {
        self.state
            .lock()
            .await
            .active()
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    pub async fn close_conversation(&self) {
        self.state.lock().await.close_active();
    }

    // ---- error surfacing ----

    /// 401 goes to the login redirect channel; everything else becomes an
    /// error-navigation event carrying title/description/code.
    pub(crate) fn publish_api_error(&self, err: &TransportError) {
        if err.kind() == ErrorKind::AuthRequired {
            let _ = self.event_bus.auth_required.send(Arc::new(AuthRequired));
        } else {
            let _ = self
                .event_bus
                .error_redirect
                .send(Arc::new(ErrorRedirect::from(err)));
        }
    }
}
