//! Tokio-based WebSocket implementation of the live-feed transport.
//!
//! The feed is read-only from the client's perspective: outgoing messages go
//! through the REST surface and come back confirmed over this connection.
//! The socket is kept open only for frames and keepalive pings.

use async_trait::async_trait;
use bmcore::net::{Transport, TransportEvent, TransportFactory};
use bmcore::types::Username;
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace, warn};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type RawWs = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<RawWs, WsMessage>;
type WsStream = SplitStream<RawWs>;

const EVENT_CHANNEL_CAPACITY: usize = 100;

/// A live connection to the chat feed of one local user.
pub struct FeedSocket {
    ws_sink: Arc<Mutex<Option<WsSink>>>,
}

impl FeedSocket {
    fn new(sink: WsSink) -> Self {
        Self {
            ws_sink: Arc::new(Mutex::new(Some(sink))),
        }
    }
}

#[async_trait]
impl Transport for FeedSocket {
    async fn ping(&self) -> Result<(), anyhow::Error> {
        let mut sink_guard = self.ws_sink.lock().await;
        let sink = sink_guard
            .as_mut()
            .ok_or(super::SocketError::SocketClosed)?;
        sink.send(WsMessage::Ping(Bytes::new()))
            .await
            .map_err(|e| super::SocketError::WebSocket(e.to_string()))?;
        Ok(())
    }

    async fn disconnect(&self) {
        let mut sink_guard = self.ws_sink.lock().await;
        if let Some(mut sink) = sink_guard.take() {
            if let Err(e) = sink.close().await {
                debug!(target: "Socket", "Error closing feed socket: {e}");
            }
        }
    }
}

/// Factory for feed sockets, bound to one feed endpoint.
pub struct FeedSocketFactory {
    feed_url: String,
}

impl FeedSocketFactory {
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
        }
    }
}

#[async_trait]
impl TransportFactory for FeedSocketFactory {
    async fn create_transport(
        &self,
        local: &Username,
    ) -> Result<(Arc<dyn Transport>, mpsc::Receiver<TransportEvent>), anyhow::Error> {
        // The session is keyed by the local identity.
        let url = format!(
            "{}?username={}",
            self.feed_url,
            urlencoding::encode(local.as_str())
        );

        info!(target: "Socket", "Dialing {}", self.feed_url);
        let (ws, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| super::SocketError::WebSocket(e.to_string()))?;

        let (sink, stream) = ws.split();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let transport = Arc::new(FeedSocket::new(sink));

        tokio::task::spawn(read_pump(stream, event_tx.clone()));

        let _ = event_tx.send(TransportEvent::Connected).await;

        Ok((transport, event_rx))
    }
}

async fn read_pump(mut stream: WsStream, event_tx: mpsc::Sender<TransportEvent>) {
    loop {
        match stream.next().await {
            Some(Ok(msg)) => {
                let frame = match msg {
                    WsMessage::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
                    WsMessage::Binary(data) => data,
                    WsMessage::Pong(_) => {
                        trace!(target: "Socket", "<-- pong");
                        continue;
                    }
                    WsMessage::Ping(_) => continue,
                    WsMessage::Close(_) => {
                        trace!(target: "Socket", "Received close frame");
                        break;
                    }
                    _ => continue,
                };
                debug!(target: "Socket", "<-- Received frame: {} bytes", frame.len());
                if event_tx
                    .send(TransportEvent::DataReceived(frame))
                    .await
                    .is_err()
                {
                    warn!(target: "Socket", "Event receiver dropped, closing read pump");
                    return;
                }
            }
            Some(Err(e)) => {
                error!(target: "Socket", "Error reading from websocket: {e}");
                break;
            }
            None => {
                trace!(target: "Socket", "Websocket stream ended");
                break;
            }
        }
    }

    let _ = event_tx.send(TransportEvent::Disconnected).await;
}
