pub use crate::socket::{FeedSocket, FeedSocketFactory};
pub use bmcore::net::{Transport, TransportEvent, TransportFactory};

/// In-memory transport doubles for tests. Public so integration tests can
/// drive the feed without a server.
pub mod mock {
    use super::*;
    use async_trait::async_trait;
    use bmcore::types::Username;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{Mutex, mpsc};

    /// A transport that records calls and never fails.
    #[derive(Default)]
    pub struct MockTransport {
        pub pings: AtomicUsize,
        pub disconnects: AtomicUsize,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn ping(&self) -> Result<(), anyhow::Error> {
            self.pings.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn disconnect(&self) {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// A factory whose first connection is fed from a scripted event channel.
    /// Later connections (reconnects) get a channel that stays silent.
    pub struct MockTransportFactory {
        feed: Mutex<Option<mpsc::Receiver<TransportEvent>>>,
        parked_senders: Mutex<Vec<mpsc::Sender<TransportEvent>>>,
        pub transport: Arc<MockTransport>,
        pub connects: AtomicUsize,
    }

    impl MockTransportFactory {
        pub fn new() -> (Arc<Self>, mpsc::Sender<TransportEvent>) {
            let (tx, rx) = mpsc::channel(16);
            let factory = Arc::new(Self {
                feed: Mutex::new(Some(rx)),
                parked_senders: Mutex::new(Vec::new()),
                transport: Arc::new(MockTransport::default()),
                connects: AtomicUsize::new(0),
            });
            (factory, tx)
        }
    }

    #[async_trait]
    impl TransportFactory for MockTransportFactory {
        async fn create_transport(
            &self,
            _local: &Username,
        ) -> Result<(Arc<dyn Transport>, mpsc::Receiver<TransportEvent>), anyhow::Error> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            let rx = match self.feed.lock().await.take() {
                Some(rx) => rx,
                None => {
                    // Park the sender so the feed stays open but idle.
                    let (tx, rx) = mpsc::channel(1);
                    self.parked_senders.lock().await.push(tx);
                    rx
                }
            };
            Ok((self.transport.clone(), rx))
        }
    }
}
