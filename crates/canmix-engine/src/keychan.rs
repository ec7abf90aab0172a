//! Key channel abstraction: the asynchronous pub/sub seam.
//!
//! Rotated key material arrives here, and verification-failure
//! diagnostics leave here. Implementations typically wrap an MQTT
//! client; the engine only sees this trait.

use async_trait::async_trait;

use crate::error::Result;

/// Topic used for diagnostic publications.
pub const LOG_TOPIC: &str = "log";

/// Transport trait for key distribution and diagnostics.
///
/// `recv_key` is the message-passing form of the transport's inbound
/// callback; the engine awaits it from its event loop.
#[async_trait]
pub trait KeyChannel: Send + Sync {
    /// Connect to the channel.
    async fn connect(&self) -> Result<()>;

    /// Disconnect. No further keys are delivered after this returns.
    async fn stop(&self) -> Result<()>;

    /// Whether the channel is currently connected.
    fn is_connected(&self) -> bool;

    /// Publish a diagnostic message.
    async fn publish(&self, topic: &str, message: &str) -> Result<()>;

    /// Receive the next rotated key payload.
    ///
    /// Returns `Ok(None)` when the channel has shut down.
    async fn recv_key(&self) -> Result<Option<Vec<u8>>>;
}

/// A simple in-memory key channel for testing.
pub mod memory {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::{mpsc, Mutex};

    /// In-memory key channel implementation.
    ///
    /// Tests inject key rotations and inspect published diagnostics.
    pub struct MemoryKeyChannel {
        connected: AtomicBool,
        key_tx: mpsc::Sender<Vec<u8>>,
        key_rx: Mutex<mpsc::Receiver<Vec<u8>>>,
        published: StdMutex<Vec<(String, String)>>,
    }

    impl MemoryKeyChannel {
        /// Create a new channel.
        pub fn new() -> Self {
            let (key_tx, key_rx) = mpsc::channel(16);
            Self {
                connected: AtomicBool::new(false),
                key_tx,
                key_rx: Mutex::new(key_rx),
                published: StdMutex::new(Vec::new()),
            }
        }

        /// Deliver a rotated key to the engine.
        pub async fn rotate_key(&self, key: impl Into<Vec<u8>>) {
            self.key_tx
                .send(key.into())
                .await
                .expect("memory key channel closed");
        }

        /// All diagnostics published so far, as `(topic, message)`.
        pub fn published(&self) -> Vec<(String, String)> {
            self.published.lock().expect("lock poisoned").clone()
        }
    }

    impl Default for MemoryKeyChannel {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl KeyChannel for MemoryKeyChannel {
        async fn connect(&self) -> Result<()> {
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) -> Result<()> {
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn publish(&self, topic: &str, message: &str) -> Result<()> {
            self.published
                .lock()
                .expect("lock poisoned")
                .push((topic.to_string(), message.to_string()));
            Ok(())
        }

        async fn recv_key(&self) -> Result<Option<Vec<u8>>> {
            Ok(self.key_rx.lock().await.recv().await)
        }
    }

}
