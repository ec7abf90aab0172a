//! Bus channel abstraction: the CAN transport seam.
//!
//! The engine never touches the link layer; it consumes inbound frames
//! and emits outbound frames through this trait. Implementations may
//! wrap SocketCAN, a serial adapter, or any other transport.

use async_trait::async_trait;

use canmix_core::{CanFrame, CanId};

use crate::error::Result;

/// Transport trait for the CAN bus.
///
/// Implementations must be thread-safe (Send + Sync). `recv` is the
/// message-passing form of the transport's inbound callback: the engine
/// awaits it from its event loop, so delivery order is preserved and
/// handling is serialized.
#[async_trait]
pub trait BusChannel: Send + Sync {
    /// Start the transport.
    async fn start(&self) -> Result<()>;

    /// Stop the transport. No further frames are delivered after this
    /// returns.
    async fn stop(&self) -> Result<()>;

    /// Whether the transport is currently running.
    fn is_running(&self) -> bool;

    /// Send one frame.
    async fn send(&self, id: CanId, payload: &[u8], extended: bool) -> Result<()>;

    /// Receive the next inbound frame.
    ///
    /// Returns `Ok(None)` when the transport has shut down and no more
    /// frames will arrive.
    async fn recv(&self) -> Result<Option<CanFrame>>;
}

/// A simple in-memory bus for testing.
///
/// Tests inject inbound frames and inspect what the engine sent.
pub mod memory {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::{mpsc, Mutex};

    use crate::error::EngineError;

    /// In-memory bus implementation.
    pub struct MemoryBus {
        running: AtomicBool,
        inbound_tx: mpsc::Sender<CanFrame>,
        inbound_rx: Mutex<mpsc::Receiver<CanFrame>>,
        outbound_tx: mpsc::UnboundedSender<CanFrame>,
        outbound_rx: Mutex<mpsc::UnboundedReceiver<CanFrame>>,
        skip_sends: AtomicUsize,
        fail_sends: AtomicUsize,
    }

    impl MemoryBus {
        /// Create a new bus with an empty segment.
        pub fn new() -> Self {
            let (inbound_tx, inbound_rx) = mpsc::channel(1000);
            let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
            Self {
                running: AtomicBool::new(false),
                inbound_tx,
                inbound_rx: Mutex::new(inbound_rx),
                outbound_tx,
                outbound_rx: Mutex::new(outbound_rx),
                skip_sends: AtomicUsize::new(0),
                fail_sends: AtomicUsize::new(0),
            }
        }

        /// Deliver a frame to the engine, as if it arrived on the bus.
        pub async fn inject(&self, frame: CanFrame) {
            self.inbound_tx
                .send(frame)
                .await
                .expect("memory bus inbound channel closed");
        }

        /// Await the next frame the engine sent.
        pub async fn next_sent(&self) -> Option<CanFrame> {
            self.outbound_rx.lock().await.recv().await
        }

        /// Take the next sent frame without waiting.
        pub async fn try_next_sent(&self) -> Option<CanFrame> {
            self.outbound_rx.lock().await.try_recv().ok()
        }

        /// Make the next `n` sends fail, to exercise mid-cycle transport
        /// errors.
        pub fn fail_next_sends(&self, n: usize) {
            self.fail_sends_after(0, n);
        }

        /// Let `skip` sends through, then fail the following `n`.
        pub fn fail_sends_after(&self, skip: usize, n: usize) {
            self.skip_sends.store(skip, Ordering::SeqCst);
            self.fail_sends.store(n, Ordering::SeqCst);
        }
    }

    impl Default for MemoryBus {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl BusChannel for MemoryBus {
        async fn start(&self) -> Result<()> {
            self.running.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) -> Result<()> {
            self.running.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.running.load(Ordering::SeqCst)
        }

        async fn send(&self, id: CanId, payload: &[u8], extended: bool) -> Result<()> {
            let skip = self.skip_sends.load(Ordering::SeqCst);
            if skip > 0 {
                self.skip_sends.store(skip - 1, Ordering::SeqCst);
            } else {
                let remaining = self.fail_sends.load(Ordering::SeqCst);
                if remaining > 0 {
                    self.fail_sends.store(remaining - 1, Ordering::SeqCst);
                    return Err(EngineError::Bus("injected send failure".into()));
                }
            }
            self.outbound_tx
                .send(CanFrame::with_extended(id, payload.to_vec(), extended))
                .map_err(|_| EngineError::Bus("bus segment closed".into()))?;
            Ok(())
        }

        async fn recv(&self) -> Result<Option<CanFrame>> {
            Ok(self.inbound_rx.lock().await.recv().await)
        }
    }

}
