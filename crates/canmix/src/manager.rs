//! The Manager: owns one engine instance and its lifecycle.
//!
//! The embedding process constructs a `Manager` with its resolved
//! configuration and transport implementations, then calls
//! [`start`](Manager::start) and [`stop`](Manager::stop). There is no
//! ambient global: whatever handles termination signals owns the
//! manager (or a handle to it) and calls `stop` explicitly.
//!
//! Stopping does not discard protocol state. Partially filled receive
//! queues survive a stop, and a subsequent start resumes from them.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use canmix_core::{Accumulator, EngineConfig};
use canmix_engine::{BusChannel, Engine, KeyChannel};
use canmix_store::KeyStore;

use crate::error::{ManagerError, Result};

/// Handle to the spawned engine task.
struct Running<A, B, K, S>
where
    A: Accumulator,
    B: BusChannel,
    K: KeyChannel,
    S: KeyStore,
{
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<Engine<A, B, K, S>>,
}

/// Owns the engine and drives its lifecycle.
pub struct Manager<A, B, K, S>
where
    A: Accumulator + 'static,
    B: BusChannel + 'static,
    K: KeyChannel + 'static,
    S: KeyStore + 'static,
{
    bus: Arc<B>,
    keychan: Arc<K>,
    /// The engine, parked between runs.
    engine: Option<Engine<A, B, K, S>>,
    running: Option<Running<A, B, K, S>>,
}

impl<A, B, K, S> Manager<A, B, K, S>
where
    A: Accumulator + 'static,
    B: BusChannel + 'static,
    K: KeyChannel + 'static,
    S: KeyStore + 'static,
{
    /// Construct a manager and its engine.
    ///
    /// Fails on any configuration error, including an unreadable
    /// persisted key.
    pub async fn new(
        config: EngineConfig,
        accum: A,
        bus: Arc<B>,
        keychan: Arc<K>,
        keystore: Arc<S>,
    ) -> Result<Self> {
        tracing::info!(role = %config.role, "configuring engine");
        let engine = Engine::new(
            config,
            accum,
            Arc::clone(&bus),
            Arc::clone(&keychan),
            keystore,
        )
        .await?;

        Ok(Self {
            bus,
            keychan,
            engine: Some(engine),
            running: None,
        })
    }

    /// Start the transports and the engine event loop.
    pub async fn start(&mut self) -> Result<()> {
        let engine = self.engine.take().ok_or(ManagerError::AlreadyRunning)?;

        tracing::info!("connecting key channel");
        self.keychan.connect().await?;

        tracing::info!("starting bus channel");
        self.bus.start().await?;

        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(engine.run(rx));
        self.running = Some(Running { shutdown, handle });
        Ok(())
    }

    /// Stop the engine and the transports.
    ///
    /// The cycle timer is cancelled without rescheduling, no further
    /// inbound traffic is accepted, and queue state is kept for a
    /// possible restart.
    pub async fn stop(&mut self) -> Result<()> {
        let running = self.running.take().ok_or(ManagerError::NotRunning)?;

        tracing::info!("stopping engine");
        let _ = running.shutdown.send(true);
        let engine = running
            .handle
            .await
            .map_err(|e| ManagerError::TaskJoin(e.to_string()))?;
        tracing::info!("engine stopped");

        if self.bus.is_running() {
            tracing::info!("stopping bus channel");
            self.bus.stop().await?;
        }
        if self.keychan.is_connected() {
            tracing::info!("stopping key channel");
            self.keychan.stop().await?;
        }

        self.engine = Some(engine);
        Ok(())
    }

    /// Whether the engine event loop is currently running.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The parked engine, for inspection between runs.
    ///
    /// `None` while the engine is running.
    pub fn engine(&self) -> Option<&Engine<A, B, K, S>> {
        self.engine.as_ref()
    }
}
