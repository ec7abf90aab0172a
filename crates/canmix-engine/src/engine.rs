//! The correlation engine.
//!
//! One engine instance owns the per-pair receive queues, the live key,
//! the accumulator, and (for the sender role) the cycle timer. All three
//! event sources — inbound bus frames, key rotations, and the cycle
//! deadline — are drained by a single event loop, so accumulator usage
//! per pairing is never interleaved, queue operations are linearizable,
//! key replacement is atomic, and cycle firings are serialized.
//!
//! ## Roles
//!
//! - `Sender`: emits a data/digest frame pair on each cycle firing.
//! - `Listener`: queues inbound frames per pair and verifies each
//!   completed pairing FIFO.
//! - `Verifier`: a listener that also re-sends — verifies completed
//!   pairings like a listener and additionally answers each inbound
//!   data frame with the matching digest frame.

use std::sync::Arc;

use tokio::sync::watch;

use canmix_core::{
    Accumulator, CanFrame, CanId, ConfigError, EngineConfig, KeyMaterial, Role,
};
use canmix_store::KeyStore;

use crate::bus::BusChannel;
use crate::cycle::{self, CycleState, CycleTimer};
use crate::error::Result;
use crate::keychan::{KeyChannel, LOG_TOPIC};
use crate::queue::ReceiveQueues;
use crate::registry::{ChannelRegistry, Classification};

/// Diagnostic published when a digest fails verification.
pub const DIAG_DIGEST_MISMATCH: &str = "digest not verified";
/// Diagnostic published when a digest frame does not decode as hex.
pub const DIAG_DIGEST_FORMAT: &str = "digest format error";

/// Counters exposed for observation and tests.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    /// Completed verification attempts (each consumed one pairing).
    pub verifications: u64,
    /// Attempts that verified.
    pub verified: u64,
    /// Attempts that did not verify, malformed digests included.
    pub unverified: u64,
    /// Cycle firings.
    pub cycles_fired: u64,
}

/// Outcome of one verification attempt.
enum VerifyOutcome {
    Verified,
    Mismatch,
    Malformed,
}

/// The correlation and transmission-cycle engine.
///
/// Generic over its four collaborators: the accumulator, the bus
/// transport, the key channel, and the key store.
pub struct Engine<A, B, K, S>
where
    A: Accumulator,
    B: BusChannel,
    K: KeyChannel,
    S: KeyStore,
{
    config: EngineConfig,
    registry: ChannelRegistry,
    queues: ReceiveQueues,
    key: KeyMaterial,
    /// Set on rotation; the accumulator is reseeded before the next
    /// insert, never mid-pairing.
    rekey_pending: bool,
    accum: A,
    bus: Arc<B>,
    keychan: Arc<K>,
    keystore: Arc<S>,
    timer: Option<CycleTimer>,
    stats: EngineStats,
}

impl<A, B, K, S> Engine<A, B, K, S>
where
    A: Accumulator,
    B: BusChannel,
    K: KeyChannel,
    S: KeyStore,
{
    /// Construct an engine.
    ///
    /// Validates the configuration and the pair bijection, and loads the
    /// persisted key if one exists (falling back to the configured
    /// initial key). A key store read failure is fatal here; the engine
    /// never starts with ambiguous key state.
    pub async fn new(
        config: EngineConfig,
        mut accum: A,
        bus: Arc<B>,
        keychan: Arc<K>,
        keystore: Arc<S>,
    ) -> Result<Self> {
        config.validate()?;
        let registry = ChannelRegistry::new(&config.pairs)?;

        let key = match keystore.read_last_key().await {
            Ok(Some(key)) => {
                tracing::info!("resuming with persisted key");
                key
            }
            Ok(None) => config.initial_key.clone(),
            Err(e) => return Err(ConfigError::KeyUnreadable(e.to_string()).into()),
        };
        accum.reseed(&key);

        let timer = match (config.role, &config.cycle) {
            (Role::Sender, Some(cycle)) => Some(CycleTimer::new(cycle.period)),
            _ => None,
        };
        let queues = ReceiveQueues::new(registry.len(), &config.queue);

        Ok(Self {
            config,
            registry,
            queues,
            key,
            rekey_pending: false,
            accum,
            bus,
            keychan,
            keystore,
            timer,
            stats: EngineStats::default(),
        })
    }

    /// The engine's role.
    pub fn role(&self) -> Role {
        self.config.role
    }

    /// Counter snapshot.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Receive queue state, for inspection.
    pub fn queues(&self) -> &ReceiveQueues {
        &self.queues
    }

    /// The currently live key.
    pub fn current_key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Current cycle timer state; `Idle` for non-sender roles.
    pub fn cycle_state(&self) -> CycleState {
        self.timer
            .as_ref()
            .map(CycleTimer::state)
            .unwrap_or(CycleState::Idle)
    }

    /// Run the event loop until `shutdown` signals.
    ///
    /// Returns the engine with queue state intact, so a subsequent run
    /// resumes where this one stopped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Self {
        if let Some(timer) = &mut self.timer {
            timer.arm();
        }
        tracing::info!(role = %self.config.role, pairs = self.registry.len(), "engine running");

        let mut bus_closed = false;
        let mut keys_closed = false;

        loop {
            let deadline = self.timer.as_ref().and_then(CycleTimer::deadline);
            let bus = Arc::clone(&self.bus);
            let keychan = Arc::clone(&self.keychan);

            tokio::select! {
                _ = shutdown.changed() => break,

                res = bus.recv(), if !bus_closed => match res {
                    Ok(Some(frame)) => self.handle_frame(frame).await,
                    Ok(None) => {
                        tracing::warn!("bus channel closed");
                        bus_closed = true;
                    }
                    Err(e) => tracing::warn!(error = %e, "bus receive failed"),
                },

                res = keychan.recv_key(), if !keys_closed => match res {
                    Ok(Some(payload)) => self.handle_key_rotation(payload).await,
                    Ok(None) => {
                        tracing::warn!("key channel closed");
                        keys_closed = true;
                    }
                    Err(e) => tracing::warn!(error = %e, "key receive failed"),
                },

                _ = cycle::sleep_until_deadline(deadline), if deadline.is_some() => {
                    self.fire_cycle().await;
                }
            }
        }

        if let Some(timer) = &mut self.timer {
            timer.disarm();
        }
        tracing::info!(role = %self.config.role, "engine stopped");
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Inbound dispatch
    // ─────────────────────────────────────────────────────────────────────

    async fn handle_frame(&mut self, frame: CanFrame) {
        tracing::trace!(id = %frame.id, len = frame.payload.len(), "frame received");
        match self.config.role {
            // The sender is cycle-driven; inbound traffic is not its
            // concern.
            Role::Sender => {}
            Role::Listener => self.dispatch(frame).await,
            // The verifier is a listener that also re-sends: data
            // frames are answered with their digest frame, then both
            // frame kinds take the queue/verify path.
            Role::Verifier => {
                self.respond(frame.clone()).await;
                self.dispatch(frame).await;
            }
        }
    }

    /// Listener path: queue the frame, and on digest arrival attempt a
    /// verification. Digest frames follow their data frame on the bus,
    /// so digest arrival is the only verification trigger.
    async fn dispatch(&mut self, frame: CanFrame) {
        match self.registry.classify(frame.id) {
            Classification::Data(i) => {
                if self.queues.pair_mut(i).data.push(frame.payload).is_some() {
                    tracing::warn!(pair = i, "data queue full, dropped oldest entry");
                }
            }
            Classification::Digest(i) => {
                if self.queues.pair_mut(i).digest.push(frame.payload).is_some() {
                    tracing::warn!(pair = i, "digest queue full, dropped oldest entry");
                }
                self.try_verify(i).await;
            }
            Classification::Unrelated => {}
        }
    }

    /// Response path: answer a data frame with its digest frame in the
    /// same handling step, without consulting the queues. Unrecognized
    /// identifiers and digest frames are pure misses here; the
    /// verifier's queueing happens in [`dispatch`](Self::dispatch).
    async fn respond(&mut self, frame: CanFrame) {
        let Classification::Data(i) = self.registry.classify(frame.id) else {
            return;
        };
        self.ensure_key();
        self.accum.insert(&frame.payload);
        let digest = self.accum.encode();
        self.accum.reset();

        let pair = self.registry.pair(i);
        self.send_digest(pair.digest_id, &digest).await;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Verification protocol
    // ─────────────────────────────────────────────────────────────────────

    /// Consume the oldest pairing of pair `i` and verify it.
    ///
    /// A no-op while either queue is empty. The accumulator is reset on
    /// every path that inserted, so no residual state leaks into the
    /// next pairing.
    async fn try_verify(&mut self, i: usize) {
        if !self.queues.pair(i).ready() {
            tracing::debug!(pair = i, "pairing incomplete, waiting for counterpart");
            return;
        }
        let pq = self.queues.pair_mut(i);
        let (Some(data), Some(digest_wire)) = (pq.data.pop(), pq.digest.pop()) else {
            return;
        };

        self.ensure_key();
        self.stats.verifications += 1;
        self.accum.insert(&data);

        let outcome = match decode_digest(&digest_wire) {
            Some(raw) if self.accum.verify(&raw) => VerifyOutcome::Verified,
            Some(_) => VerifyOutcome::Mismatch,
            // Fail closed: unverifiable means not verified.
            None => VerifyOutcome::Malformed,
        };

        match outcome {
            VerifyOutcome::Verified => {
                self.stats.verified += 1;
                tracing::debug!(pair = i, "pairing verified");
            }
            VerifyOutcome::Mismatch => {
                self.stats.unverified += 1;
                tracing::warn!(pair = i, "pairing failed verification");
                self.publish_diag(DIAG_DIGEST_MISMATCH).await;
            }
            VerifyOutcome::Malformed => {
                self.stats.unverified += 1;
                tracing::warn!(pair = i, "digest frame is not valid hex");
                self.publish_diag(DIAG_DIGEST_FORMAT).await;
            }
        }

        self.accum.reset();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transmission cycle
    // ─────────────────────────────────────────────────────────────────────

    /// One cycle firing: digest the configured payload and emit the
    /// data frame followed by the digest frame.
    ///
    /// The two sends are not atomic with respect to the bus. A failure
    /// after the first frame leaves the pair incomplete; there is no
    /// mid-cycle retry, the next firing starts fresh.
    async fn fire_cycle(&mut self) {
        let Some(cycle) = self.config.cycle.clone() else {
            return;
        };
        let pair = self.registry.pair(cycle.pair);

        self.ensure_key();
        self.accum.insert(&cycle.payload);
        let digest = self.accum.encode();
        self.accum.reset();
        self.stats.cycles_fired += 1;

        tracing::debug!(data_id = %pair.data_id, "cycle firing");
        match self
            .bus
            .send(pair.data_id, &cycle.payload, pair.data_id.is_extended_range())
            .await
        {
            Ok(()) => self.send_digest(pair.digest_id, &digest).await,
            Err(e) => {
                tracing::warn!(error = %e, "cycle data frame send failed, pair skipped")
            }
        }

        // Re-arm from the firing instant, not the original schedule.
        if let Some(timer) = &mut self.timer {
            timer.arm();
        }
    }

    async fn send_digest(&self, id: CanId, digest: &[u8]) {
        let wire = hex::encode(digest);
        if let Err(e) = self
            .bus
            .send(id, wire.as_bytes(), id.is_extended_range())
            .await
        {
            tracing::warn!(error = %e, id = %id, "digest frame send failed, pair left incomplete");
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Key lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Install rotated key material.
    ///
    /// The replacement is wholesale and, because it happens on the event
    /// loop, atomic with respect to any verification or firing. The
    /// accumulator keeps its current seed until the next insert.
    async fn handle_key_rotation(&mut self, payload: Vec<u8>) {
        // An empty key would be rejected at the next construction, so
        // installing or persisting it can only wedge a restart.
        if payload.is_empty() {
            tracing::warn!("ignoring empty rotated key payload");
            return;
        }
        tracing::info!(len = payload.len(), "key rotated");
        self.key = KeyMaterial::from(payload);
        self.rekey_pending = true;

        if let Err(e) = self.keystore.write_last_key(&self.key).await {
            tracing::warn!(error = %e, "failed to persist rotated key");
        }
    }

    /// Apply a pending rotation before the accumulator's next use.
    fn ensure_key(&mut self) {
        if self.rekey_pending {
            self.accum.reseed(&self.key);
            self.rekey_pending = false;
        }
    }

    async fn publish_diag(&self, message: &str) {
        if let Err(e) = self.keychan.publish(LOG_TOPIC, message).await {
            tracing::warn!(error = %e, "diagnostic publish failed");
        }
    }
}

/// Decode a digest frame payload: UTF-8 hex on the wire.
fn decode_digest(wire: &[u8]) -> Option<Vec<u8>> {
    let s = std::str::from_utf8(wire).ok()?;
    hex::decode(s.trim()).ok()
}
