//! End-to-end scenarios over in-memory transports.
//!
//! These run the full manager lifecycle with the engine event loop
//! spawned, under paused tokio time so cycle firings are deterministic.

use std::sync::Arc;
use std::time::Duration;

use canmix::{
    CanFrame, CanId, ChannelPair, EngineConfig, HmacAccumulator, KeyMaterial, Manager, Role,
    DIAG_DIGEST_MISMATCH, LOG_TOPIC,
};
use canmix_engine::{MemoryBus, MemoryKeyChannel};
use canmix_store::{KeyStore, MemoryKeyStore};

type TestManager = Manager<HmacAccumulator, MemoryBus, MemoryKeyChannel, MemoryKeyStore>;

struct Rig {
    manager: TestManager,
    bus: Arc<MemoryBus>,
    keychan: Arc<MemoryKeyChannel>,
    keystore: Arc<MemoryKeyStore>,
    key: KeyMaterial,
}

async fn rig(role: Role) -> Rig {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let bus = Arc::new(MemoryBus::new());
    let keychan = Arc::new(MemoryKeyChannel::new());
    let keystore = Arc::new(MemoryKeyStore::new());
    let config = EngineConfig::new(
        role,
        vec![ChannelPair::new(CanId::new(0x100), CanId::new(0x101))],
    );
    let key = config.initial_key.clone();
    let accum = HmacAccumulator::new(key.clone());
    let manager = Manager::new(
        config,
        accum,
        Arc::clone(&bus),
        Arc::clone(&keychan),
        Arc::clone(&keystore),
    )
    .await
    .unwrap();
    Rig {
        manager,
        bus,
        keychan,
        keystore,
        key,
    }
}

/// The hex wire digest a peer would send for `data` under `key`.
fn wire_digest(key: &KeyMaterial, data: &[u8]) -> Vec<u8> {
    use canmix::Accumulator;
    let mut a = HmacAccumulator::new(key.clone());
    a.insert(data);
    hex::encode(a.encode()).into_bytes()
}

/// Let the engine task drain everything already injected.
///
/// Under paused time, the clock only advances once every task is idle,
/// so returning from this sleep means the loop has caught up.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn sender_emits_data_then_digest_each_cycle() {
    let mut r = rig(Role::Sender).await;
    r.manager.start().await.unwrap();

    let data = r.bus.next_sent().await.unwrap();
    let first_fire = tokio::time::Instant::now();
    assert_eq!(data.id, CanId::new(0x100));
    assert_eq!(data.payload, vec![0xFF; 6]);

    let digest = r.bus.next_sent().await.unwrap();
    assert_eq!(digest.id, CanId::new(0x101));
    assert_eq!(digest.payload, wire_digest(&r.key, &[0xFF; 6]));

    // The next firing is a full period after the previous one.
    let data = r.bus.next_sent().await.unwrap();
    assert_eq!(data.id, CanId::new(0x100));
    assert!(tokio::time::Instant::now() - first_fire >= Duration::from_secs(1));
    let digest = r.bus.next_sent().await.unwrap();
    assert_eq!(digest.id, CanId::new(0x101));

    r.manager.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn listener_verifies_silently_and_reports_mismatch() {
    let mut r = rig(Role::Listener).await;
    r.manager.start().await.unwrap();

    // A good pairing: no diagnostic.
    r.bus
        .inject(CanFrame::new(CanId::new(0x100), b"hello".to_vec()))
        .await;
    r.bus
        .inject(CanFrame::new(CanId::new(0x101), wire_digest(&r.key, b"hello")))
        .await;
    settle().await;
    assert!(r.keychan.published().is_empty());

    // A bad pairing: exactly one diagnostic on the log topic.
    r.bus
        .inject(CanFrame::new(CanId::new(0x100), b"tampered".to_vec()))
        .await;
    r.bus
        .inject(CanFrame::new(CanId::new(0x101), wire_digest(&r.key, b"original")))
        .await;
    settle().await;

    let published = r.keychan.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, LOG_TOPIC);
    assert_eq!(published[0].1, DIAG_DIGEST_MISMATCH);

    r.manager.stop().await.unwrap();
    let engine = r.manager.engine().unwrap();
    assert_eq!(engine.stats().verifications, 2);
    assert_eq!(engine.stats().verified, 1);
    assert_eq!(engine.stats().unverified, 1);
}

#[tokio::test(start_paused = true)]
async fn restart_resumes_with_queues_intact() {
    let mut r = rig(Role::Listener).await;
    r.manager.start().await.unwrap();

    // A data frame with no digest yet.
    r.bus
        .inject(CanFrame::new(CanId::new(0x100), b"pending".to_vec()))
        .await;
    settle().await;
    r.manager.stop().await.unwrap();

    let engine = r.manager.engine().unwrap();
    assert_eq!(engine.queues().pair(0).data.len(), 1);
    assert_eq!(engine.stats().verifications, 0);

    // The digest arriving after restart completes the old pairing.
    r.manager.start().await.unwrap();
    r.bus
        .inject(CanFrame::new(CanId::new(0x101), wire_digest(&r.key, b"pending")))
        .await;
    settle().await;
    r.manager.stop().await.unwrap();

    let engine = r.manager.engine().unwrap();
    assert_eq!(engine.stats().verified, 1);
    assert!(engine.queues().pair(0).data.is_empty());
}

#[tokio::test(start_paused = true)]
async fn sender_frames_verify_on_a_listener() {
    let mut sender = rig(Role::Sender).await;
    let mut listener = rig(Role::Listener).await;
    sender.manager.start().await.unwrap();
    listener.manager.start().await.unwrap();

    // Pump one cycle's pair across the "bus".
    for _ in 0..2 {
        let frame = sender.bus.next_sent().await.unwrap();
        listener.bus.inject(frame).await;
    }
    settle().await;

    assert!(listener.keychan.published().is_empty());
    sender.manager.stop().await.unwrap();
    listener.manager.stop().await.unwrap();

    let engine = listener.manager.engine().unwrap();
    assert_eq!(engine.stats().verified, 1);
}

#[tokio::test(start_paused = true)]
async fn verifier_answers_data_frames_with_digests() {
    let mut verifier = rig(Role::Verifier).await;
    let mut listener = rig(Role::Listener).await;
    verifier.manager.start().await.unwrap();
    listener.manager.start().await.unwrap();

    // The verifier sees a data frame and emits the digest; the listener
    // sees both and verifies.
    let data = CanFrame::new(CanId::new(0x100), b"observed".to_vec());
    verifier.bus.inject(data.clone()).await;
    listener.bus.inject(data).await;

    let digest = verifier.bus.next_sent().await.unwrap();
    assert_eq!(digest.id, CanId::new(0x101));
    listener.bus.inject(digest.clone()).await;
    // The verifier keeps its listener half: the same digest completes
    // its own queued pairing.
    verifier.bus.inject(digest).await;
    settle().await;

    assert!(listener.keychan.published().is_empty());
    verifier.manager.stop().await.unwrap();
    listener.manager.stop().await.unwrap();
    assert_eq!(listener.manager.engine().unwrap().stats().verified, 1);
    assert_eq!(verifier.manager.engine().unwrap().stats().verified, 1);
}

#[tokio::test(start_paused = true)]
async fn rotated_key_applies_to_subsequent_cycles() {
    let mut r = rig(Role::Sender).await;
    r.manager.start().await.unwrap();

    // First pair under the initial key.
    let _ = r.bus.next_sent().await.unwrap();
    let digest = r.bus.next_sent().await.unwrap();
    assert_eq!(digest.payload, wire_digest(&r.key, &[0xFF; 6]));

    let new_key = KeyMaterial::from_bytes(b"rotated-material".as_slice());
    r.keychan.rotate_key(new_key.as_bytes().to_vec()).await;
    settle().await;

    // Next pair is digested under the rotated key.
    let _ = r.bus.next_sent().await.unwrap();
    let digest = r.bus.next_sent().await.unwrap();
    assert_eq!(digest.payload, wire_digest(&new_key, &[0xFF; 6]));

    // And the rotation was persisted for the next run.
    let stored = r.keystore.read_last_key().await.unwrap().unwrap();
    assert_eq!(stored, new_key);

    r.manager.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn empty_key_rotation_is_ignored_and_restart_survives() {
    let mut r = rig(Role::Listener).await;
    r.manager.start().await.unwrap();

    r.keychan.rotate_key(Vec::<u8>::new()).await;
    settle().await;
    r.manager.stop().await.unwrap();

    // Nothing was persisted, so the next start cannot trip over an
    // unusable stored key.
    assert!(r.keystore.read_last_key().await.unwrap().is_none());

    r.manager.start().await.unwrap();
    r.bus
        .inject(CanFrame::new(CanId::new(0x100), b"after".to_vec()))
        .await;
    r.bus
        .inject(CanFrame::new(CanId::new(0x101), wire_digest(&r.key, b"after")))
        .await;
    settle().await;
    r.manager.stop().await.unwrap();
    assert_eq!(r.manager.engine().unwrap().stats().verified, 1);
}

#[tokio::test(start_paused = true)]
async fn unrelated_traffic_is_ignored() {
    let mut r = rig(Role::Listener).await;
    r.manager.start().await.unwrap();

    for id in [0x42u32, 0x1FF, 0x700] {
        r.bus
            .inject(CanFrame::new(CanId::new(id), vec![0xAB; 4]))
            .await;
    }
    settle().await;

    assert!(r.keychan.published().is_empty());
    r.manager.stop().await.unwrap();
    let engine = r.manager.engine().unwrap();
    assert_eq!(engine.stats().verifications, 0);
    assert!(engine.queues().pair(0).data.is_empty());
    assert!(engine.queues().pair(0).digest.is_empty());
}
