//! Tests for DhtService

use super::*;
use crate::domain::{Contact, DhtConfig, DhtError, NodeId, StartError, Timestamp, NODE_ID_LEN};
use crate::ports::{DhtApi, TimeSource};
use crate::test_utils::{ManualTimeSource, RecordingProbe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const START: u64 = 5_000_000;

/// NodeId with a single bit set, so ids built from different bits land in
/// different buckets of a table whose local id is zero.
fn bit_id(bit: usize) -> NodeId {
    let mut bytes = [0u8; NODE_ID_LEN];
    bytes[NODE_ID_LEN - 1 - bit / 8] = 1 << (bit % 8);
    NodeId::from_bytes(bytes)
}

fn make_contact(id: NodeId) -> Contact {
    Contact::new("192.168.1.10", 7000, id, Timestamp::new(0))
}

fn setup(config: DhtConfig) -> (DhtService, Arc<ManualTimeSource>, Arc<RecordingProbe>) {
    let clock = Arc::new(ManualTimeSource::new(START));
    let probe = Arc::new(RecordingProbe::new());
    let service =
        DhtService::with_ports(NodeId::zero(), config, probe.clone(), clock.clone()).unwrap();
    (service, clock, probe)
}

/// Sweep thread effectively parked for the duration of a test.
fn quiet_config() -> DhtConfig {
    DhtConfig {
        refresh_interval: Duration::from_secs(3600),
        ..DhtConfig::for_testing()
    }
}

#[test]
fn test_service_starts_running_and_stops_once() {
    let (service, _, _) = setup(quiet_config());
    assert_eq!(service.state(), ServiceState::Running);
    assert!(service.is_running());

    service.shutdown();
    assert_eq!(service.state(), ServiceState::Stopped);
    assert!(service.routing_table().is_closed());

    // Second shutdown is a no-op
    service.shutdown();
    assert_eq!(service.state(), ServiceState::Stopped);
}

#[test]
fn test_shutdown_does_not_wait_out_the_interval() {
    let (service, _, _) = setup(quiet_config());

    let started = Instant::now();
    service.shutdown();
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_add_peer_stamps_last_seen_and_clears_expired() {
    let (service, clock, _) = setup(quiet_config());
    clock.advance(Duration::from_secs(3));

    let mut contact = make_contact(bit_id(10));
    contact.expired = true;
    service.add_peer(contact).unwrap();

    let stored = service.get_peer(&bit_id(10)).unwrap();
    assert_eq!(stored.last_seen, Timestamp::new(START + 3000));
    assert!(!stored.expired);
    assert_eq!(service.get_peer_count(), 1);
}

#[test]
fn test_add_peer_rejects_invalid_contact() {
    let (service, _, _) = setup(quiet_config());

    let no_host = Contact::new("", 7000, bit_id(1), Timestamp::new(0));
    assert_eq!(service.add_peer(no_host), Err(DhtError::InvalidContact));

    let no_port = Contact::new("10.0.0.1", 0, bit_id(1), Timestamp::new(0));
    assert_eq!(service.add_peer(no_port), Err(DhtError::InvalidContact));

    assert_eq!(
        service.add_peer(make_contact(NodeId::zero())),
        Err(DhtError::InvalidContact)
    );
    assert_eq!(service.get_peer_count(), 0);
}

#[test]
fn test_global_peer_limit() {
    let config = DhtConfig {
        max_peers: 3,
        ..quiet_config()
    };
    let (service, _, _) = setup(config);

    for bit in 0..3 {
        service.add_peer(make_contact(bit_id(bit))).unwrap();
    }
    // Bucket 100 is empty, the table-wide cap still applies
    assert_eq!(
        service.add_peer(make_contact(bit_id(100))),
        Err(DhtError::PeerLimitExceeded)
    );
    assert_eq!(service.get_peer_count(), 3);
    assert!(service.get_peer(&bit_id(100)).is_none());
}

#[test]
fn test_find_closest_peers_defaults_to_k() {
    let (service, _, _) = setup(quiet_config());
    for bit in 0..8 {
        service.add_peer(make_contact(bit_id(bit))).unwrap();
    }

    let target = bit_id(3);
    let closest = service.find_closest_peers(&target, None);
    assert_eq!(closest.len(), service.config().k);
    assert_eq!(closest[0].node_id, target);

    let all = service.find_closest_peers(&target, Some(50));
    assert_eq!(all.len(), 8);
}

#[test]
fn test_refresh_removes_stale_contacts() {
    let (service, clock, _) = setup(quiet_config());
    service.add_peer(make_contact(bit_id(1))).unwrap();
    clock.advance(Duration::from_secs(3));
    service.add_peer(make_contact(bit_id(2))).unwrap();

    // bit 1 is now 5s old, bit 2 is 2s old
    clock.advance(Duration::from_secs(2));
    service.refresh();

    assert!(service.get_peer(&bit_id(1)).is_none());
    assert!(service.get_peer(&bit_id(2)).is_some());
    assert_eq!(service.get_peer_count(), 1);
}

#[test]
fn test_background_sweep_removes_stale_contacts() {
    let config = DhtConfig {
        refresh_interval: Duration::from_millis(10),
        ..DhtConfig::for_testing()
    };
    let (service, clock, _) = setup(config);
    service.add_peer(make_contact(bit_id(7))).unwrap();
    clock.advance(Duration::from_secs(60));

    let deadline = Instant::now() + Duration::from_secs(5);
    while service.get_peer_count() > 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(service.get_peer_count(), 0);
}

#[test]
fn test_stopped_service_refuses_mutations() {
    let (service, clock, _) = setup(quiet_config());
    service.add_peer(make_contact(bit_id(4))).unwrap();
    service.shutdown();

    assert_eq!(
        service.add_peer(make_contact(bit_id(5))),
        Err(DhtError::Stopped)
    );

    // refresh is a no-op, reads still work
    clock.advance(Duration::from_secs(60));
    service.refresh();
    assert_eq!(service.get_peer_count(), 1);
    assert!(service.get_peer(&bit_id(4)).is_some());
}

#[test]
fn test_full_bucket_probe_goes_through_service() {
    let (service, _, probe) = setup(quiet_config());
    // Bits 159 with distinct low bytes share bucket 159
    let ids: Vec<NodeId> = (1..=4u8)
        .map(|i| {
            let mut bytes = [0u8; NODE_ID_LEN];
            bytes[0] = 0x80;
            bytes[NODE_ID_LEN - 1] = i;
            NodeId::from_bytes(bytes)
        })
        .collect();

    for id in &ids {
        service.add_peer(make_contact(*id)).unwrap();
    }
    assert_eq!(probe.pending(), 1);
    assert_eq!(probe.probed()[0].node_id, ids[0]);

    assert!(probe.complete_next(false));
    assert!(service.get_peer(&ids[0]).is_none());
    assert!(service.get_peer(&ids[3]).is_some());
    assert_eq!(service.get_peer_count(), 3);
}

#[test]
fn test_self_identifier_is_never_stored() {
    let local = bit_id(50);
    let service = DhtService::with_ports(
        local,
        quiet_config(),
        Arc::new(RecordingProbe::new()),
        Arc::new(ManualTimeSource::new(START)),
    )
    .unwrap();

    assert_eq!(service.get_self_identifier(), local);
    assert_eq!(
        service.add_peer(make_contact(local)),
        Err(DhtError::SelfContact)
    );
    assert_eq!(service.get_peer_count(), 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = DhtConfig {
        k: 0,
        ..DhtConfig::for_testing()
    };
    let result = DhtService::new(NodeId::random(), config);
    assert!(matches!(result, Err(StartError::Config(_))));
}

#[test]
fn test_drop_joins_sweep_thread() {
    let (service, _, _) = setup(DhtConfig {
        refresh_interval: Duration::from_millis(5),
        ..DhtConfig::for_testing()
    });
    std::thread::sleep(Duration::from_millis(20));

    let started = Instant::now();
    drop(service);
    assert!(started.elapsed() < Duration::from_secs(5));
}

/// Clock that blocks the first `now()` made by the sweep thread once armed,
/// holding that sweep in flight.
struct SweepStallClock {
    inner: ManualTimeSource,
    armed: AtomicBool,
    entered: AtomicBool,
    stall: Duration,
}

impl TimeSource for SweepStallClock {
    fn now(&self) -> Timestamp {
        let on_sweep_thread = std::thread::current().name() == Some("dht-refresh");
        if on_sweep_thread && self.armed.swap(false, Ordering::SeqCst) {
            self.entered.store(true, Ordering::SeqCst);
            std::thread::sleep(self.stall);
        }
        self.inner.now()
    }
}

#[test]
fn test_stopped_is_reported_only_after_sweep_finishes() {
    let clock = Arc::new(SweepStallClock {
        inner: ManualTimeSource::new(START),
        armed: AtomicBool::new(false),
        entered: AtomicBool::new(false),
        stall: Duration::from_millis(400),
    });
    let config = DhtConfig {
        refresh_interval: Duration::from_millis(10),
        ..DhtConfig::for_testing()
    };
    let service = DhtService::with_ports(
        NodeId::zero(),
        config,
        Arc::new(RecordingProbe::new()),
        clock.clone(),
    )
    .unwrap();

    service.add_peer(make_contact(bit_id(9))).unwrap();
    clock.armed.store(true, Ordering::SeqCst);
    clock.inner.advance(Duration::from_secs(60));

    let deadline = Instant::now() + Duration::from_secs(5);
    while !clock.entered.load(Ordering::SeqCst) && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(2));
    }
    assert!(clock.entered.load(Ordering::SeqCst));

    std::thread::scope(|s| {
        let stopping = s.spawn(|| service.shutdown());
        std::thread::sleep(Duration::from_millis(100));

        // Sweep still in flight: the stale contact is present
        assert_eq!(service.state(), ServiceState::Running);
        assert_eq!(service.get_peer_count(), 1);

        stopping.join().unwrap();
    });

    assert_eq!(service.state(), ServiceState::Stopped);
    assert_eq!(service.get_peer_count(), 0);
}
