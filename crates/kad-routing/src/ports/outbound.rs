//! # Driven Ports (Outbound SPI)
//!
//! These are the interfaces the routing core **requires** from its host:
//! a clock, a liveness probe and a configuration source.

use std::time::Duration;

use crate::domain::{Contact, DhtConfig, Timestamp};

/// Completion handler for a liveness probe.
///
/// Receives `true` if the contact answered within the timeout.
pub type ProbeCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Bounded-timeout reachability check, used only when a full bucket must
/// decide whether its least-recently-seen contact deserves eviction.
///
/// # Contract
///
/// - `probe` must not block on the network; it dispatches the check and
///   returns.
/// - `on_complete` is invoked exactly once, from any thread, possibly before
///   `probe` returns. Implementations that cannot reach a verdict should
///   report `false`.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the table calls `probe` from
/// whichever thread is inserting.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct UdpPingProbe { socket: Arc<UdpSocket>, pending: PendingPings }
///
/// impl LivenessProbe for UdpPingProbe {
///     fn probe(&self, contact: &Contact, timeout: Duration, on_complete: ProbeCallback) {
///         self.pending.register(contact.node_id, timeout, on_complete);
///         self.socket.send_ping(contact.address());
///     }
/// }
/// ```
pub trait LivenessProbe: Send + Sync {
    /// Start a liveness check against `contact`.
    fn probe(&self, contact: &Contact, timeout: Duration, on_complete: ProbeCallback);
}

/// Abstract interface for time-related operations.
///
/// Enables deterministic testing by injecting controllable time sources.
/// Production implementations use system time; tests use a manual clock.
pub trait TimeSource: Send + Sync {
    /// Get the current timestamp.
    fn now(&self) -> Timestamp;
}

/// Abstract interface for configuration loading.
///
/// Allows different configuration sources (file, environment, etc.)
pub trait ConfigProvider: Send + Sync {
    /// Get routing table and manager parameters.
    fn get_dht_config(&self) -> DhtConfig;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeId;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Test-only TimeSource returning a fixed timestamp for deterministic assertions.
    struct FixedTimeSource(u64);

    impl TimeSource for FixedTimeSource {
        fn now(&self) -> Timestamp {
            Timestamp::new(self.0)
        }
    }

    struct ImmediateProbe(bool);

    impl LivenessProbe for ImmediateProbe {
        fn probe(&self, _contact: &Contact, _timeout: Duration, on_complete: ProbeCallback) {
            on_complete(self.0);
        }
    }

    #[test]
    fn test_fixed_time_source_returns_configured_value() {
        let source = FixedTimeSource(1000);
        assert_eq!(source.now().as_millis(), 1000);
    }

    #[test]
    fn test_probe_is_object_safe_and_runs_callback() {
        let probe: Arc<dyn LivenessProbe> = Arc::new(ImmediateProbe(true));
        let seen = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&seen);
        let contact = Contact::new("127.0.0.1", 1, NodeId::random(), Timestamp::new(0));

        probe.probe(
            &contact,
            Duration::from_millis(10),
            Box::new(move |alive| flag.store(alive, Ordering::SeqCst)),
        );

        assert!(seen.load(Ordering::SeqCst));
    }
}
