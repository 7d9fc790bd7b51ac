//! Test utilities for the routing core.
//!
//! Controllable implementations of the driven ports for deterministic tests.
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use kad_routing::test_utils::ManualTimeSource;
//! use kad_routing::TimeSource;
//! use std::time::Duration;
//!
//! let clock = ManualTimeSource::new(1000);
//! clock.advance(Duration::from_secs(1));
//! assert_eq!(clock.now().as_millis(), 2000);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::domain::{Contact, Timestamp};
use crate::ports::{LivenessProbe, ProbeCallback, TimeSource};

/// Thread-safe clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    millis: AtomicU64,
}

impl ManualTimeSource {
    /// Create a clock reading `millis` since the epoch.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(by, Ordering::SeqCst);
    }

    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.millis.load(Ordering::SeqCst))
    }
}

/// A probe whose verdicts are delivered by the test.
///
/// Every `probe` call is parked until [`RecordingProbe::complete_next`] or
/// [`RecordingProbe::complete_all`] runs its callback.
#[derive(Default)]
pub struct RecordingProbe {
    parked: Mutex<Vec<(Contact, ProbeCallback)>>,
}

impl RecordingProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of probes waiting for a verdict.
    pub fn pending(&self) -> usize {
        self.parked.lock().len()
    }

    /// Contacts currently being probed, oldest dispatch first.
    pub fn probed(&self) -> Vec<Contact> {
        self.parked.lock().iter().map(|(c, _)| c.clone()).collect()
    }

    /// Deliver `alive` to the oldest parked probe. Returns false if none was parked.
    pub fn complete_next(&self, alive: bool) -> bool {
        let next = {
            let mut parked = self.parked.lock();
            if parked.is_empty() {
                None
            } else {
                Some(parked.remove(0))
            }
        };
        match next {
            Some((_, callback)) => {
                callback(alive);
                true
            }
            None => false,
        }
    }

    /// Deliver `alive` to every parked probe.
    pub fn complete_all(&self, alive: bool) -> usize {
        let drained: Vec<_> = std::mem::take(&mut *self.parked.lock());
        let n = drained.len();
        for (_, callback) in drained {
            callback(alive);
        }
        n
    }

    /// Forget every parked probe without answering.
    pub fn drop_all(&self) {
        self.parked.lock().clear();
    }
}

impl LivenessProbe for RecordingProbe {
    fn probe(&self, contact: &Contact, _timeout: Duration, on_complete: ProbeCallback) {
        self.parked.lock().push((contact.clone(), on_complete));
    }
}
