//! Value Objects for the Routing Core

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::ConfigError;

/// Wall-clock timestamp in milliseconds since the Unix epoch.
///
/// # Bounds
///
/// Values are clamped to a reasonable maximum so that hostile or corrupted
/// timestamps cannot overflow staleness arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Maximum reasonable timestamp (year 9999, in milliseconds).
    pub const MAX_REASONABLE: u64 = 253_402_300_799_000;

    /// Create a new timestamp, clamping to MAX_REASONABLE.
    pub fn new(millis: u64) -> Self {
        Self(millis.min(Self::MAX_REASONABLE))
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(secs.saturating_mul(1000))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Add a duration (saturating at MAX_REASONABLE).
    pub fn add(&self, d: Duration) -> Self {
        Self::new(self.0.saturating_add(duration_millis(d)))
    }

    /// Subtract a duration (saturating at 0).
    pub fn sub(&self, d: Duration) -> Self {
        Self(self.0.saturating_sub(duration_millis(d)))
    }

    /// Time elapsed between `earlier` and `self`; zero if `earlier` is in the future.
    pub fn elapsed_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Configuration for a routing table and its manager.
///
/// Immutable for the lifetime of one `DhtService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhtConfig {
    /// Pause between two background staleness sweeps (default: 60s)
    pub refresh_interval: Duration,
    /// Contacts not seen for this long are dropped by a sweep (default: 300s)
    pub stale_threshold: Duration,
    /// Soft global cap on stored contacts (default: 1000)
    pub max_peers: usize,
    /// Per-bucket capacity and default closest-K size (default: 20)
    pub k: usize,
    /// Bound on a single liveness probe (default: 2s)
    pub probe_timeout: Duration,
}

impl Default for DhtConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(60),
            stale_threshold: Duration::from_secs(300),
            max_peers: 1000,
            k: crate::domain::DEFAULT_K,
            probe_timeout: Duration::from_secs(2),
        }
    }
}

impl DhtConfig {
    /// Create a config suitable for testing (smaller values)
    pub fn for_testing() -> Self {
        Self {
            refresh_interval: Duration::from_millis(50),
            stale_threshold: Duration::from_secs(5),
            max_peers: 100,
            k: 3,
            probe_timeout: Duration::from_millis(200),
        }
    }

    /// Reject configurations the table cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k == 0 {
            return Err(ConfigError::Invalid("k must be at least 1".into()));
        }
        if self.max_peers == 0 {
            return Err(ConfigError::Invalid("max_peers must be at least 1".into()));
        }
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::Invalid("refresh_interval must be non-zero".into()));
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::Invalid("probe_timeout must be non-zero".into()));
        }
        Ok(())
    }

    /// How long a dispatched eviction probe may stay unresolved before the
    /// sweep treats the incumbent as unreachable.
    pub fn eviction_deadline(&self) -> Duration {
        self.probe_timeout.saturating_mul(2)
    }
}
