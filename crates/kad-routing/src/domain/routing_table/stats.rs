//! Routing table statistics.

use std::time::Duration;

/// Snapshot of routing table health.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTableStats {
    /// Total number of stored contacts
    pub total_contacts: usize,
    /// Number of buckets with at least one contact
    pub buckets_used: usize,
    /// Buckets currently waiting on an eviction probe
    pub pending_evictions: usize,
    /// Age of the least recently seen contact
    pub oldest_contact_age: Duration,
}
