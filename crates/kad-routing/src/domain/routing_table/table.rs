//! Main RoutingTable implementation.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::domain::{bucket_index, find_k_closest, Contact, DhtConfig, DhtError, NodeId};
use crate::ports::{LivenessProbe, TimeSource};

use super::bucket::KBucket;
use super::config::NUM_BUCKETS;
use super::pending::{EvictionResolution, InsertOutcome, PendingEviction};
use super::stats::RoutingTableStats;

/// Buckets plus the closed flag, guarded together by one lock.
#[derive(Debug)]
struct TableState {
    buckets: Vec<KBucket>,
    closed: bool,
}

/// The routing table implementing the Kademlia contact index.
///
/// # Locking
/// A single reader/writer lock covers all 160 buckets. Lookups share it;
/// inserts and the staleness sweep hold it exclusively for their whole
/// duration, so a sweep is one atomic step with respect to every other
/// operation.
///
/// # Eviction probes
/// A full bucket never holds the lock across a network round trip. The probe
/// is dispatched after the write guard is released and its completion
/// re-enters through a weak handle, taking the write lock like any other
/// mutation.
pub struct RoutingTable {
    /// Our own node ID (immutable after creation)
    local_node_id: NodeId,
    config: DhtConfig,
    state: Arc<RwLock<TableState>>,
    probe: Arc<dyn LivenessProbe>,
    time_source: Arc<dyn TimeSource>,
}

impl RoutingTable {
    /// Create a new routing table
    pub fn new(
        local_node_id: NodeId,
        config: DhtConfig,
        probe: Arc<dyn LivenessProbe>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        let buckets = (0..NUM_BUCKETS).map(|_| KBucket::new()).collect();

        Self {
            local_node_id,
            config,
            state: Arc::new(RwLock::new(TableState {
                buckets,
                closed: false,
            })),
            probe,
            time_source,
        }
    }

    /// Get our local node ID
    pub fn local_node_id(&self) -> &NodeId {
        &self.local_node_id
    }

    pub fn config(&self) -> &DhtConfig {
        &self.config
    }

    /// Insert or refresh a contact in the bucket matching its log-distance.
    ///
    /// The contact's `last_seen` is stored as given.
    pub fn add_contact(&self, contact: Contact) -> Result<(), DhtError> {
        if !contact.is_valid() {
            return Err(DhtError::InvalidContact);
        }
        if contact.node_id == self.local_node_id {
            return Err(DhtError::SelfContact);
        }

        let index = bucket_index(&self.local_node_id, &contact.node_id);
        let now = self.time_source.now();

        let outcome = {
            let mut state = self.state.write();
            if state.closed {
                return Err(DhtError::Stopped);
            }
            let bucket = state
                .buckets
                .get_mut(index)
                .ok_or(DhtError::InvalidContact)?;
            bucket.insert_or_refresh(
                contact,
                self.config.k,
                now,
                self.config.eviction_deadline(),
            )?
        };

        match outcome {
            InsertOutcome::Inserted | InsertOutcome::Refreshed => {}
            InsertOutcome::Dropped => {
                trace!(
                    bucket = index,
                    "bucket full and probe in flight, contact dropped"
                );
            }
            InsertOutcome::ProbeRequired(pending) => self.dispatch_probe(index, pending),
        }

        Ok(())
    }

    fn dispatch_probe(&self, index: usize, pending: PendingEviction) {
        let incumbent = pending.incumbent.node_id;
        debug!(
            bucket = index,
            incumbent = %incumbent,
            candidate = %pending.candidate.node_id,
            "bucket full, probing least recently seen contact"
        );

        let state = Arc::downgrade(&self.state);
        let time_source = Arc::clone(&self.time_source);
        let k = self.config.k;

        self.probe.probe(
            &pending.incumbent,
            self.config.probe_timeout,
            Box::new(move |alive| {
                apply_probe_result(&state, time_source.as_ref(), index, &incumbent, alive, k)
            }),
        );
    }

    /// Staleness sweep over all buckets under one exclusive lock.
    ///
    /// Overdue eviction probes are settled as failures first, then every
    /// contact not seen for `threshold` is dropped. Returns the number of
    /// contacts removed as stale.
    pub fn refresh(&self, threshold: Duration) -> usize {
        let now = self.time_source.now();
        let k = self.config.k;

        let mut state = self.state.write();
        if state.closed {
            return 0;
        }

        let mut removed = 0;
        for (index, bucket) in state.buckets.iter_mut().enumerate() {
            if let Some(resolution) = bucket.expire_overdue_eviction(k, now) {
                debug!(bucket = index, ?resolution, "eviction probe timed out");
            }
            removed += bucket.remove_stale(threshold, now);
        }
        removed
    }

    /// Look up a contact. Only the bucket its log-distance selects is searched.
    pub fn find_contact(&self, node_id: &NodeId) -> Option<Contact> {
        let index = bucket_index(&self.local_node_id, node_id);
        let state = self.state.read();
        state.buckets.get(index)?.find(node_id).cloned()
    }

    /// Find the `k` closest contacts to `target`, closest first.
    ///
    /// Buckets are visited outward from the target's own bucket (offset 0,
    /// then ±1, ±2, ...) until at least `k` candidates are collected or both
    /// directions run off the table. The candidates are then ordered by XOR
    /// distance to `target` and truncated.
    ///
    /// Equal distances are ordered by collection order (bucket visit order,
    /// then insertion order). Distinct identifiers never tie against one
    /// target, so callers should not depend on this.
    pub fn find_closest(&self, target: &NodeId, k: usize) -> Vec<Contact> {
        if k == 0 {
            return Vec::new();
        }

        let start = bucket_index(&self.local_node_id, target);
        let state = self.state.read();
        let buckets = &state.buckets;

        let mut candidates: Vec<Contact> = Vec::new();
        for offset in 0..NUM_BUCKETS {
            if candidates.len() >= k {
                break;
            }
            let upper = start + offset;
            let lower = start.checked_sub(offset);
            if upper >= NUM_BUCKETS && lower.is_none() {
                break;
            }
            if let Some(bucket) = buckets.get(upper) {
                candidates.extend_from_slice(bucket.contacts());
            }
            if offset > 0 {
                if let Some(bucket) = lower.and_then(|i| buckets.get(i)) {
                    candidates.extend_from_slice(bucket.contacts());
                }
            }
        }
        drop(state);

        find_k_closest(candidates, target, k)
    }

    /// Get total contact count across all buckets
    pub fn count(&self) -> usize {
        self.state.read().buckets.iter().map(KBucket::len).sum()
    }

    /// Every stored contact, bucket by bucket.
    pub fn contacts(&self) -> Vec<Contact> {
        self.state
            .read()
            .buckets
            .iter()
            .flat_map(|b| b.contacts().iter().cloned())
            .collect()
    }

    /// Copy of one bucket's contacts, in insertion order.
    pub fn bucket_snapshot(&self, index: usize) -> Vec<Contact> {
        self.state
            .read()
            .buckets
            .get(index)
            .map(KBucket::snapshot)
            .unwrap_or_default()
    }

    /// The eviction currently waiting on a probe in bucket `index`, if any.
    pub fn pending_eviction(&self, index: usize) -> Option<PendingEviction> {
        self.state
            .read()
            .buckets
            .get(index)
            .and_then(|b| b.pending_eviction().cloned())
    }

    /// Remove a contact from the table.
    pub fn remove_contact(&self, node_id: &NodeId) -> Option<Contact> {
        let index = bucket_index(&self.local_node_id, node_id);
        let mut state = self.state.write();
        if state.closed {
            return None;
        }
        state.buckets.get_mut(index)?.remove(node_id)
    }

    /// Get routing table statistics
    pub fn stats(&self) -> RoutingTableStats {
        let now = self.time_source.now();
        let state = self.state.read();

        let oldest_contact_age = state
            .buckets
            .iter()
            .flat_map(|b| b.contacts().iter())
            .map(|c| now.elapsed_since(c.last_seen))
            .max()
            .unwrap_or_default();

        RoutingTableStats {
            total_contacts: state.buckets.iter().map(KBucket::len).sum(),
            buckets_used: state.buckets.iter().filter(|b| !b.is_empty()).count(),
            pending_evictions: state
                .buckets
                .iter()
                .filter(|b| b.has_pending_eviction())
                .count(),
            oldest_contact_age,
        }
    }

    /// Refuse all further mutations, including late probe completions.
    pub fn close(&self) {
        self.state.write().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }
}

impl std::fmt::Debug for RoutingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingTable")
            .field("local_node_id", &self.local_node_id)
            .field("config", &self.config)
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}

/// Completion path of an eviction probe.
fn apply_probe_result(
    state: &Weak<RwLock<TableState>>,
    time_source: &dyn TimeSource,
    index: usize,
    incumbent: &NodeId,
    alive: bool,
    k: usize,
) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let now = time_source.now();
    let mut state = state.write();
    if state.closed {
        return;
    }
    let Some(bucket) = state.buckets.get_mut(index) else {
        return;
    };

    match bucket.resolve_eviction(incumbent, alive, k, now) {
        EvictionResolution::Kept => {
            debug!(bucket = index, incumbent = %incumbent, "incumbent alive, candidate discarded");
        }
        EvictionResolution::Replaced { inserted, .. } => {
            debug!(bucket = index, incumbent = %incumbent, inserted, "incumbent unreachable, evicted");
        }
        EvictionResolution::NotPending => {
            trace!(bucket = index, incumbent = %incumbent, "probe result for settled eviction ignored");
        }
    }
}
