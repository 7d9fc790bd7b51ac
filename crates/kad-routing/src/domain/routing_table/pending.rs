//! Eviction bookkeeping for full buckets.

use crate::domain::{Contact, Timestamp};

/// A candidate waiting on the liveness probe of a full bucket's oldest contact.
///
/// The candidate only gets in if the incumbent turns out to be unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEviction {
    /// Least-recently-seen contact being probed
    pub incumbent: Contact,
    /// New contact that replaces the incumbent if the probe fails
    pub candidate: Contact,
    /// When the probe was dispatched
    pub started_at: Timestamp,
    /// After this point the sweep resolves the probe as failed
    pub deadline: Timestamp,
}

/// What `KBucket::insert_or_refresh` did with a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Appended to a bucket with spare capacity
    Inserted,
    /// Replaced the record with the same identifier in place
    Refreshed,
    /// Bucket full: the caller must probe `incumbent` and report back
    ProbeRequired(PendingEviction),
    /// Bucket full and already probing; the contact was dropped
    Dropped,
}

/// How a pending eviction was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvictionResolution {
    /// Incumbent answered and stays; the candidate is discarded
    Kept,
    /// Incumbent was unreachable and has been replaced
    Replaced {
        evicted: Option<Contact>,
        inserted: bool,
    },
    /// No matching probe was outstanding (already resolved or superseded)
    NotPending,
}
