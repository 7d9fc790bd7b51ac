//! K-Bucket implementation for Kademlia routing.

use std::time::Duration;

use super::pending::{EvictionResolution, InsertOutcome, PendingEviction};
use crate::domain::{Contact, DhtError, NodeId, Timestamp};

/// A k-bucket storing up to k contacts at one log-distance from the local node.
///
/// # Eviction-on-Failure
/// When the bucket is full and a new contact shows up, the oldest contact is
/// NOT evicted blindly. It is probed first, and only replaced if the probe
/// reports it unreachable. Proven-live contacts win over unverified ones.
///
/// Contacts are kept in insertion order; "oldest" means smallest `last_seen`.
#[derive(Debug, Clone, Default)]
pub struct KBucket {
    /// Contacts in this bucket (max size = K, default 20)
    pub(crate) contacts: Vec<Contact>,
    /// Candidate waiting on the probe of the oldest contact.
    pub(crate) pending_eviction: Option<PendingEviction>,
}

impl KBucket {
    /// Create a new empty k-bucket
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn is_full(&self, k: usize) -> bool {
        self.contacts.len() >= k
    }

    /// Get all contacts in insertion order
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Owned copy of the contact list, in insertion order
    pub fn snapshot(&self) -> Vec<Contact> {
        self.contacts.clone()
    }

    /// Least recently seen contact; the first one wins on ties.
    pub fn oldest(&self) -> Option<&Contact> {
        self.contacts.iter().min_by_key(|c| c.last_seen)
    }

    pub fn find(&self, node_id: &NodeId) -> Option<&Contact> {
        self.contacts.iter().find(|c| &c.node_id == node_id)
    }

    pub fn has_pending_eviction(&self) -> bool {
        self.pending_eviction.is_some()
    }

    pub fn pending_eviction(&self) -> Option<&PendingEviction> {
        self.pending_eviction.as_ref()
    }

    /// Insert a new contact or refresh a known one.
    ///
    /// A known identifier is replaced in place. A full bucket hands back a
    /// [`PendingEviction`] for the caller to probe; the bucket keeps a copy
    /// and ignores further candidates until that probe is resolved.
    pub fn insert_or_refresh(
        &mut self,
        contact: Contact,
        k: usize,
        now: Timestamp,
        probe_deadline: Duration,
    ) -> Result<InsertOutcome, DhtError> {
        if !contact.is_valid() {
            return Err(DhtError::InvalidContact);
        }

        if let Some(existing) = self
            .contacts
            .iter_mut()
            .find(|c| c.node_id == contact.node_id)
        {
            *existing = contact;
            return Ok(InsertOutcome::Refreshed);
        }

        if !self.is_full(k) {
            self.contacts.push(contact);
            return Ok(InsertOutcome::Inserted);
        }

        if self.has_pending_eviction() {
            return Ok(InsertOutcome::Dropped);
        }

        let Some(incumbent) = self.oldest().cloned() else {
            // k == 0: nothing can ever be stored here
            return Ok(InsertOutcome::Dropped);
        };

        let pending = PendingEviction {
            incumbent,
            candidate: contact,
            started_at: now,
            deadline: now.add(probe_deadline),
        };
        self.pending_eviction = Some(pending.clone());
        Ok(InsertOutcome::ProbeRequired(pending))
    }

    /// Apply the verdict of the probe against `incumbent`.
    pub fn resolve_eviction(
        &mut self,
        incumbent: &NodeId,
        alive: bool,
        k: usize,
        now: Timestamp,
    ) -> EvictionResolution {
        let matches = self
            .pending_eviction
            .as_ref()
            .is_some_and(|p| &p.incumbent.node_id == incumbent);
        if !matches {
            return EvictionResolution::NotPending;
        }
        let Some(pending) = self.pending_eviction.take() else {
            return EvictionResolution::NotPending;
        };

        if alive {
            if let Some(contact) = self.contacts.iter_mut().find(|c| &c.node_id == incumbent) {
                contact.last_seen = now;
                contact.expired = false;
            }
            return EvictionResolution::Kept;
        }

        let evicted = self.remove(incumbent).map(|mut c| {
            c.expired = true;
            c
        });

        let already_present = self
            .contacts
            .iter()
            .any(|c| c.node_id == pending.candidate.node_id);
        let inserted = !already_present && !self.is_full(k);
        if inserted {
            self.contacts.push(pending.candidate);
        }

        EvictionResolution::Replaced { evicted, inserted }
    }

    /// Settle a probe that never reported back as a failure.
    pub fn expire_overdue_eviction(
        &mut self,
        k: usize,
        now: Timestamp,
    ) -> Option<EvictionResolution> {
        let incumbent = self
            .pending_eviction
            .as_ref()
            .filter(|p| p.deadline <= now)
            .map(|p| p.incumbent.node_id)?;
        Some(self.resolve_eviction(&incumbent, false, k, now))
    }

    /// Drop every contact not seen for at least `threshold`.
    ///
    /// Returns the number of contacts removed.
    pub fn remove_stale(&mut self, threshold: Duration, now: Timestamp) -> usize {
        let before = self.contacts.len();
        self.contacts.retain(|c| now.elapsed_since(c.last_seen) < threshold);
        before - self.contacts.len()
    }

    /// Remove a contact by NodeId.
    pub fn remove(&mut self, node_id: &NodeId) -> Option<Contact> {
        self.contacts
            .iter()
            .position(|c| &c.node_id == node_id)
            .map(|pos| self.contacts.remove(pos))
    }
}
