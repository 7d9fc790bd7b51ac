//! Contact sorting and selection.

use super::distance::xor_distance;
use crate::domain::{Contact, NodeId};

/// Sort contacts by XOR distance from a target node (closest first).
///
/// The sort is stable. Distinct identifiers never tie against the same
/// target, so only duplicate entries keep their input order.
pub fn sort_contacts_by_distance(contacts: &mut [Contact], target: &NodeId) {
    contacts.sort_by_cached_key(|c| xor_distance(&c.node_id, target));
}

/// Find the k closest contacts to a target from a list.
///
/// # Returns
/// Up to k contacts sorted by distance (closest first)
pub fn find_k_closest(mut contacts: Vec<Contact>, target: &NodeId, k: usize) -> Vec<Contact> {
    sort_contacts_by_distance(&mut contacts, target);
    contacts.truncate(k);
    contacts
}
