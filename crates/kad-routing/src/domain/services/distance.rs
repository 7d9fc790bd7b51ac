//! Kademlia distance calculations.

use crate::domain::NodeId;

/// Calculate the XOR distance between two NodeIds.
///
/// # Properties
/// - Symmetric: `xor_distance(a, b) == xor_distance(b, a)`
/// - Self is zero: `xor_distance(a, a) == NodeId::zero()`
///
/// The result compares as a big-endian integer, so smaller means closer.
pub fn xor_distance(a: &NodeId, b: &NodeId) -> NodeId {
    a.distance_to(b)
}

/// Calculate the bucket index for a remote node relative to the local node.
///
/// Bucket index equals the log-distance: the position of the highest
/// differing bit, 0 (lowest) through 159 (highest).
#[inline]
pub fn bucket_index(local: &NodeId, remote: &NodeId) -> usize {
    local.log_distance(remote)
}
