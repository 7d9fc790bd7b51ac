//! Routing table constants.

use crate::domain::NODE_ID_BITS;

/// Number of k-buckets (one per bit of NodeId)
pub const NUM_BUCKETS: usize = NODE_ID_BITS;

/// Default bucket size and closest-K answer size
pub const DEFAULT_K: usize = 20;
