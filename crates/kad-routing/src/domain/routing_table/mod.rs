//! Routing Table Implementation
//!
//! 160 k-buckets indexed by log-distance from the local identifier, with
//! probe-before-evict for full buckets and a staleness sweep.

// Semantic submodules
mod bucket;
mod config;
mod pending;
mod stats;
mod table;

// Re-export public API
pub use bucket::KBucket;
pub use config::{DEFAULT_K, NUM_BUCKETS};
pub use pending::{EvictionResolution, InsertOutcome, PendingEviction};
pub use stats::RoutingTableStats;
pub use table::RoutingTable;
