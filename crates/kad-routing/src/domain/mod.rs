//! Domain Layer - Pure business logic with no I/O
//!
//! This module contains the core Kademlia logic including:
//! - Node identifiers, XOR distance and log-distance
//! - Routing table with k-buckets
//! - Probe-before-evict and staleness sweep policies

pub mod routing_table;
pub mod services;
/// Core domain types (entities, values, errors)
pub mod types;

pub use routing_table::*;
pub use services::*;
pub use types::*;
