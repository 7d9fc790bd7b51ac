//! # Kademlia Routing Core
//!
//! The contact index of a Kademlia DHT node: 160-bit identifiers, XOR
//! distance, 160 k-buckets keyed by log-distance from the local node,
//! closest-K lookups and a background staleness sweep.
//!
//! The wire protocol, value store and iterative network lookup live in the
//! RPC layer on top of this crate and talk to it through [`DhtApi`].
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** Identifiers, contacts, k-buckets and the routing table
//! - **Ports Layer:** `LivenessProbe`, `TimeSource`, `ConfigProvider` and `DhtApi`
//! - **Service Layer:** `DhtService`, the facade with the global cap and sweep thread
//! - **Adapters Layer:** System clock, static and TCP probes, config providers
//!
//! ## Feature Flags
//!
//! - `network` (default) - `TcpLivenessProbe` on a tokio runtime
//! - `config` (default) - `TomlConfigProvider`
//! - `test-utils` - `ManualTimeSource` and `RecordingProbe`
//!
//! ## Example
//!
//! ```rust
//! use kad_routing::{Contact, DhtApi, DhtConfig, DhtService, NodeId, Timestamp};
//!
//! let service = DhtService::new(NodeId::random(), DhtConfig::default()).unwrap();
//!
//! let peer = Contact::new("192.168.1.100", 4000, NodeId::random(), Timestamp::default());
//! service.add_peer(peer.clone()).unwrap();
//!
//! let closest = service.find_closest_peers(&peer.node_id, None);
//! assert_eq!(closest[0].node_id, peer.node_id);
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Test utilities (ManualTimeSource, RecordingProbe)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Domain entities
pub use domain::{
    ConfigError, Contact, DhtConfig, DhtError, EvictionResolution, InsertOutcome, KBucket, NodeId,
    ParseNodeIdError, PendingEviction, RoutingTable, RoutingTableStats, StartError, Timestamp,
    NODE_ID_BITS, NODE_ID_LEN,
};

// Domain services
pub use domain::{bucket_index, find_k_closest, sort_contacts_by_distance, xor_distance};

// Port traits
pub use ports::{ConfigProvider, DhtApi, LivenessProbe, ProbeCallback, TimeSource};

// Service
pub use service::{DhtService, ServiceState};

// Adapters
pub use adapters::{StaticConfigProvider, StaticLivenessProbe, SystemTimeSource};

#[cfg(feature = "config")]
pub use adapters::TomlConfigProvider;

#[cfg(feature = "network")]
pub use adapters::TcpLivenessProbe;
