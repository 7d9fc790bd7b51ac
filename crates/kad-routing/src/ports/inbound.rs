//! # Driving Ports (Inbound API)
//!
//! The API the routing core exposes to its one intended collaborator, the
//! RPC/transport layer that answers PING, STORE, FIND_NODE and FIND_VALUE.

use crate::domain::{Contact, DhtError, NodeId};

/// Primary API for interacting with the routing core.
///
/// All methods take `&self`; implementations serialize access internally so
/// the RPC layer can share one instance across its worker threads.
///
/// # Example
///
/// ```rust,ignore
/// use kad_routing::ports::DhtApi;
///
/// fn answer_find_node<T: DhtApi>(dht: &T, target: NodeId) -> Vec<Contact> {
///     dht.find_closest_peers(&target, None)
/// }
/// ```
pub trait DhtApi {
    /// Insert or refresh a contact observed on the wire.
    ///
    /// # Returns
    ///
    /// - `Ok(())` once the contact passed validity and capacity checks, even
    ///   if a full bucket later keeps its incumbent instead
    /// - `Err(PeerLimitExceeded)` if the global cap is reached
    /// - `Err(InvalidContact)` for an empty host, zero port or zero id
    fn add_peer(&self, contact: Contact) -> Result<(), DhtError>;

    /// Look up a stored contact by identifier.
    fn get_peer(&self, node_id: &NodeId) -> Option<Contact>;

    /// Up to `count` contacts closest to `target`, closest first.
    ///
    /// `None` uses the configured bucket size k.
    fn find_closest_peers(&self, target: &NodeId, count: Option<usize>) -> Vec<Contact>;

    /// Total number of stored contacts.
    fn get_peer_count(&self) -> usize;

    /// Run a staleness sweep now. Always safe to call.
    fn refresh(&self);

    /// The local node's identifier.
    fn get_self_identifier(&self) -> NodeId;
}
