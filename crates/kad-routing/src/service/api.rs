use tracing::debug;

use crate::domain::{Contact, DhtError, NodeId};
use crate::ports::DhtApi;
use crate::service::DhtService;

use super::maintenance::sweep;

impl DhtApi for DhtService {
    fn add_peer(&self, mut contact: Contact) -> Result<(), DhtError> {
        if self.signal.is_stopped() {
            return Err(DhtError::Stopped);
        }
        // Soft cap: concurrent callers may overshoot by a few contacts.
        if self.table.count() >= self.config.max_peers {
            debug!(
                node_id = %contact.node_id,
                max_peers = self.config.max_peers,
                "peer limit reached, contact rejected"
            );
            return Err(DhtError::PeerLimitExceeded);
        }

        contact.last_seen = self.time_source.now();
        contact.expired = false;
        self.table.add_contact(contact)
    }

    fn get_peer(&self, node_id: &NodeId) -> Option<Contact> {
        self.table.find_contact(node_id)
    }

    fn find_closest_peers(&self, target: &NodeId, count: Option<usize>) -> Vec<Contact> {
        self.table.find_closest(target, count.unwrap_or(self.config.k))
    }

    fn get_peer_count(&self) -> usize {
        self.table.count()
    }

    fn refresh(&self) {
        if self.signal.is_stopped() {
            return;
        }
        sweep(&self.table, self.config.stale_threshold);
    }

    fn get_self_identifier(&self) -> NodeId {
        *self.table.local_node_id()
    }
}
