//! Core Domain Entities for the Routing Core
//!
//! Identifiers live in a 160-bit space ordered by the XOR metric; contacts are
//! the remote participants indexed by that metric.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::value_objects::Timestamp;

/// Length of a [`NodeId`] in bytes (160 bits).
pub const NODE_ID_LEN: usize = 20;

/// Number of bits in a [`NodeId`], and therefore the number of k-buckets.
pub const NODE_ID_BITS: usize = NODE_ID_LEN * 8;

/// 160-bit identifier for a participant or a stored key.
///
/// Ordering is byte-lexicographic, which is also the numeric order of the
/// identifier read as a big-endian integer. Applied to the output of
/// [`NodeId::distance_to`] this ranks candidates by proximity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId([u8; NODE_ID_LEN]);

impl NodeId {
    /// Create a NodeId from a raw 20-byte array.
    pub const fn from_bytes(bytes: [u8; NODE_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// The all-zero identifier. Never valid as a contact.
    pub const fn zero() -> Self {
        Self([0u8; NODE_ID_LEN])
    }

    /// Draw an identifier uniformly from the whole key space.
    pub fn random() -> Self {
        let mut bytes = [0u8; NODE_ID_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; NODE_ID_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Bitwise XOR of the two identifiers.
    ///
    /// Symmetric, and zero iff `self == other`.
    pub fn distance_to(&self, other: &NodeId) -> NodeId {
        let mut out = [0u8; NODE_ID_LEN];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.0[i] ^ other.0[i];
        }
        NodeId(out)
    }

    /// Index of the highest set bit of the XOR distance, counted from the
    /// least-significant bit (0) up to the most-significant bit (159).
    ///
    /// Identical identifiers fold into 0. Callers never store the local
    /// identifier, so bucket 0 is not polluted by this.
    pub fn log_distance(&self, other: &NodeId) -> usize {
        let distance = self.distance_to(other);
        distance
            .0
            .iter()
            .position(|b| *b != 0)
            .map(|byte_idx| {
                let byte = distance.0[byte_idx];
                (NODE_ID_LEN - byte_idx - 1) * 8 + (7 - byte.leading_zeros() as usize)
            })
            .unwrap_or(0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self)
    }
}

impl AsRef<[u8]> for NodeId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; NODE_ID_LEN]> for NodeId {
    fn from(bytes: [u8; NODE_ID_LEN]) -> Self {
        Self(bytes)
    }
}

/// Error returned when parsing a hex-encoded [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseNodeIdError {
    #[error("invalid hex in node id: {0}")]
    InvalidHex(String),
    #[error("node id must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s).map_err(|e| ParseNodeIdError::InvalidHex(e.to_string()))?;
        let bytes: [u8; NODE_ID_LEN] = raw
            .as_slice()
            .try_into()
            .map_err(|_| ParseNodeIdError::InvalidLength {
                expected: NODE_ID_LEN,
                actual: raw.len(),
            })?;
        Ok(Self(bytes))
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A remote participant as stored in the routing table.
///
/// Two contacts are "the same peer" when their `node_id` matches; a new
/// address for a known identifier is an update, not a new contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Host name or IP literal.
    pub host: String,
    pub port: u16,
    pub node_id: NodeId,
    /// Last time we heard from this peer.
    pub last_seen: Timestamp,
    /// Set once a liveness probe has reported the peer unreachable.
    #[serde(default)]
    pub expired: bool,
}

impl Contact {
    pub fn new(host: impl Into<String>, port: u16, node_id: NodeId, last_seen: Timestamp) -> Self {
        Self {
            host: host.into(),
            port,
            node_id,
            last_seen,
            expired: false,
        }
    }

    /// A contact is storable iff it has a host, a non-zero port and a
    /// non-zero identifier.
    pub fn is_valid(&self) -> bool {
        !self.host.is_empty() && self.port > 0 && !self.node_id.is_zero()
    }

    /// `host:port`, bracketing IPv6 literals.
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
