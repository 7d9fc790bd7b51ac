//! Domain Errors for the Routing Core

use thiserror::Error;

/// Errors reported by routing table and manager operations.
///
/// Every variant is recoverable and leaves the table untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DhtError {
    /// Empty host, zero port or all-zero identifier
    #[error("invalid contact: empty host, zero port or zero node id")]
    InvalidContact,
    /// The global contact cap has been reached
    #[error("peer limit exceeded")]
    PeerLimitExceeded,
    /// Attempted to store the local identifier as a contact
    #[error("cannot add the local node to its own routing table")]
    SelfContact,
    /// The manager has been shut down and no longer accepts mutations
    #[error("routing table has been stopped")]
    Stopped,
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors that prevent a `DhtService` from starting.
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn refresh thread: {0}")]
    Spawn(#[from] std::io::Error),
}
