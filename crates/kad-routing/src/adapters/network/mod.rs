//! # Network Adapters
//!
//! Production adapters for the driven ports.
//!
//! ## Adapters Provided
//!
//! - `SystemTimeSource` - Wall clock in milliseconds
//! - `StaticLivenessProbe` - Fixed probe verdict, no I/O
//! - `TcpLivenessProbe` - TCP connect check on a tokio runtime (requires "network" feature)
//! - `StaticConfigProvider` - In-memory configuration
//! - `TomlConfigProvider` - Config file loading (requires "config" feature)

/// Configuration providers
pub mod config;
/// Liveness probes
pub mod probe;
/// Time source adapters
pub mod time;

pub use config::StaticConfigProvider;
pub use probe::StaticLivenessProbe;
pub use time::SystemTimeSource;

#[cfg(feature = "config")]
pub use config::TomlConfigProvider;

#[cfg(feature = "network")]
pub use probe::TcpLivenessProbe;
