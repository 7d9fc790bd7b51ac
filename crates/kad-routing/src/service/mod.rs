//! # DHT Service
//!
//! The facade the RPC layer talks to. Owns the `RoutingTable`, enforces the
//! global contact cap and runs the periodic staleness sweep on a dedicated
//! thread for as long as the service is alive.

// Semantic submodules
mod api;
mod core;
mod maintenance;

// Re-export public API
pub use core::DhtService;
pub use maintenance::ServiceState;

#[cfg(test)]
mod tests;
