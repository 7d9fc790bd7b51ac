//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** APIs the routing core exposes to the RPC layer
//! - **Driven Ports (Outbound):** SPIs the routing core requires from adapters

pub mod inbound;
pub mod outbound;

pub use inbound::DhtApi;
pub use outbound::{ConfigProvider, LivenessProbe, ProbeCallback, TimeSource};
