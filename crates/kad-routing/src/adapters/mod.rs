//! # Adapters
//!
//! Concrete implementations of the driven ports.

pub mod network;

pub use network::*;
