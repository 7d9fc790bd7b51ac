//! Domain Services - Pure functions for Kademlia operations
//!
//! All functions in this module are pure (no I/O, no state mutation)
//! and deterministic (same inputs → same outputs).

// Semantic submodules
mod distance;
mod sorting;

// Re-export public API
pub use distance::{bucket_index, xor_distance};
pub use sorting::{find_k_closest, sort_contacts_by_distance};

#[cfg(test)]
mod tests;
