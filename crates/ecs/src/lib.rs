//! Entity identity and component storage.
//!
//! # Invariants
//! - An identifier is unique among live entities; recycled slots carry a new generation.
//! - Each component type has its own storage keyed by `EntityId`.
//! - Iteration order is deterministic (BTreeMap).

pub mod components;
pub mod entity;
pub mod store;

pub use components::{Position, Velocity};
pub use entity::EntityAllocator;
pub use simcore_common::EntityId;
pub use store::{Component, ComponentStore, Storage};

pub fn crate_info() -> &'static str {
    "simcore-ecs v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("ecs"));
    }
}
