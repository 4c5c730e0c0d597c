//! Shared types for the simcore workspace.

mod types;

pub use types::{EntityId, PeerId};

pub fn crate_info() -> &'static str {
    "simcore-common v0.1.0"
}
