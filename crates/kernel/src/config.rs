use serde::{Deserialize, Serialize};

use crate::scheduler::FirstTick;

/// Gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Delta policy for the very first tick.
    pub first_tick: FirstTick,
    /// Despawn a peer's previous character when the peer spawns again.
    /// When off, the old entity stays live but unreachable through the peer.
    pub despawn_on_respawn: bool,
}
