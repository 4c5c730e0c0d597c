use simcore_common::{EntityId, PeerId};

/// Errors from world operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The entity was despawned or never existed.
    #[error("entity {0} is not live")]
    UnknownEntity(EntityId),
    #[error("entity {entity} has no {component} component")]
    ComponentNotFound {
        entity: EntityId,
        component: &'static str,
    },
}

/// Errors from the [`Game`](crate::Game) gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("no character recorded for {0}")]
    UnknownPeer(PeerId),
    #[error(transparent)]
    World(#[from] WorldError),
    /// A panic inside an exclusive section left the world in an unknown state.
    #[error("world state poisoned by a panic during exclusive access")]
    Poisoned,
}
