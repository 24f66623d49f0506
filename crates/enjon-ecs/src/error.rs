use crate::entity::EntityId;

/// Errors raised by entity storage and the spatial grid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EcsError {
    #[error("entity capacity exhausted ({capacity} slots in use)")]
    CapacityExhausted { capacity: usize },

    #[error("cannot create an entity with an empty component mask")]
    EmptyMask,

    #[error("entity {0} is not alive")]
    InvalidEntity(EntityId),

    #[error("invalid grid dimensions {width}x{height} with cell size {cell_size}")]
    InvalidGrid { width: f32, height: f32, cell_size: f32 },

    #[error("failed to allocate spatial grid of {cells} cells")]
    GridAllocation { cells: usize },
}
