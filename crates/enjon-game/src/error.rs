use enjon_ecs::{EcsError, EntityId};

/// Errors raised while building or driving the simulation.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Ecs(#[from] EcsError),

    #[error("failed to parse profile table: {0}")]
    ProfileParse(#[from] serde_json::Error),

    #[error("failed to parse simulation config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config value {field} must be finite, got {value}")]
    InvalidConfig { field: &'static str, value: f32 },

    #[error("failed to serialize simulation config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        entity: EntityId,
        component: &'static str,
    },
}
