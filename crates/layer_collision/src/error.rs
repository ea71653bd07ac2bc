//! Error types for the collision crate

use crate::config::ConfigError;
use crate::physics::collision::ShapeId;
use thiserror::Error;

/// Collision errors
#[derive(Error, Debug)]
pub enum CollisionError {
    /// A shape was used for geometry before an entity was attached to it
    #[error("Collision shape {0} has no entity attached")]
    MissingEntity(ShapeId),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for collision operations
pub type Result<T> = std::result::Result<T, CollisionError>;
