//! Physics module for collision detection and notification
//!
//! Provides layer-partitioned broad phase, box/sphere narrow phase and
//! listener-driven collision response.

pub mod collision;
pub mod collision_manager;

#[cfg(test)]
mod tests;

pub use collision::{
    CollisionShape,
    CollisionListener,
    ShapeId,
    ShapeKind,
    ShapeRef,
};
pub use collision_manager::{CollisionManager, FrameStats, LayerId};
