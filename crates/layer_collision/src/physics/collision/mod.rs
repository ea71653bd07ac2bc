//! Collision shapes, narrow-phase tests and listeners
//!
//! # Module Organization
//!
//! - [`detect`] - Stateless narrow-phase intersection tests
//! - [`shape`] - Shapes attached to entities, dispatch and collision flow
//! - [`listener`] - The decide/respond callback contract
//! - [`swept`] - Sub-stepped look-ahead prediction
//!
//! # Key Types
//!
//! - [`CollisionShape`] - A box or sphere boundary attached to an entity
//! - [`CollisionListener`] - Per-shape collision callbacks
//! - [`BoundingSphere`], [`BoundingBox`] - World-space bounds

pub mod detect;
pub mod listener;
pub mod shape;
pub mod swept;

pub use detect::{BoundingBox, BoundingSphere};
pub use listener::{
    CollisionListener, FnListener, IntersectListener, ListenerRef, SwapVelocityListener,
};
pub use shape::{CollisionShape, ShapeId, ShapeKind, ShapeRef};
