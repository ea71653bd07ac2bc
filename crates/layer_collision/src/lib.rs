//! # Layer Collision
//!
//! Per-frame, layered collision detection and notification for game loops.
//!
//! ## Features
//!
//! - **Layers**: shapes are only tested against shapes in the same layer
//! - **Deferred Membership**: adds and removes apply at the start of the next tick
//! - **Listeners**: "is this a collision" is decided and answered per shape
//! - **Compound Shapes**: child shapes are tested whenever their parent collides
//! - **Swept Prediction**: look ahead without moving anything
//!
//! ## Quick Start
//!
//! ```rust
//! use layer_collision::prelude::*;
//! use std::rc::Rc;
//!
//! let manager = CollisionManager::new();
//!
//! let a = CollisionShape::sphere(Body::at(Vec3::new(0.0, 0.0, 0.0)).into_ref(), 1.0)
//!     .with_listener(Rc::new(SwapVelocityListener))
//!     .into_ref();
//! let b = CollisionShape::sphere(Body::at(Vec3::new(1.9, 0.0, 0.0)).into_ref(), 1.0)
//!     .into_ref();
//!
//! manager.add_child(&a, 0);
//! manager.add_child(&b, 0);
//!
//! let stats = manager.check_for_collisions(1.0 / 60.0);
//! assert_eq!(stats.collisions, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod entity;
pub mod error;
pub mod physics;

pub use error::{CollisionError, Result};

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        CollisionError,
        config::{Config, CollisionConfig},
        entity::{Body, Entity, EntityRef},
        foundation::math::{Vec3, Quat},
        physics::{
            CollisionManager, FrameStats, LayerId,
            collision::{
                CollisionShape, CollisionListener, FnListener, IntersectListener,
                ListenerRef, ShapeId, ShapeKind, ShapeRef, SwapVelocityListener,
            },
        },
    };
}
