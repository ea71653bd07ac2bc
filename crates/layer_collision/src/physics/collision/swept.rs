//! Swept collision prediction
//!
//! Predicts whether two shapes will touch within the next `delta` seconds by
//! stepping physics-only clones of their entities through `segments`
//! sub-steps. The shapes see the clones only for the duration of the call;
//! the real entities are never advanced.

use super::shape::CollisionShape;
use crate::entity::{Body, EntityRef};
use crate::error::CollisionError;
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;

/// Puts a shape's original entity back when dropped
struct EntitySwap<'a> {
    shape: &'a CollisionShape,
    original: Option<EntityRef>,
}

impl<'a> EntitySwap<'a> {
    fn install(shape: &'a CollisionShape, stand_in: EntityRef) -> Self {
        let original = shape.replace_entity(Some(stand_in));
        Self { shape, original }
    }
}

impl Drop for EntitySwap<'_> {
    fn drop(&mut self) {
        self.shape.replace_entity(self.original.take());
    }
}

fn clone_body(shape: &CollisionShape) -> Rc<RefCell<Body>> {
    let Some(entity) = shape.entity() else {
        panic!("{}", CollisionError::MissingEntity(shape.id()));
    };
    let body = entity.borrow().physics_clone();
    Rc::new(RefCell::new(body))
}

impl CollisionShape {
    /// Predict whether this shape and `other` intersect at any of `segments`
    /// evenly spaced sub-steps over the next `delta` seconds
    ///
    /// A `segments` value below one is treated as one. Returns at the first
    /// intersecting sub-step. Both shapes have their original entity
    /// references restored on every exit path, and neither entity's state
    /// changes.
    ///
    /// # Panics
    /// Panics if either shape has no entity attached.
    pub fn will_intersect(&self, other: &CollisionShape, delta: f32, segments: i32) -> bool {
        let segments = if segments < 1 {
            warn!("will_intersect: segment count {} clamped to 1", segments);
            1
        } else {
            segments
        };
        let step = delta / segments as f32;

        let own_body = clone_body(self);
        let same_shape = std::ptr::eq(self, other);
        let shares_entity = match (self.entity(), other.entity()) {
            (Some(a), Some(b)) => Rc::ptr_eq(&a, &b),
            _ => false,
        };
        let other_body = if same_shape || shares_entity {
            None
        } else {
            Some(clone_body(other))
        };

        let _own_swap = EntitySwap::install(self, own_body.clone());
        let _other_swap = match (&other_body, same_shape) {
            (Some(body), _) => Some(EntitySwap::install(other, body.clone())),
            (None, false) => Some(EntitySwap::install(other, own_body.clone())),
            (None, true) => None,
        };

        for _ in 0..segments {
            own_body.borrow_mut().advance(step);
            if let Some(body) = &other_body {
                body.borrow_mut().advance(step);
            }
            if self.is_intersect(other) {
                return true;
            }
        }
        false
    }
}
