//! Collision listener contract
//!
//! A listener splits "do these two shapes count as colliding" from "what
//! happens when they do". `is_collide` may run from speculative contexts
//! such as swept prediction, so it must not have side effects; all response
//! logic belongs in `on_collide`.

use super::shape::CollisionShape;
use std::rc::Rc;

/// Shared handle to a listener
pub type ListenerRef = Rc<dyn CollisionListener>;

/// Per-shape collision callbacks
///
/// `shape1` is always the shape the listener is attached to; inside a
/// manager sweep it is the earlier of the two shapes in the layer.
pub trait CollisionListener {
    /// Side-effect-free predicate deciding whether the pair collides
    fn is_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, delta: f32) -> bool;

    /// Response, called only after `is_collide` returned true
    fn on_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, delta: f32);
}

/// Collides on plain geometric intersection and does nothing in response
#[derive(Debug, Default, Clone, Copy)]
pub struct IntersectListener;

impl CollisionListener for IntersectListener {
    fn is_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, _delta: f32) -> bool {
        shape1.is_intersect(shape2)
    }

    fn on_collide(&self, _shape1: &CollisionShape, _shape2: &CollisionShape, _delta: f32) {}
}

/// Collides on intersection and exchanges the two entities' velocities
///
/// This is an equal-mass elastic bounce along the line of motion, the stock
/// response used by the bouncing-ball style demos.
#[derive(Debug, Default, Clone, Copy)]
pub struct SwapVelocityListener;

impl CollisionListener for SwapVelocityListener {
    fn is_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, _delta: f32) -> bool {
        shape1.is_intersect(shape2)
    }

    fn on_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, _delta: f32) {
        let (Some(a), Some(b)) = (shape1.entity(), shape2.entity()) else {
            return;
        };
        if Rc::ptr_eq(&a, &b) {
            return;
        }

        let velocity_a = a.borrow().velocity();
        let velocity_b = b.borrow().velocity();
        a.borrow_mut().set_velocity(velocity_b);
        b.borrow_mut().set_velocity(velocity_a);
    }
}

/// Listener built from a pair of closures
pub struct FnListener<P, R>
where
    P: Fn(&CollisionShape, &CollisionShape, f32) -> bool,
    R: Fn(&CollisionShape, &CollisionShape, f32),
{
    predicate: P,
    response: R,
}

impl<P, R> FnListener<P, R>
where
    P: Fn(&CollisionShape, &CollisionShape, f32) -> bool,
    R: Fn(&CollisionShape, &CollisionShape, f32),
{
    /// Create a listener from a predicate and a response
    pub fn new(predicate: P, response: R) -> Self {
        Self { predicate, response }
    }

    /// Wrap into a shared [`ListenerRef`]
    pub fn into_ref(self) -> ListenerRef
    where
        P: 'static,
        R: 'static,
    {
        Rc::new(self)
    }
}

impl<P, R> CollisionListener for FnListener<P, R>
where
    P: Fn(&CollisionShape, &CollisionShape, f32) -> bool,
    R: Fn(&CollisionShape, &CollisionShape, f32),
{
    fn is_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, delta: f32) -> bool {
        (self.predicate)(shape1, shape2, delta)
    }

    fn on_collide(&self, shape1: &CollisionShape, shape2: &CollisionShape, delta: f32) {
        (self.response)(shape1, shape2, delta);
    }
}
