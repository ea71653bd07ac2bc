//! Collision shapes
//!
//! A [`CollisionShape`] is a boundary attached to an external entity. Its
//! effective center is the entity position plus the shape's offset. The
//! variant set is closed ([`ShapeKind`]) so every pairing in
//! [`CollisionShape::is_intersect`] is handled by one exhaustive match and
//! can never bounce back and forth between variants.
//!
//! Shapes live behind [`ShapeRef`] once shared with a manager. State that
//! the manager or callers change after sharing (entity, offset, listener,
//! dimensions, manager back-reference) is interior-mutable; the child list is
//! fixed once the shape is shared.

use super::detect::{self, BoundingBox, BoundingSphere};
use super::listener::ListenerRef;
use crate::entity::EntityRef;
use crate::error::{CollisionError, Result};
use crate::foundation::math::Vec3;
use crate::physics::collision_manager::{CollisionManager, ManagerShared};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared handle to a shape
pub type ShapeRef = Rc<CollisionShape>;

static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique shape identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl ShapeId {
    fn next() -> Self {
        Self(NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometry of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    /// Axis-aligned rectangle in the x/y plane
    Box {
        /// Extent along x
        width: f32,
        /// Extent along y
        height: f32,
    },
    /// Sphere
    Sphere {
        /// Radius
        radius: f32,
    },
}

/// A collision boundary attached to one entity
pub struct CollisionShape {
    id: ShapeId,
    kind: Cell<ShapeKind>,
    entity: RefCell<Option<EntityRef>>,
    offset: Cell<Vec3>,
    listener: RefCell<Option<ListenerRef>>,
    managers: RefCell<Vec<Weak<ManagerShared>>>,
    children: Vec<CollisionShape>,
}

impl CollisionShape {
    /// Create a shape with no entity attached yet
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            id: ShapeId::next(),
            kind: Cell::new(kind),
            entity: RefCell::new(None),
            offset: Cell::new(Vec3::zeros()),
            listener: RefCell::new(None),
            managers: RefCell::new(Vec::new()),
            children: Vec::new(),
        }
    }

    /// Box shape attached to `entity`
    pub fn new_box(entity: EntityRef, width: f32, height: f32) -> Self {
        Self::new(ShapeKind::Box { width, height }).with_entity(entity)
    }

    /// Sphere shape attached to `entity`
    pub fn sphere(entity: EntityRef, radius: f32) -> Self {
        Self::new(ShapeKind::Sphere { radius }).with_entity(entity)
    }

    /// Builder-style entity
    pub fn with_entity(self, entity: EntityRef) -> Self {
        self.set_entity(entity);
        self
    }

    /// Builder-style offset
    pub fn with_offset(self, offset: Vec3) -> Self {
        self.offset.set(offset);
        self
    }

    /// Builder-style listener
    pub fn with_listener(self, listener: ListenerRef) -> Self {
        self.set_listener(Some(listener));
        self
    }

    /// Builder-style child
    pub fn with_child(mut self, child: CollisionShape) -> Self {
        self.children.push(child);
        self
    }

    /// Wrap into a shared [`ShapeRef`]
    pub fn into_ref(self) -> ShapeRef {
        Rc::new(self)
    }

    /// Unique id of this shape
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Geometry of this shape
    pub fn kind(&self) -> ShapeKind {
        self.kind.get()
    }

    /// Box width, if this is a box
    pub fn width(&self) -> Option<f32> {
        match self.kind() {
            ShapeKind::Box { width, .. } => Some(width),
            ShapeKind::Sphere { .. } => None,
        }
    }

    /// Box height, if this is a box
    pub fn height(&self) -> Option<f32> {
        match self.kind() {
            ShapeKind::Box { height, .. } => Some(height),
            ShapeKind::Sphere { .. } => None,
        }
    }

    /// Sphere radius, if this is a sphere
    pub fn radius(&self) -> Option<f32> {
        match self.kind() {
            ShapeKind::Sphere { radius } => Some(radius),
            ShapeKind::Box { .. } => None,
        }
    }

    /// Resize a box. Returns false, leaving the shape alone, if this is not a box
    pub fn set_box_size(&self, width: f32, height: f32) -> bool {
        match self.kind() {
            ShapeKind::Box { .. } => {
                self.kind.set(ShapeKind::Box { width, height });
                true
            }
            ShapeKind::Sphere { .. } => false,
        }
    }

    /// Resize a sphere. Returns false, leaving the shape alone, if this is not a sphere
    pub fn set_radius(&self, radius: f32) -> bool {
        match self.kind() {
            ShapeKind::Sphere { .. } => {
                self.kind.set(ShapeKind::Sphere { radius });
                true
            }
            ShapeKind::Box { .. } => false,
        }
    }

    /// Entity this shape follows
    pub fn entity(&self) -> Option<EntityRef> {
        self.entity.borrow().clone()
    }

    /// Attach this shape to `entity`
    pub fn set_entity(&self, entity: EntityRef) {
        *self.entity.borrow_mut() = Some(entity);
    }

    /// Swap the entity reference, returning the previous one
    pub(crate) fn replace_entity(&self, entity: Option<EntityRef>) -> Option<EntityRef> {
        self.entity.replace(entity)
    }

    /// Offset from the entity position to the shape center
    pub fn offset(&self) -> Vec3 {
        self.offset.get()
    }

    /// Set the offset from the entity position
    pub fn set_offset(&self, offset: Vec3) {
        self.offset.set(offset);
    }

    /// Listener deciding and responding to collisions
    pub fn listener(&self) -> Option<ListenerRef> {
        self.listener.borrow().clone()
    }

    /// Replace the listener
    pub fn set_listener(&self, listener: Option<ListenerRef>) {
        *self.listener.borrow_mut() = listener;
    }

    /// Most recent manager whose live lists currently hold this shape
    ///
    /// Falls back to an earlier manager once the most recent one lets go.
    pub fn manager(&self) -> Option<CollisionManager> {
        self.managers
            .borrow()
            .iter()
            .rev()
            .find_map(Weak::upgrade)
            .map(CollisionManager::from_shared)
    }

    pub(crate) fn attach_manager(&self, shared: &Weak<ManagerShared>) {
        let mut managers = self.managers.borrow_mut();
        managers.retain(|held| held.strong_count() > 0 && !Weak::ptr_eq(held, shared));
        managers.push(shared.clone());
    }

    pub(crate) fn detach_manager(&self, shared: &Weak<ManagerShared>) {
        self.managers
            .borrow_mut()
            .retain(|held| held.strong_count() > 0 && !Weak::ptr_eq(held, shared));
    }

    /// Child shapes tested whenever this shape collides
    pub fn children(&self) -> &[CollisionShape] {
        &self.children
    }

    /// Append a child. Only possible while the shape is exclusively owned
    pub fn push_child(&mut self, child: CollisionShape) {
        self.children.push(child);
    }

    /// Effective center: entity position plus offset
    pub fn try_center(&self) -> Result<Vec3> {
        let entity = self.entity.borrow();
        let entity = entity.as_ref().ok_or(CollisionError::MissingEntity(self.id))?;
        let position = entity.borrow().position();
        Ok(position + self.offset.get())
    }

    /// Effective center
    ///
    /// # Panics
    /// Panics if no entity was ever attached to this shape.
    pub fn center(&self) -> Vec3 {
        match self.try_center() {
            Ok(center) => center,
            Err(err) => panic!("{err}"),
        }
    }

    fn bounding_box(&self, width: f32, height: f32) -> BoundingBox {
        BoundingBox::new(self.center(), width, height)
    }

    fn bounding_sphere(&self, radius: f32) -> BoundingSphere {
        BoundingSphere::new(self.center(), radius)
    }

    /// Test whether this shape currently overlaps `other`
    pub fn is_intersect(&self, other: &CollisionShape) -> bool {
        match (self.kind(), other.kind()) {
            (ShapeKind::Sphere { radius: a }, ShapeKind::Sphere { radius: b }) => {
                detect::sphere_sphere(&self.bounding_sphere(a), &other.bounding_sphere(b))
            }
            (
                ShapeKind::Box { width: wa, height: ha },
                ShapeKind::Box { width: wb, height: hb },
            ) => detect::box_box(&self.bounding_box(wa, ha), &other.bounding_box(wb, hb)),
            (ShapeKind::Box { width, height }, ShapeKind::Sphere { radius }) => {
                detect::box_sphere(
                    &self.bounding_box(width, height),
                    &other.bounding_sphere(radius),
                )
            }
            (ShapeKind::Sphere { radius }, ShapeKind::Box { width, height }) => {
                detect::box_sphere(
                    &other.bounding_box(width, height),
                    &self.bounding_sphere(radius),
                )
            }
        }
    }

    /// Full collision test against `other`: decide, then respond
    ///
    /// Returns whether this shape's listener reported a collision.
    pub fn test_collision(&self, other: &CollisionShape, delta: f32) -> bool {
        if self.check_collision(other, delta) {
            self.perform_collision(other, delta);
            true
        } else {
            false
        }
    }

    /// Ask the listener whether the pair collides
    ///
    /// On a hit every child is run through [`test_collision`](Self::test_collision)
    /// against `other` before returning. The children's outcomes do not affect
    /// the result. Shapes without a listener never collide.
    pub fn check_collision(&self, other: &CollisionShape, delta: f32) -> bool {
        let Some(listener) = self.listener() else {
            return false;
        };
        if !listener.is_collide(self, other, delta) {
            return false;
        }

        for child in &self.children {
            child.test_collision(other, delta);
        }
        true
    }

    /// Run the listener's response for the pair
    pub fn perform_collision(&self, other: &CollisionShape, delta: f32) {
        if let Some(listener) = self.listener() {
            listener.on_collide(self, other, delta);
        }
    }
}

impl fmt::Debug for CollisionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionShape")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("offset", &self.offset())
            .field("has_entity", &self.entity.borrow().is_some())
            .field("has_listener", &self.listener.borrow().is_some())
            .field("children", &self.children)
            .finish()
    }
}
