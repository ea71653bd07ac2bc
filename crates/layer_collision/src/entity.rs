//! Entity collaborator contract
//!
//! Collision shapes never own the thing they are attached to. They hold a
//! shared [`EntityRef`] to something implementing [`Entity`], read its
//! position when testing geometry, and, for swept prediction only, advance a
//! physics-only [`Body`] snapshot of it.

use crate::foundation::math::{integrate_rotation, Quat, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared, non-owning handle to an entity as seen by the collision engine
pub type EntityRef = Rc<RefCell<dyn Entity>>;

/// Kinematic state the collision engine reads from its owner
pub trait Entity {
    /// Current position in world space
    fn position(&self) -> Vec3;

    /// Move the entity
    fn set_position(&mut self, position: Vec3);

    /// Linear velocity in units per second
    fn velocity(&self) -> Vec3;

    /// Set linear velocity
    fn set_velocity(&mut self, velocity: Vec3);

    /// Linear acceleration in units per second squared
    fn acceleration(&self) -> Vec3;

    /// Set linear acceleration
    fn set_acceleration(&mut self, acceleration: Vec3);

    /// Orientation
    fn rotation(&self) -> Quat {
        Quat::identity()
    }

    /// Angular velocity in radians per second
    fn angular_velocity(&self) -> Vec3 {
        Vec3::zeros()
    }

    /// Physics-only copy of this entity; anything beyond kinematics is dropped
    fn physics_clone(&self) -> Body {
        Body {
            position: self.position(),
            velocity: self.velocity(),
            acceleration: self.acceleration(),
            rotation: self.rotation(),
            angular_velocity: self.angular_velocity(),
        }
    }
}

/// Plain kinematic state
///
/// Used directly by callers that have nothing richer to attach, and as the
/// throwaway clone advanced during swept prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Position in world space
    pub position: Vec3,
    /// Linear velocity in units per second
    pub velocity: Vec3,
    /// Linear acceleration in units per second squared
    pub acceleration: Vec3,
    /// Orientation
    pub rotation: Quat,
    /// Angular velocity in radians per second
    pub angular_velocity: Vec3,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            rotation: Quat::identity(),
            angular_velocity: Vec3::zeros(),
        }
    }
}

impl Body {
    /// Create a body at rest at `position`
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a body at `position` moving with `velocity`
    pub fn moving(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            ..Default::default()
        }
    }

    /// Builder-style acceleration
    pub fn with_acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Wrap into a shared [`EntityRef`]
    pub fn into_ref(self) -> EntityRef {
        Rc::new(RefCell::new(self))
    }

    /// Advance by `dt` seconds (semi-implicit Euler)
    pub fn advance(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
        self.rotation = integrate_rotation(&self.rotation, &self.angular_velocity, dt);
    }
}

impl Entity for Body {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    fn set_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration = acceleration;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Ship {
        body: Body,
        mesh_name: String,
    }

    impl Entity for Ship {
        fn position(&self) -> Vec3 {
            self.body.position
        }

        fn set_position(&mut self, position: Vec3) {
            self.body.position = position;
        }

        fn velocity(&self) -> Vec3 {
            self.body.velocity
        }

        fn set_velocity(&mut self, velocity: Vec3) {
            self.body.velocity = velocity;
        }

        fn acceleration(&self) -> Vec3 {
            self.body.acceleration
        }

        fn set_acceleration(&mut self, acceleration: Vec3) {
            self.body.acceleration = acceleration;
        }
    }

    #[test]
    fn test_advance_constant_velocity() {
        let mut body = Body::moving(Vec3::zeros(), Vec3::new(2.0, 0.0, 0.0));
        body.advance(0.5);
        assert_relative_eq!(body.position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_advance_applies_acceleration_first() {
        let mut body = Body::at(Vec3::zeros()).with_acceleration(Vec3::new(0.0, -10.0, 0.0));
        body.advance(1.0);
        assert_relative_eq!(body.velocity, Vec3::new(0.0, -10.0, 0.0));
        assert_relative_eq!(body.position, Vec3::new(0.0, -10.0, 0.0));
    }

    #[test]
    fn test_physics_clone_drops_payload() {
        let ship = Ship {
            body: Body::moving(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 1.0, 0.0)),
            mesh_name: "frigate".to_string(),
        };
        let clone = ship.physics_clone();
        assert_eq!(clone.position, ship.body.position);
        assert_eq!(clone.velocity, ship.body.velocity);
        assert_eq!(ship.mesh_name, "frigate");
    }
}
