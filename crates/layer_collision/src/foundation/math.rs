//! Math utilities and types
//!
//! Thin aliases over nalgebra so the rest of the crate speaks in `Vec3`/`Quat`.

pub use nalgebra::{Vector2, Vector3, UnitQuaternion};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Euclidean distance between two points
pub fn distance(a: &Vec3, b: &Vec3) -> f32 {
    (a - b).magnitude()
}

/// Squared distance between two points in the x/y plane
pub fn planar_distance_squared(a: &Vec3, b: &Vec3) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Integrate an orientation by an angular velocity (radians per second) over `dt`
pub fn integrate_rotation(rotation: &Quat, angular_velocity: &Vec3, dt: f32) -> Quat {
    let step = angular_velocity * dt;
    if step.magnitude_squared() == 0.0 {
        return *rotation;
    }
    Quat::from_scaled_axis(step) * rotation
}
