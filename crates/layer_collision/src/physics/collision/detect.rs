//! Narrow-phase intersection tests
//!
//! Stateless tests between world-space bounds. Spheres are tested in 3D;
//! boxes are axis-aligned rectangles in the x/y plane (width along x,
//! height along y), so box tests ignore z.
//!
//! Boundary handling differs on purpose: spheres that exactly touch do not
//! intersect, boxes whose edges exactly touch do.

use crate::foundation::math::{distance, planar_distance_squared, Vec3};

/// A world-space sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// A world-space axis-aligned rectangle in the x/y plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Center of the box in world space
    pub center: Vec3,
    /// Extent along x
    pub width: f32,
    /// Extent along y
    pub height: f32,
}

impl BoundingBox {
    /// Creates a new box centered at `center`
    pub fn new(center: Vec3, width: f32, height: f32) -> Self {
        Self { center, width, height }
    }

    /// Half of the width
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    /// Half of the height
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    /// Corner of the box nearest to `point` in the x/y plane
    pub fn nearest_corner(&self, point: &Vec3) -> Vec3 {
        let x = if point.x < self.center.x {
            self.center.x - self.half_width()
        } else {
            self.center.x + self.half_width()
        };
        let y = if point.y < self.center.y {
            self.center.y - self.half_height()
        } else {
            self.center.y + self.half_height()
        };
        Vec3::new(x, y, self.center.z)
    }
}

/// Sphere vs sphere: strictly closer than the sum of the radii
pub fn sphere_sphere(a: &BoundingSphere, b: &BoundingSphere) -> bool {
    distance(&a.center, &b.center) < a.radius + b.radius
}

/// Box vs box: overlap on both axes, touching edges included
pub fn box_box(a: &BoundingBox, b: &BoundingBox) -> bool {
    let dx = (a.center.x - b.center.x).abs();
    let dy = (a.center.y - b.center.y).abs();

    dx <= (a.width + b.width) * 0.5 && dy <= (a.height + b.height) * 0.5
}

/// Box vs sphere
///
/// Classifies the sphere center against the box:
/// 1. farther than half extent + radius on either axis: no contact
/// 2. strictly inside the box: contact
/// 3. within the box's horizontal span: compare vertical distance
/// 4. within the box's vertical span: compare horizontal distance
/// 5. otherwise it faces a corner: compare squared distance to the corner
///    nearest the sphere against the squared radius
///
/// Case 5 picks the corner from the sign of the center delta and compares
/// squared quantities on both sides. Content tuned against an always-the-same
/// corner test will see different results for spheres near the other three
/// corners.
pub fn box_sphere(rect: &BoundingBox, sphere: &BoundingSphere) -> bool {
    let half_width = rect.half_width();
    let half_height = rect.half_height();
    let radius = sphere.radius;

    let dx = (sphere.center.x - rect.center.x).abs();
    let dy = (sphere.center.y - rect.center.y).abs();

    if dx > half_width + radius || dy > half_height + radius {
        return false;
    }

    if dx < half_width && dy < half_height {
        return true;
    }

    if dx <= half_width {
        return dy <= radius + half_height;
    }

    if dy <= half_height {
        return dx <= radius + half_width;
    }

    let corner = rect.nearest_corner(&sphere.center);
    planar_distance_squared(&sphere.center, &corner) <= radius * radius
}
