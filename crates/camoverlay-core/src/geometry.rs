//! Geometric primitives
//!
//! Vectors are `glam` double-precision types. Segments and planes are the
//! building blocks of the slicer: toolpath moves become [`Segment3`]s and
//! each cutting depth becomes a horizontal [`Plane3`].

use crate::constants::PLANE_EPSILON;

pub use glam::{DVec2 as Vec2, DVec3 as Vec3};

/// A straight segment between two points in machine space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment3 {
    pub v1: Vec3,
    pub v2: Vec3,
}

impl Segment3 {
    pub fn new(v1: Vec3, v2: Vec3) -> Self {
        Self { v1, v2 }
    }

    pub fn direction(&self) -> Vec3 {
        self.v2 - self.v1
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    /// Point at parameter `t` (0 = v1, 1 = v2)
    pub fn point_at(&self, t: f64) -> Vec3 {
        self.v1 + self.direction() * t
    }

    /// XY projection of both endpoints
    pub fn to_2d(&self) -> (Vec2, Vec2) {
        (self.v1.truncate(), self.v2.truncate())
    }
}

/// Result of intersecting a segment with a plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersect {
    /// The segment crosses or touches the plane at one point
    Point(Vec3),
    /// The segment lies in the plane
    Segment(Segment3),
}

impl Intersect {
    /// All points of the intersection
    pub fn points(&self) -> Vec<Vec3> {
        match self {
            Intersect::Point(p) => vec![*p],
            Intersect::Segment(s) => vec![s.v1, s.v2],
        }
    }
}

/// A plane given by a point on it and its normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane3 {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane3 {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Horizontal plane at height `z` (normal +Z)
    pub fn horizontal(z: f64) -> Self {
        Self {
            point: Vec3::new(0.0, 0.0, z),
            normal: Vec3::Z,
        }
    }

    pub fn signed_distance(&self, p: Vec3) -> f64 {
        (p - self.point).dot(self.normal)
    }

    /// Intersect a segment with this plane.
    ///
    /// Returns the whole segment when it is coplanar, a single point when it
    /// crosses or touches the plane, and `None` when both endpoints are on
    /// the same side.
    pub fn intersect_segment(&self, seg: &Segment3) -> Option<Intersect> {
        let d1 = self.signed_distance(seg.v1);
        let d2 = self.signed_distance(seg.v2);
        let on1 = d1.abs() <= PLANE_EPSILON;
        let on2 = d2.abs() <= PLANE_EPSILON;

        match (on1, on2) {
            (true, true) => Some(Intersect::Segment(*seg)),
            (true, false) => Some(Intersect::Point(seg.v1)),
            (false, true) => Some(Intersect::Point(seg.v2)),
            (false, false) if d1 * d2 > 0.0 => None,
            (false, false) => {
                let t = d1 / (d1 - d2);
                Some(Intersect::Point(seg.point_at(t)))
            }
        }
    }
}

/// Circle through three points, as `(center, radius)`.
///
/// Returns `None` when the points are collinear or coincident.
pub fn circle_through(a: Vec2, b: Vec2, c: Vec2) -> Option<(Vec2, f64)> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let a2 = a.length_squared();
    let b2 = b.length_squared();
    let c2 = c.length_squared();
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    let center = Vec2::new(ux, uy);
    Some((center, center.distance(a)))
}
