//! Shared numeric constants.

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Default EBB stepper resolution (steps per millimeter).
pub const EBB_STEPS_PER_MM: f64 = 80.0;

/// Positions closer than this (in drawing units) are treated as the same vertex.
pub const VERTEX_EPSILON: f64 = 1e-6;

/// Tolerance used when deciding whether a point lies on a plane.
pub const PLANE_EPSILON: f64 = 1e-9;

/// Minimum number of point correspondences for a homography.
pub const MIN_CORRESPONDENCES: usize = 4;

/// Extent of crosshair lines, in drawing units.
pub const LARGE_EXTENT: f64 = 1000.0;

/// Tool diameter assumed when a toolpath mark does not name one (1/8 inch).
pub const DEFAULT_TOOL_DIAMETER: f64 = 3.175;
