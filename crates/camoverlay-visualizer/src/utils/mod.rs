//! Shared helpers

pub mod arcs;

pub use arcs::{circle_polygon, flatten_arc, flatten_three_point_arc, ARC_TOLERANCE};
