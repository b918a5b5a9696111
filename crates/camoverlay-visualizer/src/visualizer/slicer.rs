//! Depth slicing
//!
//! The toolpath is turned into 3D segments, every segment is intersected with
//! a horizontal plane at each distinct cutting depth, and the intersection
//! points are reduced to a convex silhouette per depth.
//!
//! Discontinuous regions on the same plane merge into a single silhouette.

use camoverlay_core::constants::PLANE_EPSILON;
use camoverlay_core::{make_hull, Intersect, Plane3, Segment3, Vec2, Vec3};

use crate::ir::IrNode;

/// Silhouette of the path at one depth
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub depth: f64,
    pub hull: Vec<Vec2>,
}

/// Segments between consecutive resolved positions
///
/// Arcs become two chords through their through-point. The first node only
/// establishes the starting position.
pub fn segments_from_irs(irs: &[IrNode]) -> Vec<Segment3> {
    let mut segments = Vec::new();
    let mut current: Option<Vec3> = None;

    for ir in irs {
        let from = current.unwrap_or(Vec3::ZERO);
        let to = ir.resolve(from);

        if let Some(from) = current {
            if ir.is_arc() {
                let geom = ir.arc_geometry(from.truncate());
                let through = geom.through.extend(0.5 * (from.z + to.z));
                segments.push(Segment3::new(from, through));
                segments.push(Segment3::new(through, to));
            } else if from != to {
                segments.push(Segment3::new(from, to));
            }
        }
        current = Some(to);
    }

    segments
}

/// Intersection of a segment with a plane
pub fn find_intersect(segment: &Segment3, plane: &Plane3) -> Option<Intersect> {
    plane.intersect_segment(segment)
}

/// Distinct negative depths, shallowest first
pub fn cutting_depths(points: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut depths: Vec<f64> = points.into_iter().filter(|z| *z < 0.0).collect();
    depths.sort_by(|a, b| b.total_cmp(a));
    depths.dedup_by(|a, b| (*a - *b).abs() < PLANE_EPSILON);
    depths
}

/// Slice the path at every distinct cutting depth
pub fn slice(irs: &[IrNode]) -> Vec<Slice> {
    let segments = segments_from_irs(irs);
    let depths = cutting_depths(segments.iter().flat_map(|s| [s.v1.z, s.v2.z]));

    depths
        .into_iter()
        .filter_map(|depth| {
            let plane = Plane3::horizontal(depth);
            let points: Vec<Vec2> = segments
                .iter()
                .filter_map(|segment| find_intersect(segment, &plane))
                .flat_map(|hit| hit.points())
                .map(|p| p.truncate())
                .collect();
            let hull = make_hull(&points);
            if hull.is_empty() {
                None
            } else {
                Some(Slice { depth, hull })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::lower_gcode;

    fn program(src: &[&str]) -> Vec<IrNode> {
        lower_gcode(&src.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_segments_skip_first_node() {
        let irs = program(&["G0 X0 Y0 Z5", "G1 Z-1", "G1 X10"]);
        let segments = segments_from_irs(&irs);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].v1, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(segments[1].v2, Vec3::new(10.0, 0.0, -1.0));
    }

    #[test]
    fn test_cutting_depths_distinct_negative() {
        assert_eq!(
            cutting_depths([0.0, -1.0, 2.0, -2.0, -1.0, -0.5]),
            vec![-0.5, -1.0, -2.0]
        );
    }

    #[test]
    fn test_square_pocket_slices() {
        let irs = program(&[
            "G0 X0 Y0 Z5",
            "G1 Z-1",
            "G1 X10",
            "G1 Y10",
            "G1 X0",
            "G1 Y0",
            "G1 Z-2",
            "G1 X5 Y5",
        ]);
        let slices = slice(&irs);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].depth, -1.0);
        assert_eq!(slices[0].hull.len(), 4);
        assert_eq!(slices[1].depth, -2.0);
        // Only the plunge and the final diagonal lie on the deeper plane
        assert_eq!(slices[1].hull.len(), 2);
    }

    #[test]
    fn test_arc_contributes_through_point() {
        let irs = crate::ir::lower_sbp(&[
            "M3,0,0,-1".to_string(),
            "CG,10,10,0,5,0,T,-1".to_string(),
        ]);
        let segments = segments_from_irs(&irs);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].v2.truncate(), Vec2::new(10.0, 0.0));
    }
}
