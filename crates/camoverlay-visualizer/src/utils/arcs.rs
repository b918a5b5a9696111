//! Arc flattening
//!
//! Scene arcs are stored as three points so they survive a projective warp.
//! Output backends and the circle generator flatten them through lyon.

use std::f64::consts::TAU;

use lyon::algorithms::path::iterator::PathIterator;
use lyon::geom::Arc;
use lyon::math::{point, vector, Angle, Point};
use lyon::path::{Event, Path};

use camoverlay_core::{circle_through, Vec2};

/// Maximum chord deviation, in scene units
pub const ARC_TOLERANCE: f64 = 0.05;

fn to_vec2(p: Point) -> Vec2 {
    Vec2::new(p.x as f64, p.y as f64)
}

/// Flatten a circular arc into a polyline, start point included
pub fn flatten_arc(
    center: Vec2,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    tolerance: f64,
) -> Vec<Vec2> {
    if !(radius.is_finite() && radius > 0.0) {
        return Vec::new();
    }

    let c = point(center.x as f32, center.y as f32);
    let r = radius as f32;
    let start = c + vector(
        r * (start_angle as f32).cos(),
        r * (start_angle as f32).sin(),
    );

    let mut builder = Path::builder();
    builder.begin(start);
    let arc = Arc {
        center: c,
        radii: vector(r, r),
        x_rotation: Angle::radians(0.0),
        start_angle: Angle::radians(start_angle as f32),
        sweep_angle: Angle::radians(sweep as f32),
    };
    arc.for_each_cubic_bezier(&mut |ctrl| {
        builder.cubic_bezier_to(ctrl.ctrl1, ctrl.ctrl2, ctrl.to);
    });
    builder.end(false);
    let path = builder.build();

    let mut points = Vec::new();
    for event in path.iter().flattened(tolerance as f32) {
        match event {
            Event::Begin { at } => points.push(to_vec2(at)),
            Event::Line { to, .. } => points.push(to_vec2(to)),
            _ => {}
        }
    }
    points
}

/// Closed polygon approximating a circle (first point not repeated)
pub fn circle_polygon(center: Vec2, radius: f64, tolerance: f64) -> Vec<Vec2> {
    let mut points = flatten_arc(center, radius, 0.0, TAU, tolerance);
    if points.len() > 1 {
        points.pop();
    }
    points
}

/// Flatten the arc that starts at `start`, passes `through` and ends at `end`
///
/// Coincident start and end describe a full circle with `through` opposite
/// the start. Collinear points degrade to the straight chord.
pub fn flatten_three_point_arc(start: Vec2, through: Vec2, end: Vec2, tolerance: f64) -> Vec<Vec2> {
    const EPS: f64 = 1e-9;

    if start.distance(end) < EPS {
        if start.distance(through) < EPS {
            return vec![start, end];
        }
        let center = (start + through) * 0.5;
        let radius = center.distance(start);
        let a_s = (start.y - center.y).atan2(start.x - center.x);
        let mut points = flatten_arc(center, radius, a_s, TAU, tolerance);
        if let Some(last) = points.last_mut() {
            *last = end;
        }
        return points;
    }

    let Some((center, radius)) = circle_through(start, through, end) else {
        return vec![start, end];
    };

    let angle = |p: Vec2| (p.y - center.y).atan2(p.x - center.x);
    let a_s = angle(start);
    let d_through = (angle(through) - a_s).rem_euclid(TAU);
    let d_end = (angle(end) - a_s).rem_euclid(TAU);
    let sweep = if d_through <= d_end {
        d_end
    } else {
        d_end - TAU
    };

    let mut points = flatten_arc(center, radius, a_s, sweep, tolerance);
    if let Some(first) = points.first_mut() {
        *first = start;
    }
    if let Some(last) = points.last_mut() {
        *last = end;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_radius_error(points: &[Vec2], center: Vec2, radius: f64) -> f64 {
        points
            .iter()
            .map(|p| (p.distance(center) - radius).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_circle_polygon_on_circle() {
        let center = Vec2::new(10.0, -4.0);
        let points = circle_polygon(center, 5.0, ARC_TOLERANCE);
        assert!(points.len() >= 8);
        assert!(max_radius_error(&points, center, 5.0) < 1e-2);
    }

    #[test]
    fn test_three_point_arc_passes_through_side() {
        // Upper half from (0,0) over (5,5) to (10,0)
        let points = flatten_three_point_arc(
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(10.0, 0.0),
            ARC_TOLERANCE,
        );
        assert_eq!(points.first(), Some(&Vec2::new(0.0, 0.0)));
        assert_eq!(points.last(), Some(&Vec2::new(10.0, 0.0)));
        assert!(points.iter().all(|p| p.y >= -1e-3));
        assert!(points.iter().any(|p| p.y > 4.9));
    }

    #[test]
    fn test_three_point_arc_lower_side() {
        let points = flatten_three_point_arc(
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(10.0, 0.0),
            ARC_TOLERANCE,
        );
        assert!(points.iter().all(|p| p.y <= 1e-3));
    }

    #[test]
    fn test_degenerate_arc_is_chord() {
        let start = Vec2::new(0.0, 0.0);
        let end = Vec2::new(10.0, 0.0);
        assert_eq!(
            flatten_three_point_arc(start, start, end, ARC_TOLERANCE),
            vec![start, end]
        );
    }

    #[test]
    fn test_full_circle() {
        let start = Vec2::new(10.0, 0.0);
        let points = flatten_three_point_arc(start, Vec2::new(0.0, 0.0), start, ARC_TOLERANCE);
        assert!(max_radius_error(&points, Vec2::new(5.0, 0.0), 5.0) < 1e-2);
        assert!(points.iter().any(|p| p.x < 0.1));
    }
}
