//! Convex hull (Andrew's monotone chain)
//!
//! Positive y points up. The hull excludes collinear points and is returned
//! clockwise, starting at the point with the smallest (x, y).

use std::cmp::Ordering;

use crate::geometry::Vec2;

/// Lexicographic (x, then y) ordering used to presort hull input
pub fn point_comparator(a: &Vec2, b: &Vec2) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// Convex hull of an arbitrary point set. O(n log n).
pub fn make_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut sorted = points.to_vec();
    sorted.sort_by(point_comparator);
    make_hull_presorted(&sorted)
}

/// Convex hull of points already sorted by [`point_comparator`]. O(n).
pub fn make_hull_presorted(points: &[Vec2]) -> Vec<Vec2> {
    if points.len() <= 1 {
        return points.to_vec();
    }

    let mut upper = half_hull(points.iter());
    let mut lower = half_hull(points.iter().rev());
    upper.pop();
    lower.pop();

    if upper.len() == 1 && lower.len() == 1 && upper[0] == lower[0] {
        return upper;
    }
    upper.extend(lower);
    upper
}

fn half_hull<'a>(points: impl Iterator<Item = &'a Vec2>) -> Vec<Vec2> {
    let mut hull: Vec<Vec2> = Vec::new();
    for &p in points {
        while hull.len() >= 2 {
            let q = hull[hull.len() - 1];
            let r = hull[hull.len() - 2];
            if (q.x - r.x) * (p.y - r.y) >= (q.y - r.y) * (p.x - r.x) {
                hull.pop();
            } else {
                break;
            }
        }
        hull.push(p);
    }
    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_with_interior_points() {
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(2.0, 3.0),
        ];
        let hull = make_hull(&points);
        assert_eq!(
            hull,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 10.0),
                Vec2::new(10.0, 10.0),
                Vec2::new(10.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_collinear_points_dropped() {
        let points = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
        ];
        let hull = make_hull(&points);
        assert_eq!(hull.len(), 3);
        assert!(!hull.contains(&Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(make_hull(&[]).is_empty());

        let p = Vec2::new(1.0, 2.0);
        assert_eq!(make_hull(&[p, p, p]), vec![p]);

        let q = Vec2::new(3.0, 4.0);
        assert_eq!(make_hull(&[q, p]), vec![p, q]);
    }
}
