//! Property tests for homography estimation

use camoverlay_core::{Homography, HomographyRecord, Vec2};
use proptest::prelude::*;

const SQUARE: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(100.0, 0.0),
    Vec2::new(100.0, 100.0),
    Vec2::new(0.0, 100.0),
];

fn jittered_square() -> impl Strategy<Value = Vec<Vec2>> {
    prop::collection::vec((-20.0f64..20.0, -20.0f64..20.0), 4).prop_map(|offsets| {
        SQUARE
            .iter()
            .zip(offsets)
            .map(|(corner, (dx, dy))| *corner + Vec2::new(dx, dy))
            .collect()
    })
}

proptest! {
    #[test]
    fn corners_map_onto_their_targets(dst in jittered_square()) {
        let h = Homography::from_correspondences(&SQUARE, &dst).unwrap();
        for (src, dst) in SQUARE.iter().zip(&dst) {
            let mapped = h.transform_point(*src);
            prop_assert!(mapped.distance(*dst) < 1e-6, "{:?} -> {:?}, wanted {:?}", src, mapped, dst);
        }
    }

    #[test]
    fn inverse_undoes_the_warp(dst in jittered_square(), x in 0.0f64..100.0, y in 0.0f64..100.0) {
        let h = Homography::from_correspondences(&SQUARE, &dst).unwrap();
        let inverse = h.inverse().unwrap();
        let p = Vec2::new(x, y);
        let back = inverse.transform_point(h.transform_point(p));
        prop_assert!(back.distance(p) < 1e-6);
    }

    #[test]
    fn record_round_trip_preserves_mapping(dst in jittered_square()) {
        let record = HomographyRecord::from_points(&SQUARE, &dst);
        let parsed = HomographyRecord::from_json(&record.to_json()).unwrap();
        let direct = Homography::from_correspondences(&SQUARE, &dst).unwrap();
        let restored = Homography::from_record(&parsed).unwrap();
        let p = restored.transform_point(Vec2::new(50.0, 50.0));
        prop_assert!(p.distance(direct.transform_point(Vec2::new(50.0, 50.0))) < 1e-6);
    }
}

#[test]
fn identical_points_give_identity() {
    let h = Homography::from_correspondences(&SQUARE, &SQUARE).unwrap();
    assert!(h.is_identity());
    let p = h.transform_point(Vec2::new(12.5, -3.0));
    assert!(p.distance(Vec2::new(12.5, -3.0)) < 1e-9);
}
