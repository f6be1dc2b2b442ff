use labelkit::model::{BoundBox, ObjectModel, Point, polygon_area};
use proptest::prelude::*;

mod proptest_helpers;

use proptest_helpers::EPS_AREA;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPS_AREA * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn box_area_is_non_negative(a in proptest_helpers::arb_point(1e4), b in proptest_helpers::arb_point(1e4)) {
        let area = BoundBox::from_corners(a, b).area();
        prop_assert!(area >= 0.0);
        prop_assert!(close(area, (a.x - b.x).abs() * (a.y - b.y).abs()));
    }

    #[test]
    fn polygon_area_is_invariant_under_translation(
        vertices in proptest::collection::vec(proptest_helpers::arb_point(500.0), 3..10),
        dx in -500.0f64..500.0,
        dy in -500.0f64..500.0,
    ) {
        let moved: Vec<Point> = vertices.iter().map(|p| Point::new(p.x + dx, p.y + dy)).collect();
        prop_assert!(close(polygon_area(&vertices), polygon_area(&moved)));
    }

    #[test]
    fn polygon_area_ignores_starting_vertex(
        vertices in proptest::collection::vec(proptest_helpers::arb_point(500.0), 3..10),
        shift in 0usize..10,
    ) {
        let mut rotated = vertices.clone();
        rotated.rotate_left(shift % vertices.len());
        prop_assert!(close(polygon_area(&vertices), polygon_area(&rotated)));
    }

    #[test]
    fn polygon_area_is_invariant_under_quarter_turns(
        vertices in proptest::collection::vec(proptest_helpers::arb_point(500.0), 3..10),
        turns in 0usize..4,
    ) {
        let mut rotated = vertices.clone();
        for _ in 0..turns {
            rotated = rotated.iter().map(|p| Point::new(-p.y, p.x)).collect();
        }
        prop_assert!(close(polygon_area(&vertices), polygon_area(&rotated)));
    }

    #[test]
    fn polygon_area_ignores_winding(
        vertices in proptest::collection::vec(proptest_helpers::arb_point(500.0), 3..10),
    ) {
        let mut reversed = vertices.clone();
        reversed.reverse();
        let area = polygon_area(&vertices);
        prop_assert!(area >= 0.0);
        prop_assert!(close(area, polygon_area(&reversed)));
    }

    #[test]
    fn polygon_object_box_is_vertex_envelope(
        vertices in proptest::collection::vec(proptest_helpers::arb_point(500.0), 3..10),
    ) {
        let object = ObjectModel::with_polygon("p", vertices.clone());
        let b = object.bound_box();
        for p in &vertices {
            prop_assert!(b.contains(p));
        }
        prop_assert_eq!(Some(*b), BoundBox::envelope(&vertices));
    }
}
