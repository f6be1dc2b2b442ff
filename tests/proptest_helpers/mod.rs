#![allow(dead_code)]

use labelkit::model::{Annotation, BoundBox, ObjectModel, Point};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const EPS_AREA: f64 = 1e-6;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Point with whole-pixel coordinates inside a `w` x `h` image.
pub fn arb_pixel_point(w: u32, h: u32) -> impl Strategy<Value = Point> {
    (0..=w, 0..=h).prop_map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
}

/// Point with fractional coordinates.
pub fn arb_point(limit: f64) -> impl Strategy<Value = Point> {
    (-limit..limit, -limit..limit).prop_map(|(x, y)| Point::new(x, y))
}

/// Normalized box with whole-pixel corners inside a `w` x `h` image.
pub fn arb_pixel_box(w: u32, h: u32) -> impl Strategy<Value = BoundBox> {
    (arb_pixel_point(w, h), arb_pixel_point(w, h)).prop_map(|(a, b)| BoundBox::from_corners(a, b))
}

pub fn arb_label() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z_]{0,11}").expect("valid label regex")
}

/// Box or polygon object with whole-pixel coordinates.
pub fn arb_object(w: u32, h: u32) -> impl Strategy<Value = ObjectModel> {
    let boxed = (arb_label(), arb_pixel_box(w, h))
        .prop_map(|(name, b)| ObjectModel::with_box(name, b));
    let polygon = (
        arb_label(),
        proptest::collection::vec(arb_pixel_point(w, h), 3..12),
    )
        .prop_map(|(name, vertices)| ObjectModel::with_polygon(name, vertices));
    (prop_oneof![boxed, polygon], any::<bool>(), any::<bool>()).prop_map(
        |(mut object, truncated, difficult)| {
            object.truncated = truncated;
            object.difficult = difficult;
            object
        },
    )
}

pub fn arb_annotation(max_objects: usize) -> impl Strategy<Value = Annotation> {
    (1u32..400, 1u32..400).prop_flat_map(move |(w, h)| {
        proptest::collection::vec(arb_object(w, h), 0..=max_objects).prop_map(move |objects| {
            let mut annotation = Annotation::new(format!("img_{}x{}.jpg", w, h), w, h);
            annotation.replace_objects(objects);
            annotation
        })
    })
}
