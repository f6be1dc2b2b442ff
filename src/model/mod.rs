//! Data models: geometry, annotation aggregate and label service.

mod annotation;
mod geometry;
mod labels;

pub use annotation::{Annotation, ObjectModel};
pub use geometry::{BoundBox, Point, polygon_area, polygon_contains};
pub use labels::RecentLabels;
