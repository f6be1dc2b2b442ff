//! Axis-aligned rectangle shape.

use super::{Corner, DragLimits};
use crate::model::{BoundBox, Point};

/// Editable rectangle backed directly by its bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleItem {
    bounds: BoundBox,
}

impl RectangleItem {
    pub fn new(bounds: BoundBox) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> BoundBox {
        self.bounds
    }

    /// Corner positions in NW, NE, SE, SW order.
    pub fn corners(&self) -> [(Corner, Point); 4] {
        let b = &self.bounds;
        [
            (Corner::NorthWest, Point::new(b.xmin, b.ymin)),
            (Corner::NorthEast, Point::new(b.xmax, b.ymin)),
            (Corner::SouthEast, Point::new(b.xmax, b.ymax)),
            (Corner::SouthWest, Point::new(b.xmin, b.ymax)),
        ]
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.bounds.xmin += dx;
        self.bounds.xmax += dx;
        self.bounds.ymin += dy;
        self.bounds.ymax += dy;
    }

    /// Move `corner` toward `point`.
    ///
    /// The opposite edges stay at least `limits.min_size` apart and the moved
    /// edges stay inside the image. When both cannot hold, the image bound wins.
    pub fn drag_corner(&mut self, corner: Corner, point: Point, limits: &DragLimits) {
        let b = &mut self.bounds;
        let min = limits.min_size;
        if corner.moves_left_edge() {
            b.xmin = point.x.min(b.xmax - min).max(0.0);
        } else {
            b.xmax = point.x.max(b.xmin + min).min(limits.width);
        }
        if corner.moves_top_edge() {
            b.ymin = point.y.min(b.ymax - min).max(0.0);
        } else {
            b.ymax = point.y.max(b.ymin + min).min(limits.height);
        }
    }
}
