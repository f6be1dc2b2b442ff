//! Polygon shape.

use super::DragLimits;
use crate::model::{BoundBox, Point};

/// Editable polygon. The envelope is recomputed after every vertex change.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonItem {
    vertices: Vec<Point>,
    envelope: BoundBox,
}

impl PolygonItem {
    pub fn new(vertices: Vec<Point>) -> Self {
        let envelope = BoundBox::envelope(&vertices).unwrap_or_default();
        Self { vertices, envelope }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn bounds(&self) -> BoundBox {
        self.envelope
    }

    fn refresh_envelope(&mut self) {
        self.envelope = BoundBox::envelope(&self.vertices).unwrap_or_default();
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for v in &mut self.vertices {
            v.x += dx;
            v.y += dy;
        }
        self.refresh_envelope();
    }

    /// Move one vertex, clamped to the image. Self-intersection is allowed.
    pub fn drag_vertex(&mut self, index: usize, point: Point, limits: &DragLimits) {
        let Some(vertex) = self.vertices.get_mut(index) else {
            log::warn!("Vertex {} out of range ({} vertices)", index, self.vertices.len());
            return;
        };
        *vertex = point.clamped(limits.width, limits.height);
        self.refresh_envelope();
    }
}
