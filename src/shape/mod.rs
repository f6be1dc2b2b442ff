//! Editable shapes shown on the canvas.
//!
//! `ShapeItem` is a closed set of two variants. Geometry logic lives here and
//! knows nothing about rendering; the editor turns it into draw events.

mod collection;
mod polygon;
mod rectangle;

pub use collection::{CanvasShape, ShapeCollection, ShapeId};
pub use polygon::PolygonItem;
pub use rectangle::RectangleItem;

use crate::model::{BoundBox, ObjectModel, Point, polygon_contains};

/// Rectangle corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

impl Corner {
    fn moves_left_edge(self) -> bool {
        matches!(self, Corner::NorthWest | Corner::SouthWest)
    }

    fn moves_top_edge(self) -> bool {
        matches!(self, Corner::NorthWest | Corner::NorthEast)
    }
}

/// What a handle controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Corner(Corner),
    Vertex(usize),
}

/// A draggable control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub center: Point,
    /// Edge length in image pixels (`HANDLE_PIXELS / zoom`).
    pub size: f64,
}

impl Handle {
    pub fn hit(&self, point: &Point) -> bool {
        let half = self.size / 2.0;
        (point.x - self.center.x).abs() <= half && (point.y - self.center.y).abs() <= half
    }

    pub fn bounds(&self) -> BoundBox {
        let half = self.size / 2.0;
        BoundBox::new(
            self.center.x - half,
            self.center.y - half,
            self.center.x + half,
            self.center.y + half,
        )
    }
}

/// Image-space handle size for a zoom factor.
pub fn handle_size(handle_pixels: f64, zoom: f64) -> f64 {
    if zoom > 0.0 {
        handle_pixels / zoom
    } else {
        handle_pixels
    }
}

/// Constraints applied while dragging handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragLimits {
    /// Image width in pixels.
    pub width: f64,
    /// Image height in pixels.
    pub height: f64,
    /// Minimum extent of a rectangle on each axis.
    pub min_size: f64,
}

/// `value.max(lo).min(hi)`, never panicking when `lo > hi`.
pub(crate) fn clamp_between(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// An editable shape bound to one annotated object.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeItem {
    Rectangle(RectangleItem),
    Polygon(PolygonItem),
}

impl ShapeItem {
    pub fn rectangle(bounds: BoundBox) -> Self {
        ShapeItem::Rectangle(RectangleItem::new(bounds))
    }

    pub fn polygon(vertices: Vec<Point>) -> Self {
        ShapeItem::Polygon(PolygonItem::new(vertices))
    }

    /// Build the shape for a model: polygon when it has vertices, box otherwise.
    pub fn from_model(model: &ObjectModel) -> Self {
        match model.polygon() {
            Some(vertices) => Self::polygon(vertices.to_vec()),
            None => Self::rectangle(*model.bound_box()),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ShapeItem::Rectangle(_) => "rectangle",
            ShapeItem::Polygon(_) => "polygon",
        }
    }

    pub fn bounds(&self) -> BoundBox {
        match self {
            ShapeItem::Rectangle(r) => r.bounds(),
            ShapeItem::Polygon(p) => p.bounds(),
        }
    }

    pub fn min_x(&self) -> f64 {
        self.bounds().xmin
    }

    pub fn min_y(&self) -> f64 {
        self.bounds().ymin
    }

    pub fn max_x(&self) -> f64 {
        self.bounds().xmax
    }

    pub fn max_y(&self) -> f64 {
        self.bounds().ymax
    }

    /// Control points: four corners for a rectangle, one per polygon vertex.
    pub fn handles(&self, handle_pixels: f64, zoom: f64) -> Vec<Handle> {
        let size = handle_size(handle_pixels, zoom);
        match self {
            ShapeItem::Rectangle(r) => r
                .corners()
                .into_iter()
                .map(|(corner, center)| Handle {
                    kind: HandleKind::Corner(corner),
                    center,
                    size,
                })
                .collect(),
            ShapeItem::Polygon(p) => p
                .vertices()
                .iter()
                .enumerate()
                .map(|(i, v)| Handle {
                    kind: HandleKind::Vertex(i),
                    center: *v,
                    size,
                })
                .collect(),
        }
    }

    /// Handle under `point`, if any.
    pub fn handle_at(&self, point: &Point, handle_pixels: f64, zoom: f64) -> Option<HandleKind> {
        self.handles(handle_pixels, zoom)
            .into_iter()
            .find(|h| h.hit(point))
            .map(|h| h.kind)
    }

    pub fn contains(&self, point: &Point) -> bool {
        match self {
            ShapeItem::Rectangle(r) => r.bounds().contains(point),
            ShapeItem::Polygon(p) => polygon_contains(p.vertices(), point),
        }
    }

    /// Translate the whole shape so its top-left anchor lands on `(x, y)`.
    ///
    /// No clamping is done here; the editor clamps against the image first.
    pub fn move_to(&mut self, x: f64, y: f64) {
        let dx = x - self.min_x();
        let dy = y - self.min_y();
        self.translate(dx, dy);
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            ShapeItem::Rectangle(r) => r.translate(dx, dy),
            ShapeItem::Polygon(p) => p.translate(dx, dy),
        }
    }

    /// Apply a handle drag. Handles of the wrong kind for the variant are ignored.
    pub fn drag_handle(&mut self, handle: HandleKind, point: Point, limits: &DragLimits) {
        match (self, handle) {
            (ShapeItem::Rectangle(r), HandleKind::Corner(corner)) => {
                r.drag_corner(corner, point, limits)
            }
            (ShapeItem::Polygon(p), HandleKind::Vertex(i)) => p.drag_vertex(i, point, limits),
            (shape, handle) => {
                log::warn!("Handle {:?} does not apply to a {}", handle, shape.kind_name());
            }
        }
    }

    /// Take over the geometry of `other`.
    pub fn copy_from(&mut self, other: &ShapeItem) {
        self.clone_from(other);
    }

    /// Independent value copy, used for the clipboard and history snapshots.
    pub fn create_copy(&self) -> ShapeItem {
        self.clone()
    }

    /// Write the current geometry into `model`.
    pub fn save(&self, model: &mut ObjectModel) {
        match self {
            ShapeItem::Rectangle(r) => model.set_box(r.bounds()),
            ShapeItem::Polygon(p) => model.set_polygon(p.vertices().to_vec()),
        }
    }
}
