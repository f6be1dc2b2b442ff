//! Pointer input: drawing, selecting, moving and resizing shapes.

use super::{DrawMode, EditState, EditorEvent, Grip, Modifiers, Preview, ShapeEditor};
use crate::constants::MIN_POLYGON_VERTICES;
use crate::model::{BoundBox, Point};
use crate::shape::{ShapeId, ShapeItem, clamp_between};
use crate::undo::{Change, ShapeChange};

impl ShapeEditor {
    /// Pointer button pressed at `point` (image coordinates).
    ///
    /// `click_count` is 2 for the second press of a double-click.
    pub fn pointer_pressed(&mut self, point: Point, click_count: u32, modifiers: Modifiers) {
        let point = point.clamped(self.width, self.height);
        if self.context_menu_open {
            self.context_menu_open = false;
            self.emit(EditorEvent::ContextMenuClosed);
        }

        match std::mem::take(&mut self.state) {
            EditState::DrawingPolygon { mut vertices, rubber } => {
                if click_count >= 2 {
                    self.close_polygon(vertices);
                } else {
                    vertices.push(point);
                    self.state = EditState::DrawingPolygon { vertices, rubber };
                    self.redraw_polygon_preview();
                }
            }
            EditState::ShapeSelected { shape } => {
                self.state = EditState::ShapeSelected { shape };
                if !self.try_grab(shape, point) {
                    self.press_on_canvas(point, click_count, modifiers);
                }
            }
            state @ (EditState::DrawingBox { .. } | EditState::HandleDragging { .. }) => {
                log::trace!("Ignoring press while in {}", state.name());
                self.state = state;
            }
            EditState::Idle => self.press_on_canvas(point, click_count, modifiers),
        }
    }

    /// Pointer moved with no button held.
    pub fn pointer_moved(&mut self, point: Point) {
        if let EditState::DrawingPolygon { rubber, .. } = &mut self.state {
            *rubber = Some(point.clamped(self.width, self.height));
            self.redraw_polygon_preview();
        }
    }

    /// Pointer moved with the button held.
    pub fn pointer_dragged(&mut self, point: Point) {
        let point = point.clamped(self.width, self.height);
        let limits = self.limits();
        match &mut self.state {
            EditState::DrawingBox { anchor, current } => {
                *current = point;
                let preview = BoundBox::from_corners(*anchor, point);
                self.redraw_preview(Some(Preview::Box(preview)));
            }
            EditState::DrawingPolygon { .. } => self.pointer_moved(point),
            EditState::HandleDragging { shape, grip, .. } => {
                let (id, grip) = (*shape, *grip);
                let Some(canvas_shape) = self.shapes.get_mut(id) else {
                    return;
                };
                let item = canvas_shape.item_mut();
                match grip {
                    Grip::Handle(kind) => item.drag_handle(kind, point, &limits),
                    Grip::Body { dx, dy } => {
                        let bounds = item.bounds();
                        let x = clamp_between(point.x - dx, 0.0, limits.width - bounds.width());
                        let y = clamp_between(point.y - dy, 0.0, limits.height - bounds.height());
                        item.move_to(x, y);
                    }
                }
                self.emit(EditorEvent::ShapeUpdated(id));
            }
            EditState::Idle | EditState::ShapeSelected { .. } => {}
        }
    }

    /// Pointer button released.
    pub fn pointer_released(&mut self, point: Point) {
        let point = point.clamped(self.width, self.height);
        match std::mem::take(&mut self.state) {
            EditState::DrawingBox { anchor, .. } => {
                self.redraw_preview(None);
                let bounds = BoundBox::from_corners(anchor, point);
                if self.is_large_enough(&bounds) {
                    self.commit_drawn_shape(ShapeItem::rectangle(bounds));
                } else {
                    log::debug!(
                        "Discarded box {:.1}x{:.1} below minimum {:.1}",
                        bounds.width(),
                        bounds.height(),
                        self.min_size()
                    );
                    self.status("Shape too small");
                }
            }
            EditState::HandleDragging { shape, before, .. } => {
                self.state = EditState::ShapeSelected { shape };
                self.finish_drag(shape, before);
            }
            state => self.state = state,
        }
    }

    /// Start a drag when `point` hits a handle or the body of the selected shape.
    fn try_grab(&mut self, id: ShapeId, point: Point) -> bool {
        let Some(shape) = self.shapes.get(id) else {
            return false;
        };
        let item = shape.item();
        let grip = match item.handle_at(&point, self.settings.handle_pixels, self.zoom) {
            Some(kind) => Grip::Handle(kind),
            None if item.contains(&point) => Grip::Body {
                dx: point.x - item.min_x(),
                dy: point.y - item.min_y(),
            },
            None => return false,
        };
        log::trace!("Grabbed {:?} of shape {:?}", grip, id);
        self.state = EditState::HandleDragging {
            shape: id,
            grip,
            before: item.create_copy(),
        };
        true
    }

    /// Press that did not land on the selected shape.
    fn press_on_canvas(&mut self, point: Point, click_count: u32, modifiers: Modifiers) {
        if let Some(id) = self.shapes.hit_test(&point) {
            self.select_shape(id);
            self.try_grab(id, point);
            return;
        }
        if let Some(index) = self.hints.iter().rposition(|h| h.contains(&point)) {
            self.select_hint(index);
            return;
        }

        self.clear_selection();
        match self.draw_mode {
            DrawMode::Rectangle => {
                self.state = EditState::DrawingBox {
                    anchor: point,
                    current: point,
                };
            }
            DrawMode::Polygon if click_count >= 2 || modifiers.shortcut => {
                log::debug!("Started polygon at ({:.1}, {:.1})", point.x, point.y);
                self.state = EditState::DrawingPolygon {
                    vertices: vec![point],
                    rubber: None,
                };
                self.redraw_polygon_preview();
            }
            DrawMode::Polygon => {}
        }
    }

    /// Record the geometry change of a finished drag as one settled entry.
    fn finish_drag(&mut self, id: ShapeId, before: ShapeItem) {
        let Some(shape) = self.shapes.get_mut(id) else {
            return;
        };
        shape.commit();
        let after = shape.item().create_copy();
        if after != before {
            self.history.record(Change::Shape(ShapeChange {
                shape: id,
                old: before,
                new: after,
            }));
        }
        self.settle();
        self.notify_undo_state();
    }

    /// Close the polygon being drawn and commit it if it is valid.
    pub(super) fn close_polygon(&mut self, vertices: Vec<Point>) {
        self.state = EditState::Idle;
        self.redraw_preview(None);
        if vertices.len() < MIN_POLYGON_VERTICES {
            self.status(format!(
                "A polygon needs at least {} points",
                MIN_POLYGON_VERTICES
            ));
            return;
        }
        match BoundBox::envelope(&vertices) {
            Some(bounds) if self.is_large_enough(&bounds) => {
                self.commit_drawn_shape(ShapeItem::polygon(vertices));
            }
            _ => self.status("Shape too small"),
        }
    }

    pub(super) fn is_large_enough(&self, bounds: &BoundBox) -> bool {
        let min = self.min_size();
        bounds.width() > min && bounds.height() > min
    }

    fn redraw_polygon_preview(&mut self) {
        if let EditState::DrawingPolygon { vertices, rubber } = &self.state {
            let preview = Preview::Path {
                vertices: vertices.clone(),
                rubber: *rubber,
            };
            self.redraw_preview(Some(preview));
        }
    }
}
