//! Keyboard input: polygon closing, deletion, nudging and label prefixes.

use web_time::Instant;

use super::{EditState, EditorEvent, Key, Modifiers, ShapeEditor};
use crate::shape::clamp_between;
use crate::undo::{Change, ShapeChange};

impl ShapeEditor {
    /// Handle a key press. Returns `true` when the key was consumed.
    pub fn key_pressed(&mut self, key: Key, modifiers: Modifiers) -> bool {
        match key {
            Key::Escape => {
                if matches!(self.state, EditState::DrawingPolygon { .. }) {
                    log::debug!("Polygon drawing aborted");
                    self.abort_drawing();
                    return true;
                }
                false
            }
            Key::Space => self.close_polygon_at_rubber(),
            Key::Enter => self.accept_selected_hint().is_some(),
            Key::Delete | Key::Backspace => {
                if matches!(
                    self.state,
                    EditState::DrawingBox { .. } | EditState::HandleDragging { .. }
                ) {
                    return false;
                }
                self.delete_selected()
            }
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                if !modifiers.shortcut {
                    return false;
                }
                match key.screen_direction() {
                    Some((dx, dy)) => self.nudge_selected(dx, dy),
                    None => false,
                }
            }
        }
    }

    /// Handle a typed character. While a shape is selected, characters build
    /// a prefix that assigns the first matching recent label.
    pub fn key_typed(&mut self, ch: char, now: Instant) -> bool {
        if ch.is_control() {
            return false;
        }
        let EditState::ShapeSelected { shape } = self.state else {
            return false;
        };
        let prefix = self.prefix.push(ch, now).to_string();
        let Some(label) = self.labels.find_prefix(&prefix).map(str::to_string) else {
            self.status(format!("No label starts with '{}'", prefix));
            return true;
        };
        log::debug!("Prefix '{}' matched label '{}'", prefix, label);
        if self.record_rename(shape, &label) {
            self.labels.touch(&label);
            self.notify_undo_state();
        }
        true
    }

    /// Space while drawing a polygon: the rubber-band point becomes the last
    /// vertex and the polygon is closed.
    fn close_polygon_at_rubber(&mut self) -> bool {
        let EditState::DrawingPolygon { vertices, rubber } = &mut self.state else {
            return false;
        };
        let Some(last) = *rubber else {
            return false;
        };
        let mut vertices = std::mem::take(vertices);
        vertices.push(last);
        self.close_polygon(vertices);
        true
    }

    /// Move the selected shape one nudge step in a screen direction.
    ///
    /// The step is remapped through the display rotation and clamped to the
    /// image. Consecutive nudges merge into one pending history entry.
    fn nudge_selected(&mut self, screen_dx: f64, screen_dy: f64) -> bool {
        let EditState::ShapeSelected { shape: id } = self.state else {
            return false;
        };
        let step = self.settings.nudge_step;
        let (dx, dy) = self.rotation.to_image(screen_dx * step, screen_dy * step);
        let (width, height) = (self.width, self.height);

        let Some(shape) = self.shapes.get_mut(id) else {
            return false;
        };
        let before = shape.item().create_copy();
        let bounds = before.bounds();
        let x = clamp_between(bounds.xmin + dx, 0.0, width - bounds.width());
        let y = clamp_between(bounds.ymin + dy, 0.0, height - bounds.height());
        shape.item_mut().move_to(x, y);
        shape.commit();
        let after = shape.item().create_copy();
        if after == before {
            return true;
        }

        self.history.record(Change::Shape(ShapeChange {
            shape: id,
            old: before,
            new: after,
        }));
        self.emit(EditorEvent::ShapeUpdated(id));
        self.notify_undo_state();
        true
    }
}
