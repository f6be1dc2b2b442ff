//! Input and output types of the shape editor.
//!
//! Input is what the host reports (keys, modifiers); output is a queue of
//! [`EditorEvent`]s the host drains after each call and reacts to.

use crate::model::{BoundBox, Point};
use crate::shape::ShapeId;

/// Which shape a fresh pointer gesture draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Rectangle,
    Polygon,
}

impl DrawMode {
    pub fn name(&self) -> &'static str {
        match self {
            DrawMode::Rectangle => "Rectangle",
            DrawMode::Polygon => "Polygon",
        }
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Space,
    Enter,
    Delete,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// Unit step on screen for arrow keys (y grows downward).
    pub(crate) fn screen_direction(self) -> Option<(f64, f64)> {
        match self {
            Key::ArrowUp => Some((0.0, -1.0)),
            Key::ArrowDown => Some((0.0, 1.0)),
            Key::ArrowLeft => Some((-1.0, 0.0)),
            Key::ArrowRight => Some((1.0, 0.0)),
            _ => None,
        }
    }
}

/// Modifier state of a pointer or key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    /// Platform shortcut key (Ctrl, or Cmd on macOS).
    pub shortcut: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        shortcut: false,
    };

    pub const SHORTCUT: Modifiers = Modifiers {
        shift: false,
        shortcut: true,
    };
}

/// Clockwise rotation of the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Snap any angle to the nearest quarter turn.
    pub fn from_degrees(degrees: i32) -> Self {
        match ((degrees as f64 / 90.0).round() as i32).rem_euclid(4) {
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            3 => Rotation::Deg270,
            _ => Rotation::Deg0,
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Map a screen direction to image axes.
    pub fn to_image(&self, dx: f64, dy: f64) -> (f64, f64) {
        match self {
            Rotation::Deg0 => (dx, dy),
            Rotation::Deg90 => (dy, -dx),
            Rotation::Deg180 => (-dx, -dy),
            Rotation::Deg270 => (-dy, dx),
        }
    }
}

/// What is currently selected. Selection is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Shape(ShapeId),
    /// Index into the editor's hint list.
    Hint(usize),
}

/// Live outline of a shape being drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Box(BoundBox),
    Path {
        vertices: Vec<Point>,
        /// Segment end following the pointer.
        rubber: Option<Point>,
    },
}

impl Preview {
    pub fn bounds(&self) -> Option<BoundBox> {
        match self {
            Preview::Box(b) => Some(*b),
            Preview::Path { vertices, rubber } => {
                let env = BoundBox::envelope(vertices)?;
                Some(match rubber {
                    Some(p) => env.union(&BoundBox::new(p.x, p.y, p.x, p.y)),
                    None => env,
                })
            }
        }
    }
}

/// Notifications emitted by the editor, drained by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Erase `erase` (previous preview, inflated) and draw `preview`.
    Redraw {
        erase: Option<BoundBox>,
        preview: Option<Preview>,
    },
    SelectionChanged(Selection),
    /// Shapes were added to or removed from the collection.
    ShapesChanged,
    /// Geometry or label of one shape changed.
    ShapeUpdated(ShapeId),
    HintsChanged,
    /// Transient status-bar text.
    Status(String),
    /// Show the label popup for a freshly committed shape.
    RequestLabel {
        shape: ShapeId,
        suggestion: Option<String>,
    },
    ContextMenuClosed,
    UndoStateChanged {
        has_undo: bool,
        has_redo: bool,
    },
    /// A change became a discrete history entry; eligible for saving.
    ChangeSettled,
}
