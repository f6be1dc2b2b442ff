//! labelkit - image annotation shape editing
//!
//! The editing core of an image annotation tool: rectangles and polygons on a
//! zoomable, rotatable canvas with handles, undo/redo with change merging,
//! label prefix search and Pascal VOC persistence. Rendering is left to the
//! host, which feeds pointer and key input in and draws from [`editor::EditorEvent`]s.

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod editor;
pub mod format;
pub mod image_source;
pub mod model;
pub mod session;
pub mod shape;
pub mod undo;
pub mod worker;

pub use config::AppConfig;
pub use editor::{EditorEvent, ShapeEditor};
pub use model::{Annotation, BoundBox, ObjectModel, Point, RecentLabels};
pub use session::{AnnotationSession, SessionError};
