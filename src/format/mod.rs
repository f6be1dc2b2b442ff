//! Annotation persistence.
//!
//! ## Supported Formats
//!
//! - **Pascal VOC XML**: per-image XML files with boxes and polygons
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labelkit::format::voc;
//!
//! let annotation = voc::read_annotation_file(Path::new("photo.xml"))?;
//! let xml = voc::write_annotation(&annotation)?;
//! ```

mod error;
mod save;
pub mod voc;

pub use error::FormatError;
pub use save::SaveManager;

#[cfg(test)]
mod tests;
