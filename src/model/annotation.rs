//! Annotation aggregate and per-object model.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::geometry::{BoundBox, Point, polygon_area};
use crate::constants::DEFAULT_POSE;

/// One labeled object on an image.
///
/// A polygon-backed object always keeps `bound_box` equal to the envelope of
/// its vertices. A box-only object has `polygon == None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectModel {
    /// Label text.
    pub name: String,
    /// VOC pose field.
    pub pose: String,
    pub truncated: bool,
    pub difficult: bool,
    bound_box: BoundBox,
    polygon: Option<Vec<Point>>,
}

impl ObjectModel {
    /// Create a box-backed object.
    pub fn with_box(name: impl Into<String>, bound_box: BoundBox) -> Self {
        Self {
            name: name.into(),
            pose: DEFAULT_POSE.to_string(),
            truncated: false,
            difficult: false,
            bound_box,
            polygon: None,
        }
    }

    /// Create a polygon-backed object; the bounding box is derived.
    pub fn with_polygon(name: impl Into<String>, vertices: Vec<Point>) -> Self {
        let mut model = Self::with_box(name, BoundBox::default());
        model.set_polygon(vertices);
        model
    }

    pub fn bound_box(&self) -> &BoundBox {
        &self.bound_box
    }

    pub fn polygon(&self) -> Option<&[Point]> {
        self.polygon.as_deref()
    }

    pub fn is_polygon(&self) -> bool {
        self.polygon.is_some()
    }

    /// Replace the box. Drops any polygon, turning this into a box object.
    pub fn set_box(&mut self, bound_box: BoundBox) {
        self.bound_box = bound_box;
        self.polygon = None;
    }

    /// Replace the polygon and re-derive the bounding box.
    pub fn set_polygon(&mut self, vertices: Vec<Point>) {
        self.bound_box = BoundBox::envelope(&vertices).unwrap_or_default();
        self.polygon = Some(vertices);
    }

    /// Drop the polygon, keeping its envelope as a plain box.
    pub fn clear_polygon(&mut self) {
        self.polygon = None;
    }

    /// Area of the box, or the shoelace area when a polygon is present.
    pub fn area(&self) -> f64 {
        match &self.polygon {
            Some(vertices) => polygon_area(vertices),
            None => self.bound_box.area(),
        }
    }
}

/// All annotations for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Image file this annotation belongs to.
    pub file: PathBuf,
    width: u32,
    height: u32,
    objects: Vec<ObjectModel>,
}

impl Annotation {
    pub fn new(file: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            file: file.into(),
            width,
            height,
            objects: Vec::new(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Image size from an explicit reload of the image file.
    pub fn reload_size(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            log::info!(
                "Image size of {:?} changed from {}x{} to {}x{}",
                self.file,
                self.width,
                self.height,
                width,
                height
            );
        }
        self.width = width;
        self.height = height;
    }

    pub fn objects(&self) -> &[ObjectModel] {
        &self.objects
    }

    pub fn push(&mut self, object: ObjectModel) {
        self.objects.push(object);
    }

    /// Replace the object list, e.g. from the editor's committed shapes.
    pub fn replace_objects(&mut self, objects: Vec<ObjectModel>) {
        self.objects = objects;
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Sum of all object areas.
    pub fn total_area(&self) -> f64 {
        self.objects.iter().map(ObjectModel::area).sum()
    }
}
