//! Inference-suggested shapes.

use serde::{Deserialize, Serialize};

use crate::model::{BoundBox, Point};

/// A provisional box suggested by an inference model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub label: String,
    pub bound_box: BoundBox,
    /// Model confidence in `[0, 1]`.
    pub confidence: f32,
}

impl Hint {
    pub fn new(label: impl Into<String>, bound_box: BoundBox, confidence: f32) -> Self {
        Self {
            label: label.into(),
            bound_box,
            confidence,
        }
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.bound_box.contains(point)
    }
}
