//! Ordered collection of shapes on the canvas.

use super::ShapeItem;
use crate::model::{ObjectModel, Point};

/// Stable identity of a canvas shape, independent of its list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u32);

/// A shape together with the object model it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasShape {
    pub id: ShapeId,
    item: ShapeItem,
    model: ObjectModel,
}

impl CanvasShape {
    pub fn new(id: ShapeId, model: ObjectModel) -> Self {
        let item = ShapeItem::from_model(&model);
        Self { id, item, model }
    }

    pub fn item(&self) -> &ShapeItem {
        &self.item
    }

    /// Mutable geometry for live edits. Call `commit` when the edit settles.
    pub fn item_mut(&mut self) -> &mut ShapeItem {
        &mut self.item
    }

    pub fn model(&self) -> &ObjectModel {
        &self.model
    }

    pub fn name(&self) -> &str {
        &self.model.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.model.name = name.to_string();
    }

    /// Replace the geometry and write it through to the model.
    pub fn set_item(&mut self, item: ShapeItem) {
        self.item = item;
        self.commit();
    }

    /// Write the current geometry into the bound model.
    pub fn commit(&mut self) {
        self.item.save(&mut self.model);
    }
}

/// Ordered shape list; the last shape is drawn on top.
#[derive(Debug, Clone, Default)]
pub struct ShapeCollection {
    shapes: Vec<CanvasShape>,
    next_id: u32,
}

impl ShapeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id that has never been used in this collection.
    pub fn allocate_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Wrap a model in a new canvas shape with a fresh id (not inserted).
    pub fn create(&mut self, model: ObjectModel) -> CanvasShape {
        let id = self.allocate_id();
        CanvasShape::new(id, model)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanvasShape> {
        self.shapes.iter()
    }

    pub fn as_slice(&self) -> &[CanvasShape] {
        &self.shapes
    }

    pub fn get(&self, id: ShapeId) -> Option<&CanvasShape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut CanvasShape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    pub fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id == id)
    }

    /// Insert at `index`, appending when the index is past the end.
    pub fn insert(&mut self, index: usize, shape: CanvasShape) {
        let index = index.min(self.shapes.len());
        self.shapes.insert(index, shape);
    }

    pub fn push(&mut self, shape: CanvasShape) {
        self.shapes.push(shape);
    }

    pub fn remove(&mut self, index: usize) -> Option<CanvasShape> {
        (index < self.shapes.len()).then(|| self.shapes.remove(index))
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Topmost shape containing `point`.
    pub fn hit_test(&self, point: &Point) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .find(|s| s.item.contains(point))
            .map(|s| s.id)
    }

    /// Object models in collection order, with geometry written through.
    pub fn models(&self) -> Vec<ObjectModel> {
        self.shapes
            .iter()
            .map(|s| {
                let mut model = s.model.clone();
                s.item.save(&mut model);
                model
            })
            .collect()
    }
}
