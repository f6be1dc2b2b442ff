//! Undo/Redo system for shape editing.
//!
//! Every discrete edit is recorded as a [`Change`] that knows how to invert,
//! re-apply and merge itself. [`UndoHistory`] keeps an unbounded history plus
//! one pending change that absorbs follow-up edits of the same shape until the
//! edit is settled.

use crate::shape::{CanvasShape, ShapeCollection, ShapeId, ShapeItem};

// ============================================================================
// Change Types
// ============================================================================

/// Shapes added to and/or removed from the collection at one index.
#[derive(Debug, Clone, PartialEq)]
pub struct ListChange {
    /// Collection index where the change happened.
    pub index: usize,
    /// Shapes that were removed, in collection order.
    pub removed: Vec<CanvasShape>,
    /// Shapes that were inserted, in collection order.
    pub added: Vec<CanvasShape>,
}

impl ListChange {
    pub fn added(index: usize, shape: CanvasShape) -> Self {
        Self {
            index,
            removed: Vec::new(),
            added: vec![shape],
        }
    }

    pub fn removed(index: usize, shape: CanvasShape) -> Self {
        Self {
            index,
            removed: vec![shape],
            added: Vec::new(),
        }
    }
}

/// Label text of one shape changed.
#[derive(Debug, Clone, PartialEq)]
pub struct NameChange {
    /// Shape whose label changed.
    pub shape: ShapeId,
    /// Label before the change.
    pub old: String,
    /// Label after the change.
    pub new: String,
}

/// Geometry of one shape changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeChange {
    /// Shape whose geometry changed.
    pub shape: ShapeId,
    /// Geometry before the change.
    pub old: ShapeItem,
    /// Geometry after the change.
    pub new: ShapeItem,
}

/// A reversible edit of the shape collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Shapes inserted or removed.
    List(ListChange),
    /// A shape was renamed.
    Name(NameChange),
    /// A shape was moved, resized or reshaped.
    Shape(ShapeChange),
}

impl Change {
    /// The change that exactly reverses this one.
    pub fn invert(&self) -> Change {
        match self {
            Change::List(c) => Change::List(ListChange {
                index: c.index,
                removed: c.added.clone(),
                added: c.removed.clone(),
            }),
            Change::Name(c) => Change::Name(NameChange {
                shape: c.shape,
                old: c.new.clone(),
                new: c.old.clone(),
            }),
            Change::Shape(c) => Change::Shape(ShapeChange {
                shape: c.shape,
                old: c.new.clone(),
                new: c.old.clone(),
            }),
        }
    }

    /// Apply this change's "new" state to `shapes`.
    pub fn redo(&self, shapes: &mut ShapeCollection) {
        match self {
            Change::List(c) => {
                for shape in &c.removed {
                    match shapes.index_of(shape.id) {
                        Some(index) => {
                            shapes.remove(index);
                        }
                        None => log::warn!("Shape {:?} to remove is not in the collection", shape.id),
                    }
                }
                for (offset, shape) in c.added.iter().enumerate() {
                    shapes.insert(c.index + offset, shape.clone());
                }
            }
            Change::Name(c) => match shapes.get_mut(c.shape) {
                Some(shape) => shape.set_name(&c.new),
                None => log::warn!("Shape {:?} to rename is not in the collection", c.shape),
            },
            Change::Shape(c) => match shapes.get_mut(c.shape) {
                Some(shape) => shape.set_item(c.new.clone()),
                None => log::warn!("Shape {:?} to reshape is not in the collection", c.shape),
            },
        }
    }

    /// The shape this change edits; list changes have no single target.
    pub fn target(&self) -> Option<ShapeId> {
        match self {
            Change::List(_) => None,
            Change::Name(c) => Some(c.shape),
            Change::Shape(c) => Some(c.shape),
        }
    }

    /// Combine `self` followed by `other` into one change, if both edit the
    /// same property of the same shape.
    pub fn merge_with(&self, other: &Change) -> Option<Change> {
        match (self, other) {
            (Change::Name(a), Change::Name(b)) if a.shape == b.shape => {
                Some(Change::Name(NameChange {
                    shape: a.shape,
                    old: a.old.clone(),
                    new: b.new.clone(),
                }))
            }
            (Change::Shape(a), Change::Shape(b)) if a.shape == b.shape => {
                Some(Change::Shape(ShapeChange {
                    shape: a.shape,
                    old: a.old.clone(),
                    new: b.new.clone(),
                }))
            }
            _ => None,
        }
    }

    /// True when applying the change would not alter anything.
    pub fn is_identity(&self) -> bool {
        match self {
            Change::List(c) => c.added.is_empty() && c.removed.is_empty(),
            Change::Name(c) => c.old == c.new,
            Change::Shape(c) => c.old == c.new,
        }
    }

    /// Get a human-readable description of this change
    pub fn description(&self) -> String {
        match self {
            Change::List(c) => match (c.added.as_slice(), c.removed.as_slice()) {
                ([shape], []) => format!("Add {}", shape.item().kind_name()),
                ([], [shape]) => format!("Delete {}", shape.item().kind_name()),
                (added, removed) => {
                    format!("Add {} / delete {} shapes", added.len(), removed.len())
                }
            },
            Change::Name(c) => format!("Rename to '{}'", c.new),
            Change::Shape(c) => format!("Move/resize {}", c.new.kind_name()),
        }
    }
}

// ============================================================================
// Undo History
// ============================================================================

/// Unbounded undo/redo history with a single pending change.
///
/// `undo_stack` holds settled changes (most recent last), `redo_stack` the
/// undone ones. A newly recorded change merges into `pending` when both edit
/// the same target; otherwise the pending change is settled first.
#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    undo_stack: Vec<Change>,
    redo_stack: Vec<Change>,
    pending: Option<Change>,
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit that has already been applied.
    ///
    /// Clears the redo stack. Identity changes are dropped.
    pub fn record(&mut self, change: Change) {
        if change.is_identity() {
            log::trace!("Undo: ignored no-op '{}'", change.description());
            return;
        }
        self.redo_stack.clear();

        match self.pending.take() {
            Some(pending) => match pending.merge_with(&change) {
                Some(merged) if merged.is_identity() => {
                    log::debug!("Undo: '{}' cancelled out", merged.description());
                }
                Some(merged) => {
                    log::trace!("Undo: merged into '{}'", merged.description());
                    self.pending = Some(merged);
                }
                None => {
                    self.undo_stack.push(pending);
                    self.pending = Some(change);
                }
            },
            None => self.pending = Some(change),
        }
    }

    /// Turn the pending change into a history entry.
    ///
    /// Returns `true` if there was a pending change.
    pub fn settle(&mut self) -> bool {
        match self.pending.take() {
            Some(change) => {
                log::debug!("Undo: pushed '{}'", change.description());
                self.undo_stack.push(change);
                true
            }
            None => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn has_undo(&self) -> bool {
        self.pending.is_some() || !self.undo_stack.is_empty()
    }

    pub fn has_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Revert the most recent change. Returns it, or `None` if there was none.
    pub fn undo(&mut self, shapes: &mut ShapeCollection) -> Option<&Change> {
        self.settle();
        let change = self.undo_stack.pop()?;
        log::debug!("Undo: '{}'", change.description());
        change.invert().redo(shapes);
        self.redo_stack.push(change);
        self.redo_stack.last()
    }

    /// Re-apply the most recently undone change.
    pub fn redo(&mut self, shapes: &mut ShapeCollection) -> Option<&Change> {
        let change = self.redo_stack.pop()?;
        log::debug!("Redo: '{}'", change.description());
        change.redo(shapes);
        self.undo_stack.push(change);
        self.undo_stack.last()
    }

    /// Description of the change `undo` would revert.
    pub fn undo_description(&self) -> Option<String> {
        self.pending
            .as_ref()
            .or(self.undo_stack.last())
            .map(Change::description)
    }

    /// Description of the change `redo` would re-apply.
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(Change::description)
    }

    /// Drop all history, including the pending change.
    pub fn forget_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
        log::debug!("Undo history cleared");
    }

    /// Number of entries `undo` can revert.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len() + usize::from(self.pending.is_some())
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
