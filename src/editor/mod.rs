//! Interactive shape editor.
//!
//! `ShapeEditor` is a state machine fed with pointer and keyboard input in
//! image-local coordinates. It owns the shape collection, the selection, the
//! inference hints and the undo history, and reports everything a view needs
//! through [`EditorEvent`]s.
//!
//! ```text
//! Idle ──press (rect mode)──────────────▶ DrawingBox ──release──▶ ShapeSelected | Idle
//! Idle ──double-click / shortcut-click──▶ DrawingPolygon ──close──▶ ShapeSelected | Idle
//! ShapeSelected ──press on handle/body──▶ HandleDragging ──release──▶ ShapeSelected
//! ```

mod event;
mod hint;
mod keyboard;
mod pointer;
mod prefix;

pub use event::{DrawMode, EditorEvent, Key, Modifiers, Preview, Rotation, Selection};
pub use hint::Hint;
pub use prefix::PrefixBuffer;

use crate::constants::{
    DEFAULT_NUDGE_STEP, HANDLE_PIXELS, MIN_SIZE_FACTOR, PASTE_OFFSET, PREFIX_TIMEOUT,
    PREVIEW_MARGIN,
};
use crate::model::{BoundBox, ObjectModel, Point, RecentLabels};
use crate::shape::{
    CanvasShape, DragLimits, Handle, HandleKind, ShapeCollection, ShapeId, ShapeItem, handle_size,
};
use crate::undo::{Change, ListChange, NameChange, UndoHistory};

/// Tunables of the editor, usually taken from the app config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    /// On-screen handle size in pixels.
    pub handle_pixels: f64,
    /// Arrow-key nudge distance in image pixels.
    pub nudge_step: f64,
    /// Ask for a label right after a shape is drawn.
    pub auto_name: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            handle_pixels: HANDLE_PIXELS,
            nudge_step: DEFAULT_NUDGE_STEP,
            auto_name: true,
        }
    }
}

/// What a handle drag grabbed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grip {
    Handle(HandleKind),
    /// Whole-shape move; offset from the shape's top-left to the press point.
    Body { dx: f64, dy: f64 },
}

/// Editor state machine states.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    DrawingBox {
        anchor: Point,
        current: Point,
    },
    DrawingPolygon {
        vertices: Vec<Point>,
        rubber: Option<Point>,
    },
    ShapeSelected {
        shape: ShapeId,
    },
    HandleDragging {
        shape: ShapeId,
        grip: Grip,
        /// Geometry at press time, the "old" side of the recorded change.
        before: ShapeItem,
    },
}

impl EditState {
    pub fn name(&self) -> &'static str {
        match self {
            EditState::Idle => "Idle",
            EditState::DrawingBox { .. } => "DrawingBox",
            EditState::DrawingPolygon { .. } => "DrawingPolygon",
            EditState::ShapeSelected { .. } => "ShapeSelected",
            EditState::HandleDragging { .. } => "HandleDragging",
        }
    }

    fn selected_shape(&self) -> Option<ShapeId> {
        match self {
            EditState::ShapeSelected { shape } | EditState::HandleDragging { shape, .. } => {
                Some(*shape)
            }
            _ => None,
        }
    }
}

/// The interactive editing engine for one image.
#[derive(Debug)]
pub struct ShapeEditor {
    width: f64,
    height: f64,
    zoom: f64,
    rotation: Rotation,
    draw_mode: DrawMode,
    settings: EditorSettings,
    state: EditState,
    shapes: ShapeCollection,
    hints: Vec<Hint>,
    selected_hint: Option<usize>,
    history: UndoHistory,
    labels: RecentLabels,
    prefix: PrefixBuffer,
    clipboard: Option<ObjectModel>,
    context_menu_open: bool,
    /// Bounds of the last preview drawn, erased on the next frame.
    preview_region: Option<BoundBox>,
    events: Vec<EditorEvent>,
    /// Last reported (has_undo, has_redo).
    undo_state: (bool, bool),
}

impl ShapeEditor {
    /// Create an editor for an image of `width` x `height` pixels.
    pub fn new(width: u32, height: u32, settings: EditorSettings, labels: RecentLabels) -> Self {
        Self {
            width: f64::from(width),
            height: f64::from(height),
            zoom: 1.0,
            rotation: Rotation::default(),
            draw_mode: DrawMode::default(),
            settings,
            state: EditState::Idle,
            shapes: ShapeCollection::new(),
            hints: Vec::new(),
            selected_hint: None,
            history: UndoHistory::new(),
            labels,
            prefix: PrefixBuffer::new(PREFIX_TIMEOUT),
            clipboard: None,
            context_menu_open: false,
            preview_region: None,
            events: Vec::new(),
            undo_state: (false, false),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn shapes(&self) -> &ShapeCollection {
        &self.shapes
    }

    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    pub fn labels(&self) -> &RecentLabels {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut RecentLabels {
        &mut self.labels
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        if self.draw_mode != mode {
            log::debug!("Draw mode: {}", mode.name());
            self.draw_mode = mode;
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the canvas zoom factor; non-positive values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn image_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Handle edge length in image pixels at the current zoom.
    pub fn handle_size(&self) -> f64 {
        handle_size(self.settings.handle_pixels, self.zoom)
    }

    /// Minimum shape extent on each axis at the current zoom.
    pub fn min_size(&self) -> f64 {
        MIN_SIZE_FACTOR * self.handle_size()
    }

    fn limits(&self) -> DragLimits {
        DragLimits {
            width: self.width,
            height: self.height,
            min_size: self.min_size(),
        }
    }

    pub fn selection(&self) -> Selection {
        match (self.state.selected_shape(), self.selected_hint) {
            (Some(id), _) => Selection::Shape(id),
            (None, Some(index)) => Selection::Hint(index),
            (None, None) => Selection::None,
        }
    }

    pub fn selected_shape(&self) -> Option<&CanvasShape> {
        self.state.selected_shape().and_then(|id| self.shapes.get(id))
    }

    pub fn selected_model(&self) -> Option<&ObjectModel> {
        self.selected_shape().map(CanvasShape::model)
    }

    /// Handles of the selected shape, for drawing.
    pub fn selected_handles(&self) -> Vec<Handle> {
        self.selected_shape()
            .map(|s| s.item().handles(self.settings.handle_pixels, self.zoom))
            .unwrap_or_default()
    }

    pub fn has_undo(&self) -> bool {
        self.history.has_undo()
    }

    pub fn has_redo(&self) -> bool {
        self.history.has_redo()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<String> {
        self.history.redo_description()
    }

    /// Committed object models in collection order.
    pub fn models(&self) -> Vec<ObjectModel> {
        self.shapes.models()
    }

    /// Take all events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: EditorEvent) {
        self.events.push(event);
    }

    fn status(&mut self, message: impl Into<String>) {
        self.emit(EditorEvent::Status(message.into()));
    }

    /// Emit `UndoStateChanged` if availability differs from what was last reported.
    fn notify_undo_state(&mut self) {
        let current = (self.history.has_undo(), self.history.has_redo());
        if current != self.undo_state {
            self.undo_state = current;
            self.emit(EditorEvent::UndoStateChanged {
                has_undo: current.0,
                has_redo: current.1,
            });
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Replace all shapes with `objects` and forget the history.
    pub fn load_objects(&mut self, objects: Vec<ObjectModel>) {
        self.abort_drawing();
        self.shapes.clear();
        for model in objects {
            let shape = self.shapes.create(model);
            self.shapes.push(shape);
        }
        self.state = EditState::Idle;
        self.hints.clear();
        self.selected_hint = None;
        self.history.forget_history();
        self.prefix.clear();
        log::debug!("Loaded {} shapes into the editor", self.shapes.len());
        self.emit(EditorEvent::SelectionChanged(Selection::None));
        self.emit(EditorEvent::ShapesChanged);
        self.emit(EditorEvent::HintsChanged);
        self.notify_undo_state();
    }

    /// Drop the undo history (file switch, close, or explicit save).
    pub fn forget_history(&mut self) {
        self.history.forget_history();
        self.notify_undo_state();
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Settle the pending change, reporting it if there was one.
    fn settle(&mut self) {
        if self.history.settle() {
            self.emit(EditorEvent::ChangeSettled);
        }
    }

    /// Select a shape, deselecting everything else including hints.
    pub fn select_shape(&mut self, id: ShapeId) {
        if self.shapes.get(id).is_none() {
            log::warn!("Cannot select unknown shape {:?}", id);
            return;
        }
        if self.state.selected_shape() == Some(id) && self.selected_hint.is_none() {
            return;
        }
        self.settle();
        self.state = EditState::ShapeSelected { shape: id };
        self.selected_hint = None;
        self.prefix.clear();
        self.emit(EditorEvent::SelectionChanged(Selection::Shape(id)));
        self.notify_undo_state();
    }

    /// Select a hint, deselecting any shape.
    pub fn select_hint(&mut self, index: usize) {
        if index >= self.hints.len() {
            return;
        }
        if self.selected_hint == Some(index) && self.state.selected_shape().is_none() {
            return;
        }
        self.settle();
        if self.state.selected_shape().is_some() {
            self.state = EditState::Idle;
        }
        self.selected_hint = Some(index);
        self.emit(EditorEvent::SelectionChanged(Selection::Hint(index)));
        self.notify_undo_state();
    }

    /// Deselect everything. Closes the context menu when something was selected.
    pub fn clear_selection(&mut self) {
        if self.selection() == Selection::None {
            return;
        }
        self.settle();
        if self.state.selected_shape().is_some() {
            self.state = EditState::Idle;
        }
        self.selected_hint = None;
        self.prefix.clear();
        self.emit(EditorEvent::SelectionChanged(Selection::None));
        if self.context_menu_open {
            self.context_menu_open = false;
            self.emit(EditorEvent::ContextMenuClosed);
        }
        self.notify_undo_state();
    }

    /// Mark the context menu as shown for the current selection.
    pub fn open_context_menu(&mut self) -> bool {
        if self.selection() == Selection::None {
            return false;
        }
        self.context_menu_open = true;
        true
    }

    pub fn is_context_menu_open(&self) -> bool {
        self.context_menu_open
    }

    // ========================================================================
    // Committing edits
    // ========================================================================

    /// Explicit commit boundary: the pending change becomes a history entry.
    pub fn commit(&mut self) {
        self.settle();
        self.notify_undo_state();
    }

    /// Insert a new shape at the end of the collection as one history entry
    /// and select it.
    fn commit_new_shape(&mut self, model: ObjectModel) -> ShapeId {
        self.settle();
        let shape = self.shapes.create(model);
        let id = shape.id;
        let index = self.shapes.len();
        log::debug!(
            "Committed {} '{}' at index {}",
            shape.item().kind_name(),
            shape.name(),
            index
        );
        self.shapes.push(shape.clone());
        self.history.record(Change::List(ListChange::added(index, shape)));
        self.settle();
        self.emit(EditorEvent::ShapesChanged);
        self.select_shape(id);
        self.notify_undo_state();
        id
    }

    /// Commit a freshly drawn shape, naming it after the most recent label and
    /// asking for a label when auto-naming applies.
    fn commit_drawn_shape(&mut self, item: ShapeItem) -> ShapeId {
        let suggestion = self.labels.most_recent().map(str::to_string);
        let mut model =
            ObjectModel::with_box(suggestion.clone().unwrap_or_default(), BoundBox::default());
        item.save(&mut model);
        let id = self.commit_new_shape(model);
        if self.settings.auto_name && suggestion.is_some() {
            self.emit(EditorEvent::RequestLabel {
                shape: id,
                suggestion,
            });
        }
        id
    }

    /// Set the label of a shape as one settled history entry.
    pub fn rename_shape(&mut self, id: ShapeId, name: &str) -> bool {
        if !self.record_rename(id, name) {
            return false;
        }
        self.labels.touch(name);
        self.settle();
        self.notify_undo_state();
        true
    }

    /// Set the label of the selected shape (label popup confirmation).
    pub fn rename_selected(&mut self, name: &str) -> bool {
        match self.state.selected_shape() {
            Some(id) => self.rename_shape(id, name),
            None => false,
        }
    }

    /// Apply and record a rename without settling it.
    fn record_rename(&mut self, id: ShapeId, name: &str) -> bool {
        let Some(shape) = self.shapes.get_mut(id) else {
            return false;
        };
        let old = shape.name().to_string();
        if old == name {
            return false;
        }
        shape.set_name(name);
        self.history.record(Change::Name(NameChange {
            shape: id,
            old,
            new: name.to_string(),
        }));
        self.emit(EditorEvent::ShapeUpdated(id));
        true
    }

    /// Remove the selected shape (one history entry), or discard the selected hint.
    pub fn delete_selected(&mut self) -> bool {
        match self.selection() {
            Selection::Shape(id) => {
                self.settle();
                let Some(index) = self.shapes.index_of(id) else {
                    return false;
                };
                let Some(removed) = self.shapes.remove(index) else {
                    return false;
                };
                log::debug!("Deleted '{}' at index {}", removed.name(), index);
                self.history
                    .record(Change::List(ListChange::removed(index, removed)));
                self.state = EditState::Idle;
                self.settle();
                self.emit(EditorEvent::ShapesChanged);
                self.emit(EditorEvent::SelectionChanged(Selection::None));
                if self.context_menu_open {
                    self.context_menu_open = false;
                    self.emit(EditorEvent::ContextMenuClosed);
                }
                self.notify_undo_state();
                true
            }
            Selection::Hint(index) => {
                self.hints.remove(index);
                self.selected_hint = None;
                self.emit(EditorEvent::HintsChanged);
                self.emit(EditorEvent::SelectionChanged(Selection::None));
                true
            }
            Selection::None => false,
        }
    }

    // ========================================================================
    // Undo / redo
    // ========================================================================

    /// Revert the last change. Drawing in progress is aborted first.
    pub fn undo(&mut self) -> Option<String> {
        if matches!(self.state, EditState::HandleDragging { .. }) {
            return None;
        }
        self.abort_drawing();
        let description = self.history.undo(&mut self.shapes).map(Change::description);
        self.after_history_step(description.is_some());
        description
    }

    /// Re-apply the last undone change.
    pub fn redo(&mut self) -> Option<String> {
        if matches!(self.state, EditState::HandleDragging { .. }) {
            return None;
        }
        self.abort_drawing();
        let description = self.history.redo(&mut self.shapes).map(Change::description);
        self.after_history_step(description.is_some());
        description
    }

    fn after_history_step(&mut self, applied: bool) {
        if applied {
            if let Some(id) = self.state.selected_shape() {
                if self.shapes.get(id).is_none() {
                    self.state = EditState::Idle;
                    self.emit(EditorEvent::SelectionChanged(Selection::None));
                }
            }
            self.emit(EditorEvent::ShapesChanged);
            self.emit(EditorEvent::ChangeSettled);
        }
        self.notify_undo_state();
    }

    // ========================================================================
    // Clipboard
    // ========================================================================

    /// Copy the selected object (deep copy). Returns false if nothing is selected.
    pub fn copy_selected(&mut self) -> bool {
        let Some(shape) = self.selected_shape() else {
            return false;
        };
        let mut model = shape.model().clone();
        shape.item().save(&mut model);
        self.clipboard = Some(model);
        true
    }

    /// Paste the clipboard as a new shape, offset and kept inside the image.
    pub fn paste(&mut self) -> Option<ShapeId> {
        let model = self.clipboard.clone()?;
        let mut item = ShapeItem::from_model(&model);
        let bounds = item.bounds();
        let x = (bounds.xmin + PASTE_OFFSET).min(self.width - bounds.width()).max(0.0);
        let y = (bounds.ymin + PASTE_OFFSET).min(self.height - bounds.height()).max(0.0);
        item.move_to(x, y);
        let mut model = model;
        item.save(&mut model);
        Some(self.commit_new_shape(model))
    }

    // ========================================================================
    // Hints
    // ========================================================================

    /// Replace the inference hints.
    pub fn set_hints(&mut self, hints: Vec<Hint>) {
        if self.selected_hint.take().is_some() {
            self.emit(EditorEvent::SelectionChanged(self.selection()));
        }
        log::debug!("Received {} hints", hints.len());
        self.hints = hints;
        self.emit(EditorEvent::HintsChanged);
    }

    /// Promote a hint to a committed shape, exactly like a drawn box.
    pub fn accept_hint(&mut self, index: usize) -> Option<ShapeId> {
        if index >= self.hints.len() {
            return None;
        }
        let bound_box = self.hints[index].bound_box.clamp_to(self.width, self.height);
        if !self.is_large_enough(&bound_box) {
            log::debug!("Hint {} clamps below the minimum size", index);
            self.status("Shape too small");
            return None;
        }
        let hint = self.hints.remove(index);
        self.selected_hint = None;
        self.emit(EditorEvent::HintsChanged);
        self.labels.touch(&hint.label);
        let id = self.commit_new_shape(ObjectModel::with_box(hint.label, bound_box));
        Some(id)
    }

    /// Accept the selected hint, if a hint is selected.
    pub fn accept_selected_hint(&mut self) -> Option<ShapeId> {
        match self.selection() {
            Selection::Hint(index) => self.accept_hint(index),
            _ => None,
        }
    }

    // ========================================================================
    // Preview
    // ========================================================================

    fn preview_margin(&self) -> f64 {
        PREVIEW_MARGIN / self.zoom
    }

    /// Redraw the live preview, erasing the area of the previous one.
    fn redraw_preview(&mut self, preview: Option<Preview>) {
        let margin = self.preview_margin();
        let erase = self.preview_region.map(|b| b.inflate(margin));
        self.preview_region = preview.as_ref().and_then(Preview::bounds);
        self.emit(EditorEvent::Redraw { erase, preview });
    }

    /// Drop any drawing in progress without committing it.
    fn abort_drawing(&mut self) {
        if matches!(
            self.state,
            EditState::DrawingBox { .. } | EditState::DrawingPolygon { .. }
        ) {
            self.state = EditState::Idle;
            self.redraw_preview(None);
        }
    }
}

#[cfg(test)]
mod tests;
