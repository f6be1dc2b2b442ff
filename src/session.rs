//! One open image with its annotation, editor and persistence.
//!
//! `AnnotationSession` is the glue a host drives: it opens an image, feeds
//! the stored objects into a [`ShapeEditor`], writes the annotation back after
//! settled changes (or on explicit save) and applies background worker
//! results that still belong to the current image.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::EditorPreferences;
use crate::editor::{EditorEvent, EditorSettings, ShapeEditor};
use crate::format::{FormatError, SaveManager, voc};
use crate::image_source::{ImageSourceError, image_dimensions};
use crate::model::{Annotation, RecentLabels};
use crate::worker::{Worker, WorkerMessage};

/// Errors surfaced by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Image(#[from] ImageSourceError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("No image is open")]
    NoImage,
}

/// The image currently being edited.
#[derive(Debug)]
struct OpenImage {
    annotation: Annotation,
    /// Where the annotation is persisted.
    xml_path: PathBuf,
    editor: ShapeEditor,
}

impl OpenImage {
    /// The annotation with the editor's committed shapes flattened into it.
    fn flatten(&self) -> Annotation {
        let mut annotation = self.annotation.clone();
        annotation.replace_objects(self.editor.models());
        annotation
    }
}

/// Editing session over a sequence of images.
pub struct AnnotationSession {
    settings: EditorSettings,
    saver: SaveManager,
    worker: Option<Worker>,
    current: Option<OpenImage>,
    /// Label service while no editor holds it.
    labels: RecentLabels,
}

impl AnnotationSession {
    pub fn new(preferences: &EditorPreferences, labels: RecentLabels) -> Self {
        Self {
            settings: preferences.editor_settings(),
            saver: SaveManager::new(preferences.save_every_change),
            worker: None,
            current: None,
            labels,
        }
    }

    /// Attach a background worker for hints and file watching.
    pub fn with_worker(mut self, worker: Worker) -> Self {
        self.worker = Some(worker);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Image file of the open annotation.
    pub fn image_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|c| c.annotation.file())
    }

    /// Path the open annotation is saved to.
    pub fn annotation_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|c| c.xml_path.as_path())
    }

    pub fn editor(&self) -> Option<&ShapeEditor> {
        self.current.as_ref().map(|c| &c.editor)
    }

    pub fn editor_mut(&mut self) -> Option<&mut ShapeEditor> {
        self.current.as_mut().map(|c| &mut c.editor)
    }

    /// Snapshot of the open annotation including all committed shapes.
    pub fn annotation(&self) -> Option<Annotation> {
        self.current.as_ref().map(OpenImage::flatten)
    }

    pub fn labels(&self) -> &RecentLabels {
        match &self.current {
            Some(open) => open.editor.labels(),
            None => &self.labels,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.saver.is_dirty()
    }

    pub fn save_every_change(&self) -> bool {
        self.saver.save_every_change()
    }

    pub fn set_save_every_change(&mut self, enabled: bool) {
        self.saver.set_save_every_change(enabled);
    }

    // ========================================================================
    // Opening and closing
    // ========================================================================

    /// Open an image, reading its size from the file header.
    pub fn open(&mut self, image: &Path) -> Result<(), SessionError> {
        let (width, height) = image_dimensions(image)?;
        self.open_with_size(image, width, height);
        Ok(())
    }

    /// Open an image of known size. The annotation next to it is loaded if
    /// present; an unreadable annotation is logged and the image starts
    /// unannotated.
    pub fn open_with_size(&mut self, image: &Path, width: u32, height: u32) {
        self.close();

        let xml_path = voc::annotation_path_for(image);
        let (annotation, disk_content) = match std::fs::read_to_string(&xml_path) {
            Ok(content) => match voc::read_annotation(&content) {
                Ok(mut annotation) => {
                    annotation.file = image.to_path_buf();
                    annotation.reload_size(width, height);
                    (annotation, Some(content))
                }
                Err(e) => {
                    log::warn!(
                        "Ignoring malformed annotation {:?}, starting unannotated: {}",
                        xml_path,
                        e
                    );
                    (Annotation::new(image, width, height), None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                (Annotation::new(image, width, height), None)
            }
            Err(e) => {
                log::warn!("Could not read {:?}, starting unannotated: {}", xml_path, e);
                (Annotation::new(image, width, height), None)
            }
        };
        log::info!(
            "Opened {:?} ({}x{}) with {} objects",
            image,
            width,
            height,
            annotation.objects().len()
        );

        let labels = std::mem::take(&mut self.labels);
        let mut editor = ShapeEditor::new(width, height, self.settings, labels);
        editor.load_objects(annotation.objects().to_vec());
        self.saver.mark_loaded(disk_content);

        if let Some(worker) = &self.worker {
            let result = worker
                .watch(Some(xml_path.clone()))
                .and_then(|()| worker.request_hints(image.to_path_buf()));
            if let Err(e) = result {
                log::warn!("Background worker unavailable: {}", e);
            }
        }

        self.current = Some(OpenImage {
            annotation,
            xml_path,
            editor,
        });
    }

    /// Close the open image. The undo history goes with it; unsaved changes
    /// in deferred-save mode are dropped with a warning.
    pub fn close(&mut self) {
        let Some(mut open) = self.current.take() else {
            return;
        };
        if self.saver.is_dirty() {
            log::warn!(
                "Closing {:?} with unsaved changes",
                open.annotation.file()
            );
        }
        open.editor.forget_history();
        self.labels = std::mem::take(open.editor.labels_mut());
        self.saver.reset();
        if let Some(worker) = &self.worker {
            if let Err(e) = worker.watch(None) {
                log::debug!("Could not stop watching: {}", e);
            }
        }
        log::debug!("Closed {:?}", open.annotation.file());
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Flatten the current annotation to VOC XML.
    pub fn export(&self) -> Result<String, SessionError> {
        let open = self.current.as_ref().ok_or(SessionError::NoImage)?;
        Ok(voc::write_annotation(&open.flatten())?)
    }

    /// Explicit save. Returns `Ok(true)` if the file was written.
    ///
    /// With save-every-change off, a successful save also clears the undo
    /// history.
    pub fn save(&mut self) -> Result<bool, SessionError> {
        let written = self.write_current()?;
        if !self.saver.save_every_change() {
            if let Some(open) = self.current.as_mut() {
                open.editor.forget_history();
            }
        }
        Ok(written)
    }

    fn write_current(&mut self) -> Result<bool, SessionError> {
        let open = self.current.as_ref().ok_or(SessionError::NoImage)?;
        let xml = voc::write_annotation(&open.flatten())?;
        match self.saver.write_if_changed(&open.xml_path, &xml) {
            Ok(written) => Ok(written),
            Err(e) => {
                log::error!("Failed to save {:?}: {}", open.xml_path, e);
                Err(e.into())
            }
        }
    }

    // ========================================================================
    // Event pumps
    // ========================================================================

    /// Drain the editor's events, saving after settled changes when
    /// save-every-change is on. Returns the events for the host to render.
    pub fn process_editor_events(&mut self) -> Vec<EditorEvent> {
        let Some(open) = self.current.as_mut() else {
            return Vec::new();
        };
        let events = open.editor.drain_events();
        if events.contains(&EditorEvent::ChangeSettled) {
            self.saver.mark_dirty();
        }
        if self.saver.should_save() {
            // Failures are logged and the saver stays dirty for the next attempt.
            let _ = self.write_current();
        }
        events
    }

    /// Apply all pending worker messages. Returns how many were handled.
    pub fn process_worker_messages(&mut self) -> usize {
        let mut messages = Vec::new();
        if let Some(worker) = self.worker.as_mut() {
            while let Some(message) = worker.try_message() {
                messages.push(message);
            }
        }
        let count = messages.len();
        for message in messages {
            self.handle_worker_message(message);
        }
        count
    }

    /// Apply one worker message. Messages about other files are dropped.
    pub fn handle_worker_message(&mut self, message: WorkerMessage) {
        let Some(open) = self.current.as_mut() else {
            log::debug!("Dropping worker message for {:?}: no image open", message.path());
            return;
        };
        match message {
            WorkerMessage::Hints { image, hints } => {
                if image != open.annotation.file() {
                    log::debug!("Dropping stale hints for {:?}", image);
                    return;
                }
                open.editor.set_hints(hints);
            }
            WorkerMessage::InferenceFailed { image, error } => {
                log::warn!("No hints for {:?}: {}", image, error);
            }
            WorkerMessage::AnnotationFileChanged { path } => {
                if path != open.xml_path {
                    log::debug!("Ignoring change of unrelated file {:?}", path);
                    return;
                }
                self.reload_from_disk();
            }
        }
    }

    /// Pick up an external change of the open annotation file, unless it is
    /// our own write or local edits are unsaved.
    fn reload_from_disk(&mut self) {
        let Some(open) = self.current.as_mut() else {
            return;
        };
        let content = match std::fs::read_to_string(&open.xml_path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Could not read changed file {:?}: {}", open.xml_path, e);
                return;
            }
        };
        if self.saver.matches_disk(&content) {
            return;
        }
        if self.saver.is_dirty() {
            log::warn!(
                "{:?} changed on disk; keeping unsaved local edits",
                open.xml_path
            );
            return;
        }
        match voc::read_annotation(&content) {
            Ok(external) => {
                log::info!("Reloading {:?} after external change", open.xml_path);
                open.editor.load_objects(external.objects().to_vec());
                open.annotation.replace_objects(external.objects().to_vec());
                self.saver.mark_loaded(Some(content));
            }
            Err(e) => log::warn!("Ignoring malformed external change: {}", e),
        }
    }
}

impl Drop for AnnotationSession {
    fn drop(&mut self) {
        if self.saver.is_dirty() {
            log::warn!("Session dropped with unsaved changes");
        }
    }
}
