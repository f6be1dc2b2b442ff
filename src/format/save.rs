//! Save manager for the current annotation file.
//!
//! Decides when an annotation is written and suppresses writes whose bytes
//! match what is already on disk.

use std::path::Path;
use std::time::Duration;

use web_time::Instant;

use super::error::FormatError;

/// Tracks unsaved changes and the last content written to disk.
///
/// With `save_every_change` on, every settled edit is written right away.
/// With it off, edits only mark the manager dirty until an explicit save.
#[derive(Debug)]
pub struct SaveManager {
    /// Write after every settled change.
    save_every_change: bool,

    /// Content of the file as last read or written by us.
    last_written: Option<String>,

    /// Time of last successful save.
    last_save: Option<Instant>,

    /// Whether there are unsaved changes.
    dirty: bool,
}

impl SaveManager {
    pub fn new(save_every_change: bool) -> Self {
        Self {
            save_every_change,
            last_written: None,
            last_save: None,
            dirty: false,
        }
    }

    /// Mark that a change occurred that needs saving.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        log::trace!("Save: marked dirty");
    }

    /// Check if there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Check if a settled change should be written now.
    pub fn should_save(&self) -> bool {
        self.save_every_change && self.dirty
    }

    pub fn save_every_change(&self) -> bool {
        self.save_every_change
    }

    pub fn set_save_every_change(&mut self, enabled: bool) {
        self.save_every_change = enabled;
        log::debug!("Save: save every change = {}", enabled);
    }

    /// Record the content found on disk when a file is opened.
    pub fn mark_loaded(&mut self, content: Option<String>) {
        self.last_written = content;
        self.last_save = None;
        self.dirty = false;
    }

    /// True when `content` is exactly what we last read or wrote.
    pub fn matches_disk(&self, content: &str) -> bool {
        self.last_written.as_deref() == Some(content)
    }

    /// Write `content` to `path` unless it is byte-identical to the last write.
    ///
    /// Returns `Ok(true)` if the file was written. On error the manager stays
    /// dirty so the next save retries.
    pub fn write_if_changed(&mut self, path: &Path, content: &str) -> Result<bool, FormatError> {
        if self.matches_disk(content) {
            log::trace!("Save: {:?} unchanged, skipping write", path);
            self.dirty = false;
            return Ok(false);
        }
        if let Err(e) = std::fs::write(path, content) {
            self.mark_save_failed();
            return Err(e.into());
        }
        self.last_written = Some(content.to_string());
        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::info!("Saved annotation to {:?}", path);
        Ok(true)
    }

    /// Mark that a save failed; keeps the dirty flag set.
    pub fn mark_save_failed(&mut self) {
        self.dirty = true;
        log::trace!("Save: marked save failed");
    }

    /// Get time since last save (if any).
    pub fn time_since_last_save(&self) -> Option<Duration> {
        self.last_save.map(|t| t.elapsed())
    }

    /// Forget everything about the current file.
    pub fn reset(&mut self) {
        self.last_written = None;
        self.last_save = None;
        self.dirty = false;
    }
}

impl Default for SaveManager {
    fn default() -> Self {
        Self::new(true)
    }
}
