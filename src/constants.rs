//! Global constants for the shape editor

use std::time::Duration;

/// On-screen handle size in pixels; image-space size is this divided by zoom.
pub const HANDLE_PIXELS: f64 = 8.0;

/// Minimum shape extent, as a multiple of the handle size.
pub const MIN_SIZE_FACTOR: f64 = 3.0;

/// Margin (screen pixels) added around the previous preview when erasing it.
pub const PREVIEW_MARGIN: f64 = 2.0;

/// Default arrow-key nudge distance in image pixels.
pub const DEFAULT_NUDGE_STEP: f64 = 1.0;

/// Inactivity after which the typed label prefix is discarded.
pub const PREFIX_TIMEOUT: Duration = Duration::from_millis(500);

/// Minimum number of vertices for a committed polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Pose written for objects that never had one.
pub const DEFAULT_POSE: &str = "Unspecified";

/// Offset applied to pasted shapes so they don't hide the original.
pub const PASTE_OFFSET: f64 = 10.0;
