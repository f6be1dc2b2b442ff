//! Background worker for inference look-ups and annotation file watching.
//!
//! The worker owns a [`HintProvider`] and runs on its own thread. Requests
//! and results cross the thread boundary as whole messages over channels;
//! the UI side polls with [`Worker::try_message`] and never blocks.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use thiserror::Error;

use crate::editor::Hint;
use crate::image_source::{ImageSource, ImageSourceError, LoadedImage};

/// Errors from the background worker and hint providers.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error(transparent)]
    Image(#[from] ImageSourceError),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Worker thread is not running")]
    Disconnected,
}

/// Source of inference suggestions for an image.
pub trait HintProvider: Send {
    /// Suggest boxes for `image`. May be slow; runs on the worker thread.
    fn suggest(&mut self, image: &dyn ImageSource) -> Result<Vec<Hint>, WorkerError>;
}

/// Request sent to the worker thread.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerRequest {
    /// Run the hint provider on an image file.
    Suggest { image: PathBuf },
    /// Watch an annotation file for external changes (`None` stops watching).
    Watch { path: Option<PathBuf> },
    /// Shutdown the thread
    Shutdown,
}

/// Result posted back by the worker thread.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    Hints { image: PathBuf, hints: Vec<Hint> },
    InferenceFailed { image: PathBuf, error: String },
    AnnotationFileChanged { path: PathBuf },
}

impl WorkerMessage {
    /// The image or annotation file this message is about.
    pub fn path(&self) -> &Path {
        match self {
            WorkerMessage::Hints { image, .. } | WorkerMessage::InferenceFailed { image, .. } => {
                image
            }
            WorkerMessage::AnnotationFileChanged { path } => path,
        }
    }
}

/// Last seen state of a watched file.
#[derive(Debug)]
struct WatchedFile {
    path: PathBuf,
    stamp: Option<(SystemTime, u64)>,
}

impl WatchedFile {
    fn new(path: PathBuf) -> Self {
        let stamp = Self::stamp(&path);
        Self { path, stamp }
    }

    fn stamp(path: &Path) -> Option<(SystemTime, u64)> {
        let meta = std::fs::metadata(path).ok()?;
        Some((meta.modified().ok()?, meta.len()))
    }

    /// Returns true if the file changed since the last poll.
    fn poll(&mut self) -> bool {
        let stamp = Self::stamp(&self.path);
        if stamp != self.stamp {
            self.stamp = stamp;
            return stamp.is_some();
        }
        false
    }
}

/// Handle to the background worker thread.
pub struct Worker {
    /// Sender for requests to the background thread
    request_tx: Sender<WorkerRequest>,
    /// Receiver for results from the background thread
    message_rx: Receiver<WorkerMessage>,
    /// Handle to the background thread (for joining on drop)
    thread_handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Default interval between checks of the watched file.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

    /// Spawn the worker thread with a hint provider.
    pub fn spawn(
        provider: Box<dyn HintProvider>,
        poll_interval: Duration,
    ) -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = mpsc::channel::<WorkerRequest>();
        let (message_tx, message_rx) = mpsc::channel::<WorkerMessage>();

        let thread_handle = thread::Builder::new()
            .name("labelkit-worker".to_string())
            .spawn(move || {
                log::info!("Worker thread started");
                Self::thread_loop(provider, poll_interval, request_rx, message_tx);
                log::info!("Worker thread exiting");
            })
            .map_err(WorkerError::Spawn)?;

        Ok(Self {
            request_tx,
            message_rx,
            thread_handle: Some(thread_handle),
        })
    }

    /// Background thread main loop.
    fn thread_loop(
        mut provider: Box<dyn HintProvider>,
        poll_interval: Duration,
        request_rx: Receiver<WorkerRequest>,
        message_tx: Sender<WorkerMessage>,
    ) {
        let mut watched: Option<WatchedFile> = None;
        loop {
            match request_rx.recv_timeout(poll_interval) {
                Ok(WorkerRequest::Suggest { image }) => {
                    let message = Self::run_inference(provider.as_mut(), image);
                    if message_tx.send(message).is_err() {
                        log::warn!("Message channel closed, worker thread exiting");
                        break;
                    }
                }
                Ok(WorkerRequest::Watch { path }) => {
                    log::debug!("Watching {:?}", path);
                    watched = path.map(WatchedFile::new);
                }
                Ok(WorkerRequest::Shutdown) => {
                    log::debug!("Received shutdown signal");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log::debug!("Request channel closed, worker thread exiting");
                    break;
                }
            }

            if let Some(file) = watched.as_mut() {
                if file.poll() {
                    log::info!("Annotation file changed on disk: {:?}", file.path);
                    let message = WorkerMessage::AnnotationFileChanged {
                        path: file.path.clone(),
                    };
                    if message_tx.send(message).is_err() {
                        break;
                    }
                }
            }
        }
    }

    fn run_inference(provider: &mut dyn HintProvider, image: PathBuf) -> WorkerMessage {
        let result = LoadedImage::open(&image)
            .map_err(WorkerError::from)
            .and_then(|loaded| provider.suggest(&loaded));
        match result {
            Ok(hints) => {
                log::debug!("Inference produced {} hints for {:?}", hints.len(), image);
                WorkerMessage::Hints { image, hints }
            }
            Err(e) => {
                log::warn!("Inference failed for {:?}: {}", image, e);
                WorkerMessage::InferenceFailed {
                    image,
                    error: e.to_string(),
                }
            }
        }
    }

    fn send(&self, request: WorkerRequest) -> Result<(), WorkerError> {
        self.request_tx
            .send(request)
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Ask for hints on an image. The answer arrives as a [`WorkerMessage`].
    pub fn request_hints(&self, image: PathBuf) -> Result<(), WorkerError> {
        self.send(WorkerRequest::Suggest { image })
    }

    /// Replace the watched annotation file.
    pub fn watch(&self, path: Option<PathBuf>) -> Result<(), WorkerError> {
        self.send(WorkerRequest::Watch { path })
    }

    /// Take one message from the queue. Non-blocking.
    pub fn try_message(&mut self) -> Option<WorkerMessage> {
        match self.message_rx.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::warn!("Worker thread disconnected");
                None
            }
        }
    }

    /// Wait up to `timeout` for one message.
    pub fn wait_message(&mut self, timeout: Duration) -> Option<WorkerMessage> {
        self.message_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        log::debug!("Shutting down worker thread");

        let _ = self.request_tx.send(WorkerRequest::Shutdown);

        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                log::warn!("Worker thread panicked: {:?}", e);
            }
        }
    }
}
