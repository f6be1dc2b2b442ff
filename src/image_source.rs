//! Image access for the annotation session.
//!
//! The editor only needs an image's size; hint providers also read pixels.
//! Both go through [`ImageSource`] so tests and hosts can supply their own.

use std::path::{Path, PathBuf};

use image::{GenericImageView, RgbaImage};
use thiserror::Error;

/// Errors that can occur while loading an image.
#[derive(Error, Debug)]
pub enum ImageSourceError {
    #[error("Failed to load image {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image {path:?} has no pixels")]
    Empty { path: PathBuf },
}

/// A readable image of known size.
pub trait ImageSource {
    /// File the image was loaded from.
    fn path(&self) -> &Path;

    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// RGBA value at `(x, y)`, or `None` outside the image.
    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]>;
}

/// A fully decoded RGBA image.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    path: PathBuf,
    image: RgbaImage,
}

impl LoadedImage {
    /// Decode the image file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ImageSourceError> {
        let path = path.into();
        log::info!("Loading image: {:?}", path);
        let img = image::open(&path).map_err(|source| ImageSourceError::Load {
            path: path.clone(),
            source,
        })?;
        Self::from_rgba(path, img.to_rgba8())
    }

    /// Decode an in-memory encoded image.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8]) -> Result<Self, ImageSourceError> {
        let path = path.into();
        let img = image::load_from_memory(bytes).map_err(|source| ImageSourceError::Load {
            path: path.clone(),
            source,
        })?;
        Self::from_rgba(path, img.to_rgba8())
    }

    /// Wrap already decoded pixels.
    pub fn from_rgba(path: impl Into<PathBuf>, image: RgbaImage) -> Result<Self, ImageSourceError> {
        let path = path.into();
        if image.width() == 0 || image.height() == 0 {
            return Err(ImageSourceError::Empty { path });
        }
        log::debug!("Loaded {}x{} image {:?}", image.width(), image.height(), path);
        Ok(Self { path, image })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl ImageSource for LoadedImage {
    fn path(&self) -> &Path {
        &self.path
    }

    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.in_bounds(x, y).then(|| self.image.get_pixel(x, y).0)
    }
}

/// Read only the size of an image file, without decoding its pixels.
pub fn image_dimensions(path: &Path) -> Result<(u32, u32), ImageSourceError> {
    image::image_dimensions(path).map_err(|source| ImageSourceError::Load {
        path: path.to_path_buf(),
        source,
    })
}
