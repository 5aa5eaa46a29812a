// src/source.rs

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::error::{LimitError, LimitErrorKind};
use image::{ImageError, RgbaImage};

use crate::error::{Error, Result};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Decoded bitmap shown on the canvas. Cheap to clone; never mutated.
///
/// Every instance gets its own id, so two loads of the same file are still
/// two different sources as far as caches are concerned.
#[derive(Clone)]
pub struct SourceImage {
    id: u64,
    pixels: Arc<RgbaImage>,
}

impl SourceImage {
    /// Wrap an RGBA buffer. Empty buffers are refused.
    pub fn from_rgba(pixels: RgbaImage) -> Option<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return None;
        }
        Some(SourceImage {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            pixels: Arc::new(pixels),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl PartialEq for SourceImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("id", &self.id)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Decode an uploaded image file.
pub fn load_image(bytes: &[u8]) -> Result<SourceImage> {
    let decoded = image::load_from_memory(bytes).map_err(Error::ImageDecode)?;
    SourceImage::from_rgba(decoded.to_rgba8()).ok_or_else(|| {
        Error::ImageDecode(ImageError::Limits(LimitError::from_kind(
            LimitErrorKind::DimensionError,
        )))
    })
}

pub fn open_image(path: &Path) -> Result<SourceImage> {
    let bytes = std::fs::read(path).map_err(|e| Error::ImageDecode(ImageError::IoError(e)))?;
    load_image(&bytes)
}
