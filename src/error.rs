// src/error.rs

/// Everything that can go wrong while loading a source for the canvas.
///
/// None of these are fatal: the controller keeps its previous image and
/// selection, and the message is shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not read that image. Try a PNG, JPEG, GIF or WebP file.")]
    ImageDecode(#[source] image::ImageError),

    #[error("Could not load that video: {reason}")]
    VideoLoad { reason: String },

    #[error("The video frame is not ready yet. Wait a moment and capture again.")]
    FrameNotReady,
}

pub type Result<T> = std::result::Result<T, Error>;
