// src/video.rs
//
// Video clips are animated GIFs: decoded up front, then scrubbed frame by frame
// until the user captures the one they want as a still.

use std::io::Cursor;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};

use crate::error::{Error, Result};
use crate::source::SourceImage;

/// Anything that can hand over its current frame for capture.
pub trait FrameSource {
    /// Frame size as reported by the container; `(0, 0)` until known.
    fn intrinsic_size(&self) -> (u32, u32);

    fn current_frame(&self) -> Option<&RgbaImage>;
}

pub struct VideoClip {
    frames: Vec<RgbaImage>,
    /// Start time of each frame.
    starts_ms: Vec<u32>,
    current: usize,
}

impl VideoClip {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(video_error)?;
        let frames = decoder.into_frames().collect_frames().map_err(video_error)?;
        if frames.is_empty() {
            return Err(Error::VideoLoad { reason: "the clip has no frames".into() });
        }

        let mut starts_ms = Vec::with_capacity(frames.len());
        let mut elapsed = 0u32;
        let mut buffers = Vec::with_capacity(frames.len());
        for frame in frames {
            starts_ms.push(elapsed);
            let (numer, denom) = frame.delay().numer_denom_ms();
            elapsed = elapsed.saturating_add(numer / denom.max(1));
            buffers.push(frame.into_buffer());
        }

        log::info!("loaded video clip: {} frames, {} ms", buffers.len(), elapsed);
        Ok(VideoClip { frames: buffers, starts_ms, current: 0 })
    }

    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::VideoLoad { reason: e.to_string() })?;
        Self::decode(&bytes)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_time_ms(&self) -> u32 {
        self.starts_ms.get(self.current).copied().unwrap_or(0)
    }

    /// Jump to a frame; past-the-end indices land on the last frame.
    pub fn seek(&mut self, index: usize) {
        self.current = index.min(self.frames.len().saturating_sub(1));
    }

    /// Move forwards or backwards, wrapping around at either end.
    pub fn step(&mut self, delta: isize) {
        let len = self.frames.len() as isize;
        if len == 0 {
            return;
        }
        self.current = (self.current as isize + delta).rem_euclid(len) as usize;
    }
}

impl FrameSource for VideoClip {
    fn intrinsic_size(&self) -> (u32, u32) {
        self.frames.first().map(|f| f.dimensions()).unwrap_or((0, 0))
    }

    fn current_frame(&self) -> Option<&RgbaImage> {
        self.frames.get(self.current)
    }
}

/// Copy the video's current frame into a fresh source image.
pub fn capture_frame(video: &impl FrameSource) -> Result<SourceImage> {
    let (w, h) = video.intrinsic_size();
    if w == 0 || h == 0 {
        return Err(Error::FrameNotReady);
    }
    let frame = video.current_frame().ok_or(Error::FrameNotReady)?;
    SourceImage::from_rgba(frame.clone()).ok_or(Error::FrameNotReady)
}

fn video_error(e: image::ImageError) -> Error {
    Error::VideoLoad { reason: e.to_string() }
}
