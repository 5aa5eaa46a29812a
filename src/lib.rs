//! Pick a region of an image (or a still grabbed from a video clip) and run a
//! mocked visual shopping search on it.
//!
//! [`SelectionController`] owns all canvas state: the source image, the
//! canvas size, the drag in progress and the selection. Front ends feed it
//! pointer events and ask it to [`render`](SelectionController::render) onto
//! a [`Surface`].

pub mod canvas;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod input;
pub mod render;
pub mod results;
pub mod source;
pub mod video;

pub use canvas::CanvasSize;
pub use config::{Config, Sizing};
pub use controller::{DragState, LoadOutcome, LoadTicket, SelectionController, SelectionReadout};
pub use error::{Error, Result};
pub use input::PointerEvent;
pub use render::{PixelSurface, Surface};
pub use source::SourceImage;
pub use video::VideoClip;
