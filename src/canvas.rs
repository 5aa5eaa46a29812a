// src/canvas.rs

use kurbo::{Rect, Size};

use crate::config::{Config, Sizing};

/// Backing-store size of the canvas in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        CanvasSize { width: width.max(1), height: height.max(1) }
    }

    /// Scale a logical size by the device pixel ratio, flooring to whole pixels.
    pub fn from_logical(logical: Size, dpr: f64) -> Self {
        CanvasSize::new(
            (logical.width * dpr).floor() as u32,
            (logical.height * dpr).floor() as u32,
        )
    }

    pub fn to_size(self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    pub fn bounds(self) -> Rect {
        self.to_size().to_rect()
    }
}

/// Logical display box before any image is loaded, and for [`Sizing::FixedBox`].
pub fn fixed_box(container_width: f64, config: &Config) -> Size {
    Size::new(container_width.min(config.max_canvas_width), config.max_canvas_height)
}

/// Logical display box for an image of `image` pixels in a container
/// `container_width` wide.
pub fn target_size(container_width: f64, image: Size, config: &Config) -> Size {
    match config.sizing {
        Sizing::FixedBox => fixed_box(container_width, config),
        Sizing::FitImage => {
            let aspect = image.width / image.height;
            let cap = config.max_canvas_height;
            let width = container_width;
            let height = width / aspect;
            if height > cap {
                Size::new(cap * aspect, cap)
            } else {
                Size::new(width, height)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_image_hits_height_cap() {
        let config = Config::default();
        let logical = target_size(980.0, Size::new(1600.0, 900.0), &config);
        assert_eq!(logical.height, 520.0);
        assert!((logical.width - 924.444).abs() < 1e-3);
        assert_eq!(CanvasSize::from_logical(logical, 2.0), CanvasSize::new(1848, 1040));
    }

    #[test]
    fn small_square_image_follows_container_width() {
        let config = Config::default();
        let logical = target_size(300.0, Size::new(400.0, 400.0), &config);
        assert_eq!(logical, Size::new(300.0, 300.0));
    }

    #[test]
    fn portrait_image_is_narrow() {
        let config = Config::default();
        let logical = target_size(980.0, Size::new(900.0, 1600.0), &config);
        assert_eq!(CanvasSize::from_logical(logical, 1.0), CanvasSize::new(292, 520));
    }

    #[test]
    fn fixed_box_ignores_image_shape() {
        let config = Config { sizing: Sizing::FixedBox, ..Config::default() };
        let logical = target_size(1200.0, Size::new(900.0, 1600.0), &config);
        assert_eq!(logical, Size::new(980.0, 520.0));
    }

    #[test]
    fn canvas_never_collapses_to_zero() {
        assert_eq!(CanvasSize::from_logical(Size::new(0.2, 0.0), 1.0), CanvasSize::new(1, 1));
    }
}
