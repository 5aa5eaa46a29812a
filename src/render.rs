// src/render.rs
//
// Drawing the canvas: the letterboxed image, the dimmed surround with the
// selection left clear, and a dashed outline.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageResult, Pixel, Rgba, RgbaImage};
use kurbo::{Point, Rect};

use crate::canvas::CanvasSize;
use crate::geometry::fit_rect;
use crate::source::SourceImage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba<u8>,
    pub width: f64,
    /// On/off dash lengths; a zero period draws a solid line.
    pub dash: [f64; 2],
}

/// How a selection is drawn on top of the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionStyle {
    pub overlay: Rgba<u8>,
    pub outline: StrokeStyle,
}

/// The few drawing primitives the canvas needs. Coordinates are device pixels.
pub trait Surface {
    fn size(&self) -> CanvasSize;

    fn resize(&mut self, size: CanvasSize);

    /// Reset every pixel to fully transparent.
    fn clear(&mut self);

    fn draw_image(&mut self, image: &SourceImage, dest: Rect);

    /// Fill the union of `subpaths` under the even-odd rule: a pixel is
    /// painted when an odd number of them cover it.
    fn fill_even_odd(&mut self, subpaths: &[Rect], color: Rgba<u8>);

    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle);
}

/// Paint one frame. Reads its inputs only; safe to call again at any time.
pub fn paint(
    surface: &mut dyn Surface,
    source: Option<&SourceImage>,
    selection: Option<Rect>,
    style: &SelectionStyle,
) {
    surface.clear();
    let Some(source) = source else {
        return;
    };

    let canvas = surface.size();
    let image_size = kurbo::Size::new(source.width() as f64, source.height() as f64);
    surface.draw_image(source, fit_rect(canvas.to_size(), image_size));

    if let Some(sel) = selection {
        // dim everything but the selection; the image underneath stays intact
        surface.fill_even_odd(&[canvas.bounds(), sel], style.overlay);
        surface.stroke_rect(sel, &style.outline);
    }
}

struct ScaledCopy {
    source_id: u64,
    pixels: RgbaImage,
}

/// Software canvas over an RGBA buffer.
pub struct PixelSurface {
    pixels: RgbaImage,
    scaled: Option<ScaledCopy>,
}

impl PixelSurface {
    pub fn new(size: CanvasSize) -> Self {
        PixelSurface { pixels: RgbaImage::new(size.width, size.height), scaled: None }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn save(&self, path: &Path) -> ImageResult<()> {
        self.pixels.save(path)
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> CanvasSize {
        CanvasSize::new(self.pixels.width(), self.pixels.height())
    }

    fn resize(&mut self, size: CanvasSize) {
        if self.pixels.dimensions() != (size.width, size.height) {
            self.pixels = RgbaImage::new(size.width, size.height);
        }
    }

    fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_image(&mut self, image: &SourceImage, dest: Rect) {
        let w = dest.width().round().max(1.0) as u32;
        let h = dest.height().round().max(1.0) as u32;

        let stale = match &self.scaled {
            Some(copy) => copy.source_id != image.id() || copy.pixels.dimensions() != (w, h),
            None => true,
        };
        if stale {
            log::debug!("scaling source {} to {}x{}", image.id(), w, h);
            self.scaled = Some(ScaledCopy {
                source_id: image.id(),
                pixels: imageops::resize(image.pixels(), w, h, FilterType::Triangle),
            });
        }

        if let Some(copy) = &self.scaled {
            imageops::overlay(
                &mut self.pixels,
                &copy.pixels,
                dest.x0.round() as i64,
                dest.y0.round() as i64,
            );
        }
    }

    fn fill_even_odd(&mut self, subpaths: &[Rect], color: Rgba<u8>) {
        let (w, h) = self.pixels.dimensions();
        let covered: Vec<(u32, u32)> = pixel_centers(w, h)
            .filter(|(_, _, c)| subpaths.iter().filter(|r| covers(r, *c)).count() % 2 == 1)
            .map(|(x, y, _)| (x, y))
            .collect();
        for (x, y) in covered {
            self.pixels.get_pixel_mut(x, y).blend(&color);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle) {
        let (w, h) = self.pixels.dimensions();
        let mut mask = vec![false; (w as usize) * (h as usize)];
        let half = style.width / 2.0;
        let period = style.dash[0] + style.dash[1];

        let corners = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ];
        let mut travelled = 0.0;
        for i in 0..4 {
            let (from, to) = (corners[i], corners[(i + 1) % 4]);
            let len = from.distance(to);
            let mut t = 0.0;
            while t <= len {
                let on = period <= 0.0 || (travelled + t) % period < style.dash[0];
                if on {
                    let c = from.lerp(to, if len > 0.0 { t / len } else { 0.0 });
                    mark_square(&mut mask, w, h, c, half);
                }
                t += 0.5;
            }
            travelled += len;
        }

        for (i, _) in mask.iter().enumerate().filter(|(_, hit)| **hit) {
            let (x, y) = ((i as u32) % w, (i as u32) / w);
            self.pixels.get_pixel_mut(x, y).blend(&style.color);
        }
    }
}

fn pixel_centers(w: u32, h: u32) -> impl Iterator<Item = (u32, u32, Point)> {
    (0..h).flat_map(move |y| (0..w).map(move |x| (x, y, Point::new(x as f64 + 0.5, y as f64 + 0.5))))
}

/// Half-open containment, so neighbouring rectangles never share a pixel.
fn covers(r: &Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x < r.x1 && p.y >= r.y0 && p.y < r.y1
}

fn mark_square(mask: &mut [bool], w: u32, h: u32, center: Point, half: f64) {
    let x_lo = (center.x - half - 0.5).ceil().max(0.0) as u32;
    let x_hi = ((center.x + half - 0.5).ceil().max(0.0) as u32).min(w);
    let y_lo = (center.y - half - 0.5).ceil().max(0.0) as u32;
    let y_hi = ((center.y + half - 0.5).ceil().max(0.0) as u32).min(h);
    for y in y_lo..y_hi {
        for x in x_lo..x_hi {
            mask[(y * w + x) as usize] = true;
        }
    }
}
