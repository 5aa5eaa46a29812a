// src/geometry.rs
//
// Canvas geometry: letterbox fit, drag normalization, clamping, and the mapping
// from canvas pixels back to source-image pixels.

use kurbo::{Point, Rect, Size};

/// Smallest extent a clamped selection may have on either axis, in device pixels.
pub const MIN_EXTENT: f64 = 1.0;

/// Integer rectangle in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Largest rectangle with the image's aspect ratio that fits in the canvas,
/// centered on the axis that has room to spare.
pub fn fit_rect(canvas: Size, image: Size) -> Rect {
    let image_aspect = image.width / image.height;
    let canvas_aspect = canvas.width / canvas.height;

    if image_aspect > canvas_aspect {
        // relatively wider: full width, bars above and below
        let dh = canvas.width / image_aspect;
        Rect::from_origin_size((0.0, (canvas.height - dh) / 2.0), (canvas.width, dh))
    } else {
        let dw = canvas.height * image_aspect;
        Rect::from_origin_size(((canvas.width - dw) / 2.0, 0.0), (dw, canvas.height))
    }
}

/// Rectangle spanned by two drag points, whichever way the drag went.
pub fn normalize_rect(a: Point, b: Point) -> Rect {
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}

/// Pull both corners of `rect` into `bounds`.
///
/// The result is never thinner than [`MIN_EXTENT`] (or the bounds themselves,
/// if those are thinner still), and never pokes out of `bounds`: a sliver
/// pinned to the far edge is moved back inside.
pub fn clamp_to(rect: Rect, bounds: Rect) -> Rect {
    let x0 = rect.min_x().min(bounds.x1).max(bounds.x0);
    let y0 = rect.min_y().min(bounds.y1).max(bounds.y0);
    let x1 = rect.max_x().min(bounds.x1).max(bounds.x0);
    let y1 = rect.max_y().min(bounds.y1).max(bounds.y0);

    let (x0, x1) = widen(x0, x1, MIN_EXTENT.min(bounds.width()), bounds.x1);
    let (y0, y1) = widen(y0, y1, MIN_EXTENT.min(bounds.height()), bounds.y1);
    Rect::new(x0, y0, x1, y1)
}

fn widen(lo: f64, hi: f64, min: f64, limit: f64) -> (f64, f64) {
    if hi - lo >= min {
        return (lo, hi);
    }
    let lo = lo.min(limit - min);
    (lo, lo + min)
}

/// Map a canvas-space selection inside `draw` onto the pixels of an image
/// of `image_w` × `image_h`. The region always covers at least one pixel.
pub fn to_image_region(selection: Rect, draw: Rect, image_w: u32, image_h: u32) -> ImageRegion {
    let sx = image_w as f64 / draw.width();
    let sy = image_h as f64 / draw.height();

    let x0 = ((selection.x0 - draw.x0) * sx).floor().clamp(0.0, (image_w - 1) as f64) as u32;
    let y0 = ((selection.y0 - draw.y0) * sy).floor().clamp(0.0, (image_h - 1) as f64) as u32;
    let x1 = ((selection.x1 - draw.x0) * sx).ceil().clamp(0.0, image_w as f64) as u32;
    let y1 = ((selection.y1 - draw.y0) * sy).ceil().clamp(0.0, image_h as f64) as u32;

    ImageRegion {
        x: x0,
        y: y0,
        w: x1.saturating_sub(x0).max(1),
        h: y1.saturating_sub(y0).max(1),
    }
}
