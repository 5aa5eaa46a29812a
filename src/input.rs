// src/input.rs

use kurbo::{Point, Rect};

/// A pointer event as the windowing layer reports it: logical (CSS) pixels
/// relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerEvent {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        PointerEvent { client_x, client_y }
    }
}

/// Convert a pointer event into the canvas backing-store grid.
///
/// `canvas_bounds` is where the canvas sits on screen in logical pixels; only
/// its top-left corner matters.
pub fn to_canvas_point(event: PointerEvent, canvas_bounds: Rect, dpr: f64) -> Point {
    Point::new(
        (event.client_x - canvas_bounds.x0) * dpr,
        (event.client_y - canvas_bounds.y0) * dpr,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtracts_origin_then_scales() {
        let bounds = Rect::new(40.0, 120.0, 540.0, 400.0);
        let p = to_canvas_point(PointerEvent::new(65.0, 130.5), bounds, 2.0);
        assert_eq!(p, Point::new(50.0, 21.0));
    }

    #[test]
    fn points_left_of_canvas_go_negative() {
        let bounds = Rect::new(40.0, 0.0, 540.0, 400.0);
        let p = to_canvas_point(PointerEvent::new(30.0, 10.0), bounds, 1.5);
        assert_eq!(p, Point::new(-15.0, 15.0));
    }
}
