use kurbo::{Point, Rect, Size};
use proptest::prelude::*;
use vmerch::geometry::{clamp_to, fit_rect, normalize_rect};

const EPS: f64 = 1e-6;

fn dim() -> impl Strategy<Value = f64> {
    (1u32..5000).prop_map(f64::from)
}

fn coord() -> impl Strategy<Value = f64> {
    -3000.0..6000.0f64
}

proptest! {
    #[test]
    fn fit_rect_stays_inside_and_keeps_aspect(cw in dim(), ch in dim(), sw in dim(), sh in dim()) {
        let r = fit_rect(Size::new(cw, ch), Size::new(sw, sh));
        prop_assert!(r.x0 >= -EPS && r.y0 >= -EPS);
        prop_assert!(r.x1 <= cw + EPS && r.y1 <= ch + EPS);
        let drawn = r.width() / r.height();
        let image = sw / sh;
        prop_assert!((drawn - image).abs() <= image * 1e-9);
    }

    #[test]
    fn normalize_ignores_drag_direction(ax in coord(), ay in coord(), bx in coord(), by in coord()) {
        let a = Point::new(ax, ay);
        let b = Point::new(bx, by);
        let r = normalize_rect(a, b);
        prop_assert_eq!(r, normalize_rect(b, a));
        prop_assert!(r.width() >= 0.0 && r.height() >= 0.0);
    }

    #[test]
    fn clamp_always_lands_inside_draw_rect(
        cw in dim(), ch in dim(), sw in dim(), sh in dim(),
        ax in coord(), ay in coord(), bx in coord(), by in coord(),
    ) {
        let bounds = fit_rect(Size::new(cw, ch), Size::new(sw, sh));
        prop_assume!(bounds.width() >= 1.0 && bounds.height() >= 1.0);

        let r = clamp_to(normalize_rect(Point::new(ax, ay), Point::new(bx, by)), bounds);
        prop_assert!(r.width() >= 1.0 - EPS && r.height() >= 1.0 - EPS);
        prop_assert!(r.x0 >= bounds.x0 - EPS && r.y0 >= bounds.y0 - EPS);
        prop_assert!(r.x1 <= bounds.x1 + EPS && r.y1 <= bounds.y1 + EPS);
    }

    #[test]
    fn clamp_leaves_contained_rect_alone(x in 0.0..500.0f64, y in 0.0..500.0f64, w in 1.0..400.0f64, h in 1.0..400.0f64) {
        let bounds = Rect::new(0.0, 0.0, 1000.0, 1000.0);
        let r = Rect::new(x, y, x + w, y + h);
        prop_assert_eq!(clamp_to(r, bounds), r);
    }
}
