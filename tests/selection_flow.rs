use std::cell::RefCell;
use std::rc::Rc;

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, Rgba, RgbaImage};
use kurbo::{Point, Rect};
use vmerch::controller::DragState;
use vmerch::render::{StrokeStyle, Surface};
use vmerch::video::{self, VideoClip};
use vmerch::{
    CanvasSize, Config, Error, LoadOutcome, PixelSurface, PointerEvent, SelectionController,
    Sizing, SourceImage,
};

fn solid(w: u32, h: u32, c: [u8; 4]) -> SourceImage {
    SourceImage::from_rgba(RgbaImage::from_pixel(w, h, Rgba(c))).unwrap()
}

/// A fixed 1000x560 canvas at DPR 1, whatever the image.
fn fixed_canvas() -> SelectionController {
    let config = Config {
        sizing: Sizing::FixedBox,
        max_canvas_width: 1000.0,
        max_canvas_height: 560.0,
        ..Config::default()
    };
    SelectionController::new(config, 1000.0, 1.0)
}

fn record(controller: &mut SelectionController) -> Rc<RefCell<Vec<Option<Rect>>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    controller.on_selection_committed(move |s| sink.borrow_mut().push(s));
    seen
}

#[test]
fn letterboxes_slightly_narrower_image() {
    let mut c = fixed_canvas();
    c.set_source(solid(1600, 900, [1, 2, 3, 255]));
    assert_eq!(c.canvas_size(), CanvasSize::new(1000, 560));

    let d = c.draw_rect().unwrap();
    assert_eq!(d.y0, 0.0);
    assert_eq!(d.height(), 560.0);
    assert!((d.width() - 995.56).abs() < 0.01);
    assert!((d.x0 - 2.22).abs() < 0.01);
}

#[test]
fn upward_left_drag_normalizes_and_commits() {
    let mut c = fixed_canvas();
    c.set_source(solid(1000, 560, [1, 2, 3, 255]));
    let seen = record(&mut c);

    assert!(c.pointer_down(Point::new(50.0, 50.0)));
    c.pointer_move(Point::new(10.0, 10.0));
    let expected = Rect::new(10.0, 10.0, 50.0, 50.0);
    assert_eq!(c.selection(), Some(expected));

    assert_eq!(c.pointer_up(), Some(expected));
    assert_eq!(*seen.borrow(), vec![Some(expected)]);
    assert_eq!(c.readout().to_string(), "Selection: x=10, y=10, w=40, h=40");
}

#[test]
fn tiny_drag_is_discarded() {
    let mut c = fixed_canvas();
    c.set_source(solid(1000, 560, [1, 2, 3, 255]));
    let seen = record(&mut c);

    c.pointer_down(Point::new(100.0, 100.0));
    c.pointer_move(Point::new(105.0, 105.0));
    assert_eq!(c.pointer_up(), None);
    assert_eq!(c.selection(), None);
    assert_eq!(c.image_region(), None);
    assert_eq!(*seen.borrow(), vec![None]);
}

#[test]
fn release_outside_canvas_still_ends_drag() {
    let mut c = fixed_canvas();
    c.set_source(solid(1600, 900, [1, 2, 3, 255]));
    c.pointer_down(Point::new(500.0, 300.0));
    c.pointer_move(Point::new(-200.0, 2000.0));
    let committed = c.pointer_up().unwrap();
    let d = c.draw_rect().unwrap();
    assert_eq!(c.drag_state(), DragState::Idle);
    assert_eq!(committed.x0, d.x0);
    assert_eq!(committed.y1, d.y1);
}

#[test]
fn pointer_events_are_scaled_by_dpr() {
    let mut c = SelectionController::new(Config::default(), 500.0, 2.0);
    c.set_source(solid(1000, 500, [1, 2, 3, 255]));
    assert_eq!(c.canvas_size(), CanvasSize::new(1000, 500));

    let bounds = Rect::new(10.0, 10.0, 510.0, 260.0);
    let at = c.canvas_point(PointerEvent::new(30.0, 20.0), bounds);
    assert_eq!(at, Point::new(40.0, 20.0));
}

/// Records the order of drawing calls next to selection notifications.
struct Recorder {
    log: Rc<RefCell<Vec<String>>>,
    inner: PixelSurface,
}

impl Surface for Recorder {
    fn size(&self) -> CanvasSize {
        self.inner.size()
    }

    fn resize(&mut self, size: CanvasSize) {
        self.inner.resize(size);
    }

    fn clear(&mut self) {
        self.log.borrow_mut().push("clear".into());
        self.inner.clear();
    }

    fn draw_image(&mut self, image: &SourceImage, dest: Rect) {
        self.log.borrow_mut().push(format!("image {}", image.width()));
        self.inner.draw_image(image, dest);
    }

    fn fill_even_odd(&mut self, subpaths: &[Rect], color: Rgba<u8>) {
        self.log.borrow_mut().push("overlay".into());
        self.inner.fill_even_odd(subpaths, color);
    }

    fn stroke_rect(&mut self, rect: Rect, style: &StrokeStyle) {
        self.log.borrow_mut().push("outline".into());
        self.inner.stroke_rect(rect, style);
    }
}

#[test]
fn new_image_drops_selection_before_it_is_drawn() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut c = fixed_canvas();
    let sink = log.clone();
    c.on_selection_committed(move |s| sink.borrow_mut().push(format!("selection {}", s.is_some())));
    let mut surface = Recorder { log: log.clone(), inner: PixelSurface::new(CanvasSize::new(1, 1)) };

    c.set_source(solid(1000, 560, [1, 2, 3, 255]));
    c.pointer_down(Point::new(10.0, 10.0));
    c.pointer_move(Point::new(300.0, 300.0));
    c.pointer_up();
    c.render(&mut surface);

    log.borrow_mut().clear();
    c.set_source(solid(800, 600, [4, 5, 6, 255]));
    c.render(&mut surface);

    assert_eq!(*log.borrow(), ["selection false", "clear", "image 800"]);
    assert_eq!(c.selection(), None);
}

#[test]
fn rendering_twice_is_identical() {
    let mut c = fixed_canvas();
    c.set_source(solid(1600, 900, [120, 80, 40, 255]));
    c.pointer_down(Point::new(100.0, 120.0));
    c.pointer_move(Point::new(400.0, 333.3));
    c.pointer_up();

    let mut first = PixelSurface::new(c.canvas_size());
    let mut second = PixelSurface::new(CanvasSize::new(3, 3));
    c.render(&mut first);
    c.render(&mut second);
    let snapshot = first.pixels().clone();
    c.render(&mut first);

    assert_eq!(first.pixels(), second.pixels());
    assert_eq!(first.pixels(), &snapshot);
    assert!(c.committed_selection().is_some());
}

#[test]
fn stale_load_is_dropped() {
    let mut c = fixed_canvas();
    let older = c.begin_load();
    let newer = c.begin_load();

    let applied = c.finish_load(newer, Ok(solid(640, 480, [0, 0, 0, 255]))).unwrap();
    assert_eq!(applied, LoadOutcome::Applied);
    let stale = c.finish_load(older, Ok(solid(320, 240, [0, 0, 0, 255]))).unwrap();
    assert_eq!(stale, LoadOutcome::Stale);
    assert_eq!(c.source().map(|s| s.width()), Some(640));
}

#[test]
fn failed_load_keeps_previous_image_and_selection() {
    let mut c = fixed_canvas();
    c.set_source(solid(1000, 560, [1, 2, 3, 255]));
    c.pointer_down(Point::new(20.0, 20.0));
    c.pointer_move(Point::new(200.0, 200.0));
    let committed = c.pointer_up();

    let ticket = c.begin_load();
    let err = c.finish_load(ticket, vmerch::source::load_image(b"not an image")).unwrap_err();
    assert!(matches!(err, Error::ImageDecode(_)));
    assert_eq!(c.source().map(|s| s.width()), Some(1000));
    assert_eq!(c.committed_selection(), committed);
}

#[test]
fn captured_video_frame_becomes_source() {
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        for c in [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]] {
            let buf = RgbaImage::from_pixel(64, 36, Rgba(c));
            encoder.encode_frame(Frame::from_parts(buf, 0, 0, Delay::from_numer_denom_ms(40, 1))).unwrap();
        }
    }
    let mut clip = VideoClip::decode(&bytes).unwrap();
    clip.seek(2);

    let mut c = SelectionController::new(Config::default(), 640.0, 1.0);
    let ticket = c.begin_load();
    c.finish_load(ticket, video::capture_frame(&clip)).unwrap();
    assert_eq!(c.canvas_size(), CanvasSize::new(640, 360));

    c.pointer_down(Point::new(0.0, 0.0));
    c.pointer_move(Point::new(320.0, 180.0));
    c.pointer_up();
    let crop = c.crop_selection().unwrap();
    assert_eq!(crop.dimensions(), (32, 18));
    assert!(crop.get_pixel(5, 5)[2] > 200);
}
