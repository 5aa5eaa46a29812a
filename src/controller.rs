// src/controller.rs
//
// The one stateful piece: current source, canvas size, selection and drag.
// Every UI event ends up as one of the methods below.

use std::fmt;

use image::RgbaImage;
use image::imageops;
use kurbo::{Point, Rect, Size};

use crate::canvas::{self, CanvasSize};
use crate::config::Config;
use crate::error::Result;
use crate::geometry::{self, ImageRegion};
use crate::input::{self, PointerEvent};
use crate::render::{self, SelectionStyle, StrokeStyle, Surface};
use crate::source::SourceImage;

pub type SelectionListener = Box<dyn FnMut(Option<Rect>)>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { start: Point },
}

/// Handed out when a load starts; only the newest ticket may install its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load was started after this one; the result was dropped.
    Stale,
}

pub struct SelectionController {
    config: Config,
    dpr: f64,
    container_width: f64,
    canvas: CanvasSize,
    source: Option<SourceImage>,
    selection: Option<Rect>,
    committed: bool,
    drag: DragState,
    generation: u64,
    listener: Option<SelectionListener>,
}

impl SelectionController {
    pub fn new(config: Config, container_width: f64, dpr: f64) -> Self {
        let canvas = CanvasSize::from_logical(canvas::fixed_box(container_width, &config), dpr);
        SelectionController {
            config,
            dpr,
            container_width,
            canvas,
            source: None,
            selection: None,
            committed: false,
            drag: DragState::Idle,
            generation: 0,
            listener: None,
        }
    }

    /// Called with the committed rectangle when a drag ends, and with `None`
    /// whenever search and clear should be disabled.
    pub fn on_selection_committed(&mut self, listener: impl FnMut(Option<Rect>) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.canvas
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// The rectangle currently on screen, including one still being dragged.
    pub fn selection(&self) -> Option<Rect> {
        self.selection
    }

    pub fn committed_selection(&self) -> Option<Rect> {
        self.selection.filter(|_| self.committed)
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Install the result of an image decode or frame capture.
    ///
    /// Errors from the current load are handed back untouched and leave the
    /// previous source and selection in place.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<SourceImage>,
    ) -> Result<LoadOutcome> {
        if ticket.0 != self.generation {
            log::warn!("dropping stale load {} (current {})", ticket.0, self.generation);
            return Ok(LoadOutcome::Stale);
        }
        match result {
            Ok(source) => {
                self.set_source(source);
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                log::warn!("load failed, keeping previous source: {e}");
                Err(e)
            }
        }
    }

    /// Replace the source image. Any selection is gone before the new image
    /// is ever drawn.
    pub fn set_source(&mut self, source: SourceImage) {
        log::info!("new source {}x{}", source.width(), source.height());
        self.reset_selection();
        self.source = Some(source);
        self.fit_canvas();
    }

    pub fn clear_source(&mut self) {
        self.reset_selection();
        self.source = None;
    }

    /// The container or the display scale changed.
    ///
    /// A selection keeps covering the same part of the image. A drag in
    /// progress is cancelled and reported as no selection.
    pub fn resize(&mut self, container_width: f64, dpr: f64) {
        self.container_width = container_width;
        self.dpr = dpr;
        let before = self.draw_rect();
        if !self.fit_canvas() {
            return;
        }
        if let (Some(sel), Some(old), Some(new)) = (self.selection, before, self.draw_rect()) {
            let map = |p: Point| {
                Point::new(
                    new.x0 + (p.x - old.x0) / old.width() * new.width(),
                    new.y0 + (p.y - old.y0) / old.height() * new.height(),
                )
            };
            let moved = Rect::from_points(map(sel.origin()), map(Point::new(sel.x1, sel.y1)));
            self.selection = Some(geometry::clamp_to(moved, new));
        }
        if let DragState::Dragging { .. } = self.drag {
            log::debug!("canvas resized mid-drag, drag cancelled");
            self.drag = DragState::Idle;
            self.selection = None;
            self.committed = false;
            self.notify(None);
        }
    }

    /// Where the image is drawn on the canvas, if there is one.
    pub fn draw_rect(&self) -> Option<Rect> {
        let source = self.source.as_ref()?;
        let image = Size::new(source.width() as f64, source.height() as f64);
        Some(geometry::fit_rect(self.canvas.to_size(), image))
    }

    pub fn canvas_point(&self, event: PointerEvent, canvas_bounds: Rect) -> Point {
        input::to_canvas_point(event, canvas_bounds, self.dpr)
    }

    /// Start a drag. Returns whether one started.
    pub fn pointer_down(&mut self, at: Point) -> bool {
        if self.source.is_none() || !self.canvas.bounds().contains(at) {
            return false;
        }
        log::debug!("drag start at ({:.1}, {:.1})", at.x, at.y);
        self.drag = DragState::Dragging { start: at };
        self.selection = None;
        self.committed = false;
        true
    }

    /// Track the pointer. Returns whether the canvas needs repainting.
    pub fn pointer_move(&mut self, at: Point) -> bool {
        let DragState::Dragging { start } = self.drag else {
            return false;
        };
        let Some(bounds) = self.draw_rect() else {
            return false;
        };
        let raw = geometry::normalize_rect(start, at);
        self.selection = Some(geometry::clamp_to(raw, bounds));
        true
    }

    /// End the drag, wherever the pointer is. Keeps the selection only if it
    /// is big enough to search on.
    pub fn pointer_up(&mut self) -> Option<Rect> {
        if self.drag == DragState::Idle {
            return None;
        }
        self.drag = DragState::Idle;

        let min = self.config.min_selection_px;
        match self.selection {
            Some(sel) if sel.width() > min && sel.height() > min => {
                log::info!(
                    "selection committed: {:.0}x{:.0} at ({:.0}, {:.0})",
                    sel.width(),
                    sel.height(),
                    sel.x0,
                    sel.y0
                );
                self.committed = true;
            }
            _ => {
                log::debug!("selection too small, discarded");
                self.selection = None;
                self.committed = false;
            }
        }
        let committed = self.committed_selection();
        self.notify(committed);
        committed
    }

    pub fn clear_selection(&mut self) {
        self.reset_selection();
    }

    /// The committed selection in source-image pixels.
    pub fn image_region(&self) -> Option<ImageRegion> {
        let sel = self.committed_selection()?;
        let source = self.source.as_ref()?;
        let draw = self.draw_rect()?;
        Some(geometry::to_image_region(sel, draw, source.width(), source.height()))
    }

    /// The selected part of the source image at full resolution.
    pub fn crop_selection(&self) -> Option<RgbaImage> {
        let region = self.image_region()?;
        let source = self.source.as_ref()?;
        Some(imageops::crop_imm(source.pixels(), region.x, region.y, region.w, region.h).to_image())
    }

    pub fn readout(&self) -> SelectionReadout {
        SelectionReadout(self.selection)
    }

    pub fn selection_style(&self) -> SelectionStyle {
        SelectionStyle {
            overlay: self.config.overlay(),
            outline: StrokeStyle {
                color: self.config.outline(),
                width: self.config.outline_width_px(self.dpr),
                dash: self.config.dash_px(self.dpr),
            },
        }
    }

    /// Draw the current state. Never changes it.
    pub fn render(&self, surface: &mut dyn Surface) {
        surface.resize(self.canvas);
        render::paint(surface, self.source.as_ref(), self.selection, &self.selection_style());
    }

    /// Returns whether the canvas changed size.
    fn fit_canvas(&mut self) -> bool {
        let Some(source) = &self.source else {
            return false;
        };
        let image = Size::new(source.width() as f64, source.height() as f64);
        let logical = canvas::target_size(self.container_width, image, &self.config);
        let canvas = CanvasSize::from_logical(logical, self.dpr);
        let changed = canvas != self.canvas;
        self.canvas = canvas;
        changed
    }

    fn reset_selection(&mut self) {
        self.drag = DragState::Idle;
        self.selection = None;
        self.committed = false;
        self.notify(None);
    }

    fn notify(&mut self, selection: Option<Rect>) {
        if let Some(listener) = self.listener.as_mut() {
            listener(selection);
        }
    }
}

/// One-line text describing the selection, e.g. `Selection: x=10, y=10, w=40, h=40`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionReadout(pub Option<Rect>);

impl fmt::Display for SelectionReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => write!(f, "Selection: none"),
            Some(r) => write!(
                f,
                "Selection: x={}, y={}, w={}, h={}",
                r.x0.round(),
                r.y0.round(),
                r.width().round(),
                r.height().round()
            ),
        }
    }
}
