// src/app.rs

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use anyhow::Result;
use druid::piet::{ImageFormat, InterpolationMode, PietImage};
use druid::widget::{Button, Flex, Label, LineBreaking, Scroll};
use druid::{
    AppLauncher, BoxConstraints, Data, Env, Event, EventCtx, LayoutCtx, LifeCycle, LifeCycleCtx,
    PaintCtx, RenderContext, Size, UpdateCtx, Widget, WidgetExt, WindowDesc,
};
use vmerch::results::{self, MockCatalog, SearchBackend, SearchQuery, SearchResult, SortKey};
use vmerch::{
    Config, LoadOutcome, PixelSurface, PointerEvent, SelectionController, SourceImage, VideoClip,
    source, video,
};

const VIDEO_HINT: &str = "Step to the frame you want, then click “Capture frame”.";

struct Session {
    controller: SelectionController,
    clip: Option<VideoClip>,
    found: Vec<SearchResult>,
    /// Flipped by the controller whenever a selection is committed or dropped.
    search_ready: Rc<Cell<bool>>,
}

#[derive(Clone, Data)]
struct AppState {
    #[data(ignore)]
    session: Rc<RefCell<Session>>,
    revision: u64,
    status: String,
    readout: String,
    results: String,
    #[data(same_fn = "PartialEq::eq")]
    sort: SortKey,
    can_search: bool,
    can_capture: bool,
}

impl AppState {
    /// Pull derived UI state out of the session after anything changed it.
    fn sync(&mut self) {
        let session = self.session.borrow();
        self.revision += 1;
        self.readout = session.controller.readout().to_string();
        self.can_search = session.search_ready.get();
        self.can_capture = session.clip.is_some();
    }

    fn show_results(&mut self) {
        let session = self.session.borrow();
        self.results = if session.found.is_empty() {
            results::EMPTY_HINT.to_string()
        } else {
            session.found.iter().map(|r| r.to_string()).collect::<Vec<_>>().join("\n")
        };
    }

    fn reset_results(&mut self, hint: &str) {
        self.session.borrow_mut().found.clear();
        self.results = hint.to_string();
    }

    fn load_image(&mut self, path: &Path) {
        self.apply_load(source::open_image(path), true);
    }

    /// Hand a decoded image or captured frame to the controller. Results are
    /// only dropped once the new source is actually on the canvas.
    fn apply_load(&mut self, loaded: vmerch::Result<SourceImage>, drop_clip: bool) {
        let applied = {
            let mut session = self.session.borrow_mut();
            let ticket = session.controller.begin_load();
            match session.controller.finish_load(ticket, loaded) {
                Ok(LoadOutcome::Applied) => {
                    if drop_clip {
                        session.clip = None;
                    }
                    self.status.clear();
                    true
                }
                Ok(LoadOutcome::Stale) => false,
                Err(e) => {
                    self.status = e.to_string();
                    false
                }
            }
        };
        if applied {
            self.reset_results(results::EMPTY_HINT);
        }
        self.sync();
    }

    fn load_video(&mut self, path: &Path) {
        {
            let mut session = self.session.borrow_mut();
            match VideoClip::open(path) {
                Ok(clip) => {
                    session.controller.clear_source();
                    session.clip = Some(clip);
                    self.status = VIDEO_HINT.to_string();
                }
                Err(e) => {
                    session.clip = None;
                    self.status = e.to_string();
                }
            }
        }
        self.reset_results(results::EMPTY_HINT);
        self.sync();
    }

    fn step_frame(&mut self, delta: isize) {
        if let Some(clip) = self.session.borrow_mut().clip.as_mut() {
            clip.step(delta);
            self.status = format!(
                "Frame {}/{} at {:.2}s. {}",
                clip.current_index() + 1,
                clip.frame_count(),
                clip.current_time_ms() as f64 / 1000.0,
                VIDEO_HINT
            );
        }
    }

    fn capture(&mut self) {
        let frame = match &self.session.borrow().clip {
            Some(clip) => video::capture_frame(clip),
            None => Err(vmerch::Error::FrameNotReady),
        };
        self.apply_load(frame, false);
    }

    fn clear_selection(&mut self) {
        let has_source = {
            let mut session = self.session.borrow_mut();
            session.controller.clear_selection();
            session.controller.source().is_some()
        };
        self.reset_results(if has_source { results::CLEARED_HINT } else { results::EMPTY_HINT });
        self.sync();
    }

    fn search(&mut self) {
        {
            let mut session = self.session.borrow_mut();
            let (Some(region), Some(crop)) =
                (session.controller.image_region(), session.controller.crop_selection())
            else {
                return;
            };
            let mut found = MockCatalog.search(&SearchQuery { region, crop });
            results::sort_results(&mut found, self.sort);
            session.found = found;
        }
        self.show_results();
    }

    fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        results::sort_results(&mut self.session.borrow_mut().found, self.sort);
        self.show_results();
    }
}

// Canvas widget: shows the rendered surface and feeds it mouse input
struct CanvasWidget {
    surface: PixelSurface,
    cached_image: Option<PietImage>,
}

impl Widget<AppState> for CanvasWidget {
    fn event(&mut self, ctx: &mut EventCtx, event: &Event, data: &mut AppState, _env: &Env) {
        match event {
            Event::MouseDown(e) if e.button.is_left() => {
                let started = {
                    let mut session = data.session.borrow_mut();
                    let at = session
                        .controller
                        .canvas_point(PointerEvent::new(e.pos.x, e.pos.y), kurbo::Rect::ZERO);
                    session.controller.pointer_down(at)
                };
                if started {
                    ctx.set_active(true);
                    data.sync();
                }
            }

            Event::MouseMove(e) if ctx.is_active() => {
                let moved = {
                    let mut session = data.session.borrow_mut();
                    let at = session
                        .controller
                        .canvas_point(PointerEvent::new(e.pos.x, e.pos.y), kurbo::Rect::ZERO);
                    session.controller.pointer_move(at)
                };
                if moved {
                    data.sync();
                }
            }

            // while active the widget sees the release even outside its bounds
            Event::MouseUp(e) if e.button.is_left() && ctx.is_active() => {
                ctx.set_active(false);
                data.session.borrow_mut().controller.pointer_up();
                data.sync();
            }
            _ => {}
        }
    }

    fn lifecycle(&mut self, _ctx: &mut LifeCycleCtx, _event: &LifeCycle, _data: &AppState, _env: &Env) {}

    fn update(&mut self, ctx: &mut UpdateCtx, old: &AppState, data: &AppState, _env: &Env) {
        if old.revision != data.revision {
            self.cached_image = None;
            ctx.request_paint();
        }
    }

    fn layout(&mut self, ctx: &mut LayoutCtx, bc: &BoxConstraints, data: &AppState, _env: &Env) -> Size {
        let dpr = ctx.window().get_scale().map(|s| s.x()).unwrap_or(1.0);
        let mut session = data.session.borrow_mut();
        let before = session.controller.canvas_size();
        session.controller.resize(bc.max().width, dpr);
        let canvas = session.controller.canvas_size();
        if canvas != before {
            self.cached_image = None;
        }
        bc.constrain(Size::new(canvas.width as f64 / dpr, canvas.height as f64 / dpr))
    }

    fn paint(&mut self, ctx: &mut PaintCtx, data: &AppState, _env: &Env) {
        if self.cached_image.is_none() {
            let session = data.session.borrow();
            session.controller.render(&mut self.surface);
            let pixels = self.surface.pixels();
            self.cached_image = ctx
                .make_image(
                    pixels.width() as usize,
                    pixels.height() as usize,
                    pixels.as_raw(),
                    ImageFormat::RgbaSeparate,
                )
                .ok();
        }
        let full_rect = ctx.size().to_rect();
        if let Some(img) = &self.cached_image {
            ctx.draw_image(img, full_rect, InterpolationMode::NearestNeighbor);
        }
    }
}

fn pick_file(name: &str, extensions: &[&str]) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new().add_filter(name, extensions).pick_file()
}

fn build_ui() -> impl Widget<AppState> {
    let toolbar = Flex::row()
        .with_child(Button::new("Open image…").on_click(|_ctx, data: &mut AppState, _| {
            if let Some(path) = pick_file("Images", &["png", "jpg", "jpeg", "gif", "webp"]) {
                data.load_image(&path);
            }
        }))
        .with_spacer(6.0)
        .with_child(Button::new("Open video…").on_click(|_ctx, data: &mut AppState, _| {
            if let Some(path) = pick_file("GIF clips", &["gif"]) {
                data.load_video(&path);
            }
        }))
        .with_spacer(6.0)
        .with_child(
            Button::new("◀")
                .on_click(|_ctx, data: &mut AppState, _| data.step_frame(-1))
                .disabled_if(|data: &AppState, _| !data.can_capture),
        )
        .with_child(
            Button::new("▶")
                .on_click(|_ctx, data: &mut AppState, _| data.step_frame(1))
                .disabled_if(|data: &AppState, _| !data.can_capture),
        )
        .with_child(
            Button::new("Capture frame")
                .on_click(|_ctx, data: &mut AppState, _| data.capture())
                .disabled_if(|data: &AppState, _| !data.can_capture),
        )
        .with_spacer(18.0)
        .with_child(
            Button::new("Clear selection")
                .on_click(|_ctx, data: &mut AppState, _| data.clear_selection())
                .disabled_if(|data: &AppState, _| !data.can_search),
        )
        .with_spacer(6.0)
        .with_child(
            Button::new("Search")
                .on_click(|_ctx, data: &mut AppState, _| data.search())
                .disabled_if(|data: &AppState, _| !data.can_search),
        )
        .with_spacer(6.0)
        .with_child(
            Button::dynamic(|data: &AppState, _| format!("Sort: {}", data.sort.label()))
                .on_click(|_ctx, data: &mut AppState, _| data.cycle_sort()),
        );

    let results = Label::dynamic(|data: &AppState, _| data.results.clone())
        .with_line_break_mode(LineBreaking::WordWrap);

    Flex::column()
        .with_child(toolbar)
        .with_spacer(6.0)
        .with_child(Label::dynamic(|data: &AppState, _| data.status.clone()))
        .with_child(Label::dynamic(|data: &AppState, _| data.readout.clone()))
        .with_spacer(6.0)
        .with_child(CanvasWidget {
            surface: PixelSurface::new(vmerch::CanvasSize::new(1, 1)),
            cached_image: None,
        })
        .with_spacer(12.0)
        .with_flex_child(Scroll::new(results).vertical(), 1.0)
        .padding(12.0)
}

fn initial_state(config: Config) -> AppState {
    let search_ready = Rc::new(Cell::new(false));
    let mut controller = SelectionController::new(config, 980.0, 1.0);
    let gate = search_ready.clone();
    controller.on_selection_committed(move |sel| gate.set(sel.is_some()));

    let session = Session { controller, clip: None, found: Vec::new(), search_ready };
    AppState {
        session: Rc::new(RefCell::new(session)),
        revision: 0,
        status: String::new(),
        readout: String::new(),
        results: results::EMPTY_HINT.to_string(),
        sort: SortKey::default(),
        can_search: false,
        can_capture: false,
    }
}

pub fn launch(config: Config, image: Option<&Path>) -> Result<()> {
    let mut state = initial_state(config);
    match image {
        Some(path) => state.load_image(path),
        None => state.sync(),
    }

    let window = WindowDesc::new(build_ui())
        .title("vmerch")
        .window_size((1040.0, 900.0));
    AppLauncher::with_window(window).launch(state)?;
    Ok(())
}
