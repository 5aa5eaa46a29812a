use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use kurbo::Rect;
use vmerch::results::{self, MockCatalog, SearchBackend, SearchQuery, SortKey};
use vmerch::{Config, PixelSurface, PointerEvent, SelectionController, VideoClip, source, video};

#[cfg(feature = "gui")]
mod app;

#[derive(Parser)]
#[command(name = "vmerch")]
#[command(version, about = "Select a region of an image or video still and browse mocked shopping matches")]
struct Cli {
    /// JSON file overriding canvas and overlay settings
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay one drag on a source without opening a window
    Select(SelectArgs),

    /// Open the desktop window
    #[cfg(feature = "gui")]
    Gui {
        /// Image to show on start
        #[arg(value_name = "IMAGE")]
        image: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SelectArgs {
    /// Image file to select from
    #[arg(long, value_name = "FILE", conflicts_with = "video", required_unless_present = "video")]
    image: Option<PathBuf>,

    /// Animated GIF clip to capture a still from
    #[arg(long, value_name = "FILE")]
    video: Option<PathBuf>,

    /// Frame of the clip to capture
    #[arg(long, value_name = "N", default_value = "0")]
    frame: usize,

    /// Width available to the canvas, in logical pixels
    #[arg(long, value_name = "PX", default_value = "980", value_parser = parse_container_width)]
    container_width: f64,

    /// Device pixel ratio of the display
    #[arg(long, value_name = "RATIO", default_value = "1.0", value_parser = parse_dpr)]
    dpr: f64,

    /// Drag in logical pixels relative to the canvas corner
    #[arg(long, value_name = "X0,Y0:X1,Y1", value_parser = parse_drag)]
    drag: Drag,

    /// Result order: match, price-asc, price-desc or rating
    #[arg(long, value_name = "KEY", default_value = "match")]
    sort: SortKey,

    /// Write the rendered canvas as PNG
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Write the selected part of the source as PNG
    #[arg(long, value_name = "FILE")]
    crop: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    from: PointerEvent,
    to: PointerEvent,
}

fn parse_point(s: &str) -> Result<PointerEvent, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected X,Y, got `{s}`"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x `{x}`: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y `{y}`: {e}"))?;
    Ok(PointerEvent::new(x, y))
}

/// Largest logical container width accepted on the command line.
const MAX_CONTAINER_WIDTH: f64 = 16_384.0;
/// Largest device pixel ratio accepted on the command line.
const MAX_DPR: f64 = 8.0;

fn parse_bounded(s: &str, max: f64) -> Result<f64, String> {
    let v = s.trim().parse::<f64>().map_err(|e| format!("`{s}`: {e}"))?;
    if !v.is_finite() || v <= 0.0 {
        return Err(format!("`{s}` must be a positive number"));
    }
    if v > max {
        return Err(format!("`{s}` is larger than {max}"));
    }
    Ok(v)
}

fn parse_container_width(s: &str) -> Result<f64, String> {
    parse_bounded(s, MAX_CONTAINER_WIDTH)
}

fn parse_dpr(s: &str) -> Result<f64, String> {
    parse_bounded(s, MAX_DPR)
}

fn parse_drag(s: &str) -> Result<Drag, String> {
    let (from, to) = s.split_once(':').ok_or_else(|| format!("expected X0,Y0:X1,Y1, got `{s}`"))?;
    Ok(Drag { from: parse_point(from)?, to: parse_point(to)? })
}

fn load_source(args: &SelectArgs) -> vmerch::Result<vmerch::SourceImage> {
    match (&args.image, &args.video) {
        (Some(path), _) => source::open_image(path),
        (None, Some(path)) => {
            let mut clip = VideoClip::open(path)?;
            clip.seek(args.frame);
            log::info!("capturing frame {} of {}", clip.current_index(), clip.frame_count());
            video::capture_frame(&clip)
        }
        (None, None) => Err(vmerch::Error::FrameNotReady),
    }
}

fn save_png(image: &image::RgbaImage, path: &Path) -> Result<()> {
    image.save(path).with_context(|| format!("writing {}", path.display()))
}

fn run_select(config: Config, args: SelectArgs) -> Result<()> {
    let mut controller = SelectionController::new(config, args.container_width, args.dpr);

    let ticket = controller.begin_load();
    controller.finish_load(ticket, load_source(&args))?;

    // the canvas sits at the origin of the client coordinate space
    let from = controller.canvas_point(args.drag.from, Rect::ZERO);
    let to = controller.canvas_point(args.drag.to, Rect::ZERO);
    controller.pointer_down(from);
    controller.pointer_move(to);
    controller.pointer_up();
    println!("{}", controller.readout());

    if let Some(out) = &args.out {
        let mut surface = PixelSurface::new(controller.canvas_size());
        controller.render(&mut surface);
        surface.save(out).with_context(|| format!("writing {}", out.display()))?;
        log::info!("canvas written to {}", out.display());
    }

    let Some(region) = controller.image_region() else {
        println!("{}", results::EMPTY_HINT);
        return Ok(());
    };
    let crop = controller.crop_selection().context("selection has no pixels")?;
    if let Some(path) = &args.crop {
        save_png(&crop, path)?;
    }

    let mut found = MockCatalog.search(&SearchQuery { region, crop });
    results::sort_results(&mut found, args.sort);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        println!("{} results, sorted by {}", found.len(), args.sort.label());
        for r in &found {
            println!("  {r}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Select(args) => run_select(config, args),
        #[cfg(feature = "gui")]
        Commands::Gui { image } => app::launch(config, image.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_parses_both_points() {
        let drag = parse_drag("50,50:10.5, 12").unwrap();
        assert_eq!(drag.from, PointerEvent::new(50.0, 50.0));
        assert_eq!(drag.to, PointerEvent::new(10.5, 12.0));
    }

    #[test]
    fn drag_without_separator_is_rejected() {
        assert!(parse_drag("50,50,10,10").is_err());
        assert!(parse_drag("a,1:2,3").is_err());
    }

    #[test]
    fn canvas_scale_must_be_positive_and_finite() {
        for bad in ["0", "-1", "NaN", "inf", "1e300"] {
            assert!(parse_dpr(bad).is_err(), "dpr {bad}");
            assert!(parse_container_width(bad).is_err(), "width {bad}");
        }
        assert_eq!(parse_dpr("2"), Ok(2.0));
        assert_eq!(parse_container_width(" 640.5 "), Ok(640.5));

        let cli = Cli::try_parse_from([
            "vmerch", "select", "--image", "a.png", "--drag", "0,0:1,1", "--dpr", "0",
        ]);
        assert!(cli.is_err());
    }

    #[test]
    fn cli_requires_a_source() {
        assert!(Cli::try_parse_from(["vmerch", "select", "--drag", "0,0:1,1"]).is_err());
        let cli = Cli::try_parse_from(["vmerch", "select", "--image", "a.png", "--drag", "0,0:1,1"]);
        assert!(cli.is_ok());
    }
}
