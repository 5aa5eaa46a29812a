// src/config.rs

use std::path::Path;

use anyhow::{Context, Result};
use image::Rgba;
use serde::{Deserialize, Serialize};

/// How the canvas backing store is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sizing {
    /// Shrink the canvas to the image's aspect ratio within the width and height caps.
    FitImage,
    /// Always `min(container, max_canvas_width)` × `max_canvas_height`; the image is letterboxed.
    FixedBox,
}

/// Tunables for canvas sizing, drag handling and the selection overlay.
///
/// Lengths are logical (CSS) pixels unless the name says otherwise; the
/// controller scales them by the device pixel ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_canvas_height: f64,
    pub max_canvas_width: f64,
    pub sizing: Sizing,
    /// Both sides of a released drag must exceed this, in device pixels.
    pub min_selection_px: f64,
    pub overlay_color: [u8; 4],
    pub outline_color: [u8; 4],
    pub outline_width: f64,
    /// On/off lengths of the outline dashes.
    pub dash: [f64; 2],
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_canvas_height: 520.0,
            max_canvas_width: 980.0,
            sizing: Sizing::FitImage,
            min_selection_px: 10.0,
            overlay_color: [0, 0, 0, 89],
            outline_color: [94, 234, 212, 242],
            outline_width: 2.0,
            dash: [8.0, 6.0],
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(raw)?;
        if config.max_canvas_height <= 0.0 || config.max_canvas_width <= 0.0 {
            anyhow::bail!("canvas caps must be positive");
        }
        Ok(config)
    }

    pub fn overlay(&self) -> Rgba<u8> {
        Rgba(self.overlay_color)
    }

    pub fn outline(&self) -> Rgba<u8> {
        Rgba(self.outline_color)
    }

    /// Outline thickness in device pixels; never thinner than 2.
    pub fn outline_width_px(&self, dpr: f64) -> f64 {
        (self.outline_width * dpr).max(2.0)
    }

    pub fn dash_px(&self, dpr: f64) -> [f64; 2] {
        [self.dash[0] * dpr, self.dash[1] * dpr]
    }
}
