//! Sketch Runner - shared real-time core for two arcade mini-games
//!
//! Core modules:
//! - `sim`: Entity stores, physics, spawning, weather and the two game modes
//! - `scenery`: Procedural ground/hills/tree rasters behind a per-environment registry
//! - `renderer`: Asset readiness gate, draw surface and fixed-order compositor
//! - `frame`: Per-refresh scheduler with error containment
//! - `platform`: Browser bindings (canvas surface, media elements, clock)

pub mod error;
pub mod frame;
pub mod platform;
pub mod renderer;
pub mod scenery;
pub mod settings;
pub mod sim;

pub use error::{FrameError, RenderError};
pub use frame::{FrameOutcome, FrameScheduler, Game, RoundSummary, RoundTally};
pub use settings::{QualityPreset, Settings};

use serde::{Deserialize, Serialize};

/// Loop-wide constants
pub mod consts {
    /// Largest frame gap fed to the simulation (ms); longer gaps are absorbed
    pub const MAX_FRAME_DT_MS: f64 = 40.0;

    /// Strips are never narrower than this before doubling
    pub const MIN_STRIP_WIDTH: u32 = 512;

    /// Obstacles/coins/hazards are dropped once this far past the left edge
    pub const OFFSCREEN_MARGIN: f32 = 140.0;
}

/// Viewport geometry supplied by the host every frame (CSS pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Both dimensions finite and positive
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Width of a doubled parallax strip for this viewport
    #[inline]
    pub fn strip_width(&self) -> u32 {
        strip_width_for(self.width)
    }
}

/// `max(ceil(w), 512) * 2`
#[inline]
pub fn strip_width_for(width: f32) -> u32 {
    (width.max(0.0).ceil() as u32).max(consts::MIN_STRIP_WIDTH) * 2
}

/// Clamp the gap between two frame timestamps to `[0, 40ms]` and return seconds
#[inline]
pub fn clamp_dt(now_ms: f64, last_ms: f64) -> f32 {
    ((now_ms - last_ms).clamp(0.0, consts::MAX_FRAME_DT_MS) / 1000.0) as f32
}
