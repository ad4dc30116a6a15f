//! Platform layer
//!
//! Host-facing helpers shared by both targets:
//! - Monotonic clock and round seeds
//! - Session selection (mode, environment) from the page URL
//! - The asset manifest the page hands us
//! - Canvas backing-store sizing
//!
//! The browser bindings themselves (`CanvasSurface`, `WebMedia`) only exist
//! on wasm32.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Viewport;
use crate::sim::Environment;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{CanvasSurface, WebMedia, preload};

pub mod consts {
    /// Video extensions recognised in the asset manifest
    pub const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "webm", "ogv"];

    /// Backing store is never larger than this per side
    pub const MAX_BACKING_SIZE: u32 = 8192;
}

use consts::*;

/// Which game the page runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Sketch,
    Runner,
}

impl GameMode {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "sketch" | "shield" => Some(GameMode::Sketch),
            "runner" | "run" => Some(GameMode::Runner),
            _ => None,
        }
    }
}

/// Session-start parameters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionConfig {
    pub mode: GameMode,
    pub env: Environment,
    /// Fixed seed for reproducible rounds; otherwise the clock seeds
    pub seed: Option<u64>,
}

impl SessionConfig {
    /// Parse `mode`, `env` and `seed` from a URL query string
    ///
    /// Unknown or missing values keep their defaults.
    pub fn from_query(query: &str) -> Self {
        let mut config = Self::default();
        for (name, value) in query.trim_start_matches('?').split('&').filter_map(|pair| pair.split_once('=')) {
            match name {
                "mode" => {
                    if let Some(mode) = GameMode::from_key(value) {
                        config.mode = mode;
                    }
                }
                "env" | "map" => config.env = Environment::from_key_or_default(value),
                "seed" => config.seed = value.parse().ok(),
                _ => {}
            }
        }
        config
    }

    /// Seed for this round
    pub fn seed_or(&self, fallback: u64) -> u64 {
        self.seed.unwrap_or(fallback)
    }
}

/// How an asset URL should be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Decide by file extension, ignoring any query or fragment
    pub fn for_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        match ext {
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }
}

/// Asset key to URL map supplied by the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    pub entries: BTreeMap<String, String>,
}

impl AssetManifest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with their load kind
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, MediaKind)> {
        self.entries
            .iter()
            .map(|(key, url)| (key.as_str(), url.as_str(), MediaKind::for_url(url)))
    }
}

/// Canvas backing-store size for a CSS viewport
pub fn backing_size(view: &Viewport) -> (u32, u32) {
    let ratio = if view.pixel_ratio.is_finite() && view.pixel_ratio > 0.0 {
        view.pixel_ratio
    } else {
        1.0
    };
    let side = |css: f32| ((css.max(1.0) * ratio).round() as u32).clamp(1, MAX_BACKING_SIZE);
    (side(view.width), side(view.height))
}

/// Milliseconds on a monotonic clock
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Milliseconds on a monotonic clock
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// Seed derived from wall-clock time
#[cfg(target_arch = "wasm32")]
pub fn clock_seed() -> u64 {
    js_sys::Date::now() as u64
}

/// Seed derived from wall-clock time
#[cfg(not(target_arch = "wasm32"))]
pub fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_selection() {
        let config = SessionConfig::from_query("?mode=runner&env=desert&seed=42");
        assert_eq!(config.mode, GameMode::Runner);
        assert_eq!(config.env, Environment::Desert);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.seed_or(7), 42);
    }

    #[test]
    fn test_query_defaults() {
        let config = SessionConfig::from_query("");
        assert_eq!(config, SessionConfig::default());
        let config = SessionConfig::from_query("mode=chess&map=atlantis&seed=x");
        assert_eq!(config.mode, GameMode::Sketch);
        assert_eq!(config.env, Environment::Meadow);
        assert_eq!(config.seed_or(7), 7);
    }

    #[test]
    fn test_media_kind_by_extension() {
        assert_eq!(MediaKind::for_url("/media/desert.MP4"), MediaKind::Video);
        assert_eq!(MediaKind::for_url("clip.webm?v=3"), MediaKind::Video);
        assert_eq!(MediaKind::for_url("hero.gif"), MediaKind::Image);
        assert_eq!(MediaKind::for_url("noext"), MediaKind::Image);
    }

    #[test]
    fn test_manifest_json() {
        let manifest = AssetManifest::from_json(r#"{"video_desert": "d.mp4", "coin": "coin.png"}"#).unwrap();
        assert_eq!(manifest.len(), 2);
        let kinds: Vec<_> = manifest.iter().map(|(k, _, kind)| (k, kind)).collect();
        assert_eq!(kinds, vec![("coin", MediaKind::Image), ("video_desert", MediaKind::Video)]);
        assert!(AssetManifest::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_backing_size() {
        let view = Viewport::new(400.0, 300.0).with_pixel_ratio(2.0);
        assert_eq!(backing_size(&view), (800, 600));
        let bad = Viewport::new(400.0, 300.0).with_pixel_ratio(f32::NAN);
        assert_eq!(backing_size(&bad), (400, 300));
        assert_eq!(backing_size(&Viewport::new(100_000.0, 0.0)), (MAX_BACKING_SIZE, 1));
    }

    #[test]
    fn test_native_clock_monotonic() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }
}
