//! Player settings and the host-supplied quality tier
//!
//! Persisted in LocalStorage on the web; native builds use defaults.

use serde::{Deserialize, Serialize};

/// Quality preset levels
///
/// Chosen by the host (device heuristics live outside the core).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Multiplier on scenery decoration counts (rocks, ripples, grass tufts)
    pub fn decoration_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.35,
            QualityPreset::Medium => 0.7,
            QualityPreset::High => 1.0,
        }
    }

    /// Multiplier on impact particle bursts
    pub fn particle_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.6,
            QualityPreset::Medium | QualityPreset::High => 1.0,
        }
    }

    /// Multiplier on particle/shard store caps
    pub fn cap_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.5,
            QualityPreset::Medium => 0.8,
            QualityPreset::High => 1.0,
        }
    }

    /// Scale a decoration count, keeping at least one
    pub fn scale_count(&self, high_count: u32) -> u32 {
        ((high_count as f32 * self.decoration_scale()).round() as u32).max(1)
    }

    /// Scale a store cap
    pub fn scale_cap(&self, cap: usize) -> usize {
        ((cap as f32 * self.cap_scale()) as usize).max(1)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Impact particle effects
    pub particles: bool,
    /// Ambient and scheduled weather
    pub weather: bool,
    /// Show the score/health HUD
    pub show_hud: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            weather: true,
            show_hud: true,
        }
    }
}

impl Settings {
    /// Default toggles with the given quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Burst multiplier, zero when particles are disabled
    pub fn particle_scale(&self) -> f32 {
        if !self.particles {
            0.0
        } else {
            self.quality.particle_scale()
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "sketch_runner_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match serde_json::to_string(self) {
                Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                    Ok(()) => log::info!("Settings saved"),
                    Err(err) => log::warn!("Failed to save settings: {:?}", err),
                },
                Err(err) => log::warn!("Failed to serialize settings: {}", err),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parse() {
        assert_eq!(QualityPreset::from_str("LOW"), Some(QualityPreset::Low));
        assert_eq!(QualityPreset::from_str("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
    }

    #[test]
    fn test_scale_count_keeps_one() {
        assert_eq!(QualityPreset::Low.scale_count(1), 1);
        assert_eq!(QualityPreset::High.scale_count(180), 180);
        assert_eq!(QualityPreset::Low.scale_count(180), 63);
    }

    #[test]
    fn test_settings_json_partial() {
        // Missing keys fall back to defaults
        let s: Settings = serde_json::from_str(r#"{"quality":"Low"}"#).unwrap();
        assert_eq!(s.quality, QualityPreset::Low);
        assert!(s.particles);
        assert!(s.weather);
    }

    #[test]
    fn test_from_preset_keeps_default_toggles() {
        let s = Settings::from_preset(QualityPreset::Low);
        assert_eq!(s.quality, QualityPreset::Low);
        assert!(s.particles && s.weather && s.show_hud);
        assert!((s.particle_scale() - 0.6).abs() < 0.0001);
    }

    #[test]
    fn test_particles_disabled() {
        let mut s = Settings::from_preset(QualityPreset::High);
        assert_eq!(s.particle_scale(), 1.0);
        s.particles = false;
        assert_eq!(s.particle_scale(), 0.0);
    }
}
