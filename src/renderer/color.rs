//! RGBA colour type shared by rasters and surfaces

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 8-bit straight-alpha colour, laid out for direct `ImageData` upload
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `0xRRGGBB`
    pub const fn hex(v: u32) -> Self {
        Self::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// Same colour with alpha from a 0-1 fraction
    pub fn alpha(self, a: f32) -> Self {
        Self {
            a: (a.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Multiply the existing alpha
    pub fn fade(self, f: f32) -> Self {
        Self {
            a: (self.a as f32 * f.clamp(0.0, 1.0)).round() as u8,
            ..self
        }
    }

    pub fn alpha_f32(&self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Channel-wise linear interpolation
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Darken (negative) or lighten (positive) by a fraction
    pub fn shade(self, amount: f32) -> Rgba {
        if amount >= 0.0 {
            self.lerp(Rgba { a: self.a, ..Rgba::WHITE }, amount)
        } else {
            self.lerp(Rgba { a: self.a, ..Rgba::BLACK }, -amount)
        }
    }

    /// CSS `rgba()` string for canvas fill/stroke styles
    pub fn to_css(&self) -> String {
        format!(
            "rgba({},{},{},{:.3})",
            self.r,
            self.g,
            self.b,
            self.alpha_f32()
        )
    }
}

/// Colours for game elements and fallbacks
pub mod palette {
    use super::Rgba;

    pub const SKY_TOP: Rgba = Rgba::hex(0xdff3ff);
    pub const SKY_MID: Rgba = Rgba::hex(0xbfe9ff);
    pub const SKY_BOTTOM: Rgba = Rgba::hex(0x8fcfff);
    /// Sketch background when no image/video is ready
    pub const PAPER: Rgba = Rgba::hex(0xefe9df);
    pub const DANGER_PLACEHOLDER: Rgba = Rgba::rgb(139, 0, 0);
    pub const OBSTACLE_PLACEHOLDER: Rgba = Rgba::hex(0x8b8b8b);
    pub const COIN: Rgba = Rgba::hex(0xffd54f);
    pub const SHARD: Rgba = Rgba::new(60, 60, 60, 242);
    pub const STROKE_PREVIEW: Rgba = Rgba::new(24, 24, 24, 245);
    pub const HERO_ZONE: Rgba = Rgba::new(200, 40, 40, 10);
    pub const HERO_PLACEHOLDER: Rgba = Rgba::hex(0x3a3a3a);
    pub const SHADOW: Rgba = Rgba::new(0, 0, 0, 31);
    pub const OVERLAY: Rgba = Rgba::new(0, 0, 0, 140);
    pub const SNOW_TINT: Rgba = Rgba::rgb(230, 240, 255);
    pub const RAIN_TINT: Rgba = Rgba::rgb(20, 30, 40);
    pub const SAND_TINT: Rgba = Rgba::rgb(210, 160, 110);
    pub const RAIN_STREAK: Rgba = Rgba::rgb(180, 210, 230);
    pub const SNOW_FLAKE: Rgba = Rgba::rgb(255, 255, 255);
    pub const SAND_GRAIN: Rgba = Rgba::rgb(214, 178, 120);
    pub const HUD_TEXT: Rgba = Rgba::hex(0x1b1b1b);
    pub const SHIELD_FRESH: Rgba = Rgba::hex(0x46a3ff);
    pub const SHIELD_WORN: Rgba = Rgba::hex(0x9b9b9b);
    pub const SHIELD_CORE_FRESH: Rgba = Rgba::hex(0x002b66);
    pub const SHIELD_CORE_WORN: Rgba = Rgba::hex(0x303030);
    pub const HURT_TINT: Rgba = Rgba::new(255, 40, 40, 31);
    pub const HEALTH_BAR: Rgba = Rgba::hex(0x4caf50);
    pub const HEALTH_BAR_BACK: Rgba = Rgba::new(0, 0, 0, 90);
}
