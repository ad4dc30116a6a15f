//! Far hill strips per environment
//!
//! Ridge heights come from a seeded hash in `[-1, 1)` squashed into the lower
//! half of the view so hills never climb over the sky.

use glam::Vec2;

use super::hash::{hash_range, signed_hash};
use super::raster::{Raster, smooth_path};
use crate::renderer::Rgba;
use crate::settings::QualityPreset;

pub mod consts {
    /// Ridge y is kept in this fraction band of the view height
    pub const RIDGE_MIN_FRAC: f32 = 0.45;
    pub const RIDGE_MAX_FRAC: f32 = 0.96;
    pub const CURVE_STEPS: usize = 10;
}

use consts::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HillsSpec {
    pub width: u32,
    pub height: u32,
    pub quality: QualityPreset,
}

impl HillsSpec {
    fn w(&self) -> f32 {
        self.width as f32
    }

    fn h(&self) -> f32 {
        self.height as f32
    }
}

/// Map a hash in `[-1, 1]` to a y in the ridge band
pub fn compress_y(f: f32, view_height: f32) -> f32 {
    (0.5 * f + 0.5).clamp(RIDGE_MIN_FRAC, RIDGE_MAX_FRAC) * view_height
}

/// Ridge line for one layer; pinned so `x = 0` and `x = w` match
fn ridge(spec: &HillsSpec, peaks: u32, seed: u32, lift: f32) -> Vec<Vec2> {
    let w = spec.w();
    let n = peaks.max(2);
    let pad = w * (0.08 + 0.04 * (seed % 3) as f32 / 2.0) / n as f32;
    let mut ctrl = Vec::with_capacity(n as usize + 1);
    for i in 0..=n {
        let key = if i == n { 0 } else { i };
        let f = signed_hash(seed, key);
        let x = if i == 0 || i == n { w * i as f32 / n as f32 } else { w * i as f32 / n as f32 + pad * f };
        ctrl.push(Vec2::new(x, compress_y(f, spec.h()) - lift));
    }
    smooth_path(&ctrl, CURVE_STEPS)
}

/// Ridge filled down to the bottom, darker towards the base
fn hill_layer(r: &mut Raster, spec: &HillsSpec, peaks: u32, seed: u32, lift: f32, top: Rgba, bottom: Rgba) -> Vec<Vec2> {
    let curve = ridge(spec, peaks, seed, lift);
    r.fill_under(&curve, spec.h(), top);
    let lower: Vec<Vec2> = curve.iter().map(|p| *p + Vec2::new(0.0, (spec.h() - p.y) * 0.45)).collect();
    r.fill_under(&lower, spec.h(), top.lerp(bottom, 0.6));
    let base: Vec<Vec2> = curve.iter().map(|p| *p + Vec2::new(0.0, (spec.h() - p.y) * 0.75)).collect();
    r.fill_under(&base, spec.h(), bottom);
    curve
}

/// Local maxima (smallest y) of a ridge, spaced at least `min_gap` apart
fn peaks_of(curve: &[Vec2], min_gap: f32) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::new();
    for w in curve.windows(3) {
        if w[1].y <= w[0].y && w[1].y <= w[2].y && out.last().is_none_or(|l| w[1].x - l.x >= min_gap) {
            out.push(w[1]);
        }
    }
    out
}

pub fn desert_hills(spec: &HillsSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    hill_layer(&mut r, spec, 5, 11, 40.0, Rgba::hex(0xc5ae66), Rgba::hex(0xb38c3e));
    hill_layer(&mut r, spec, 4, 23, 0.0, Rgba::hex(0xebcd6d), Rgba::hex(0xeea24a));
    r
}

pub fn arctic_hills(spec: &HillsSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    let far = hill_layer(&mut r, spec, 6, 31, 50.0, Rgba::hex(0xeef8ff), Rgba::hex(0xd3e8f7));
    // Ice caps
    for p in peaks_of(&far, 60.0) {
        r.fill_ellipse(p + Vec2::new(0.0, 6.0), 22.0, 8.0, Rgba::hex(0xf8fdff));
    }
    hill_layer(&mut r, spec, 4, 37, 0.0, Rgba::hex(0xf8fdff), Rgba::hex(0xd3e8f7));
    r
}

/// Building silhouettes for bangu and city
pub fn street_hills(spec: &HillsSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    let (w, h) = (spec.w(), spec.h());
    let count = spec.quality.scale_count((w / 70.0).ceil() as u32);
    let slot = w / count as f32;
    for i in 0..count {
        let fi = i as f32;
        let bw = hash_range(fi, 1.0, 4.2, slot * 0.55, slot * 0.95);
        let bh = hash_range(fi, 2.0, 4.2, h * 0.18, h * 0.45);
        let x = fi * slot + (slot - bw) / 2.0;
        let y = h - bh;
        let shade = [Rgba::hex(0x3e2f2b), Rgba::hex(0x5a4842), Rgba::hex(0x7a6a64)][i as usize % 3];
        r.fill_rect(x, y, bw, bh, shade);
        // Lit windows
        let mut wy = y + 10.0;
        while wy < h - 16.0 {
            let mut wx = x + 6.0;
            while wx < x + bw - 10.0 {
                if hash_range(wx, wy, 4.2, 0.0, 1.0) < 0.35 {
                    r.fill_rect(wx, wy, 5.0, 7.0, Rgba::hex(0xffd27a).alpha(0.7));
                }
                wx += 12.0;
            }
            wy += 16.0;
        }
    }
    r
}

pub fn haunted_hills(spec: &HillsSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    hill_layer(&mut r, spec, 5, 41, 30.0, Rgba::hex(0x27282b), Rgba::hex(0x1b1d20));
    hill_layer(&mut r, spec, 3, 43, 0.0, Rgba::hex(0x1b1d20), Rgba::hex(0x121315));
    // Fog bands
    let h = spec.h();
    for k in 0..3 {
        let y = h * (0.6 + 0.1 * k as f32);
        r.fill_rect(0.0, y, spec.w(), h * 0.08, Rgba::hex(0xc8ccd8).alpha(0.05));
    }
    r
}

pub fn forest_hills(spec: &HillsSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    let far = hill_layer(&mut r, spec, 5, 51, 40.0, Rgba::hex(0x6aa75a), Rgba::hex(0x3e7a36));
    // Tree line bumps along the far ridge
    let step = 14.0;
    let mut x = 0.0;
    let mut i = 0usize;
    while x < spec.w() && !far.is_empty() {
        let idx = ((x / spec.w()) * (far.len() - 1) as f32) as usize;
        let y = far[idx.min(far.len() - 1)].y;
        if spec.quality.decoration_scale() >= 0.5 || i % 2 == 0 {
            r.fill_circle(Vec2::new(x, y + 2.0), 9.0, Rgba::hex(0x4d8c42));
        }
        x += step;
        i += 1;
    }
    hill_layer(&mut r, spec, 4, 53, 0.0, Rgba::hex(0x8ecb79), Rgba::hex(0x3e7a36));
    r
}

pub fn beach_hills(spec: &HillsSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    let (w, h) = (spec.w(), spec.h());
    // Sea band
    r.fill_vertical_gradient(0.0, h * 0.62, w, h * 0.38, &[(0.0, Rgba::hex(0x7fd0e8)), (1.0, Rgba::hex(0x3f9fc4))]);
    for k in 0..spec.quality.scale_count(24) {
        let fk = k as f32;
        let x = hash_range(fk, 3.0, 8.8, 0.0, w);
        let y = hash_range(fk, 4.0, 8.8, h * 0.66, h * 0.95);
        r.fill_rect(x, y, 18.0, 1.5, Rgba::WHITE.alpha(0.45));
    }
    hill_layer(&mut r, spec, 3, 61, -h * 0.12, Rgba::hex(0xfff9ea), Rgba::hex(0xe0bf8a));
    hill_layer(&mut r, spec, 4, 67, -h * 0.2, Rgba::hex(0xf1e2b8), Rgba::hex(0xe0bf8a));
    r
}

pub fn meadow_hills(spec: &HillsSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    hill_layer(&mut r, spec, 5, 71, 36.0, Rgba::hex(0x6aa75a), Rgba::hex(0x3e7a36));
    hill_layer(&mut r, spec, 4, 73, 0.0, Rgba::hex(0x8ecb79), Rgba::hex(0x3e7a36));
    r
}
