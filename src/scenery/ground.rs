//! Ground tiles, one layered routine per environment
//!
//! Every routine paints the same three passes:
//! - a base vertical gradient
//! - undulating shapes (dunes, drifts, turf) from a few hashed control points
//! - scattered props placed by the coordinate hash
//!
//! Tiles repeat horizontally, so control points are pinned at both edges.

use glam::Vec2;

use super::hash::{coord_hash, hash_range, vertical_wobble};
use super::raster::{Raster, smooth_path};
use crate::renderer::Rgba;
use crate::settings::QualityPreset;

pub mod consts {
    pub const TILE_WIDTH: u32 = 260;
    /// Tiles are never shorter than this
    pub const TILE_MIN_HEIGHT: u32 = 140;
    /// Baked tiles are never smaller than this
    pub const BAKE_MIN_WIDTH: u32 = 180;
    pub const BAKE_MIN_HEIGHT: u32 = 120;
    /// Curve subdivisions per control span
    pub const CURVE_STEPS: usize = 8;
}

use consts::*;

/// Inputs shared by every ground routine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSpec {
    pub width: u32,
    pub height: u32,
    /// Height of the walkable band at the top of the tile
    pub grass_band: f32,
    pub quality: QualityPreset,
}

impl GroundSpec {
    pub fn new(width: u32, height: u32, grass_band: f32, quality: QualityPreset) -> Self {
        Self {
            width: width.max(BAKE_MIN_WIDTH),
            height: height.max(BAKE_MIN_HEIGHT),
            grass_band,
            quality,
        }
    }

    fn w(&self) -> f32 {
        self.width as f32
    }

    fn h(&self) -> f32 {
        self.height as f32
    }

    fn count(&self, high: u32) -> u32 {
        self.quality.scale_count(high)
    }
}

/// Wavy band edge across the tile, equal at `x = 0` and `x = w`
fn band_curve(spec: &GroundSpec, base_y: f32, amplitude: f32, points: usize, seed: f32) -> Vec<Vec2> {
    let w = spec.w();
    let n = points.max(2);
    let ctrl: Vec<Vec2> = (0..=n)
        .map(|i| {
            let x = w * i as f32 / n as f32;
            // First and last share a hash so the tile wraps
            let key = if i == n { 0.0 } else { i as f32 };
            let y = base_y + hash_range(key, base_y, seed, -amplitude, amplitude);
            Vec2::new(x, y)
        })
        .collect();
    smooth_path(&ctrl, CURVE_STEPS)
}

/// Fill everything below a hashed undulating edge
fn undulating_layer(r: &mut Raster, spec: &GroundSpec, base_y: f32, amplitude: f32, points: usize, seed: f32, color: Rgba) {
    let curve = band_curve(spec, base_y, amplitude, points, seed);
    r.fill_under(&curve, spec.h(), color);
}

/// Small ellipses scattered inside `[y0, y1)`
fn scatter_stones(r: &mut Raster, spec: &GroundSpec, count: u32, y0: f32, y1: f32, size: (f32, f32), seed: f32, colors: &[Rgba]) {
    if colors.is_empty() {
        return;
    }
    for i in 0..spec.count(count) {
        let fi = i as f32;
        let x = hash_range(fi, 1.0, seed, 0.0, spec.w());
        let y = hash_range(fi, 2.0, seed, y0, y1);
        let rx = hash_range(fi, 3.0, seed, size.0, size.1);
        let ry = rx * hash_range(fi, 4.0, seed, 0.55, 0.85);
        let c = colors[(coord_hash(fi, 5.0, seed) * colors.len() as f32) as usize % colors.len()];
        r.fill_ellipse(Vec2::new(x, y), rx, ry, c);
        // Highlight
        r.fill_ellipse(Vec2::new(x - rx * 0.3, y - ry * 0.35), rx * 0.35, ry * 0.3, Rgba::WHITE.alpha(0.18));
    }
}

/// Single-pixel specks for grain
fn scatter_specks(r: &mut Raster, spec: &GroundSpec, count: u32, y0: f32, seed: f32, color: Rgba) {
    for i in 0..spec.count(count) {
        let fi = i as f32;
        let x = hash_range(fi, 11.0, seed, 0.0, spec.w());
        let y = hash_range(fi, 12.0, seed, y0, spec.h());
        let s = hash_range(fi, 13.0, seed, 1.0, 2.5);
        r.fill_rect(x, y, s, s, color);
    }
}

/// Short curved strokes along the band (sand ripples, snow crust)
fn ripples(r: &mut Raster, spec: &GroundSpec, count: u32, y0: f32, y1: f32, seed: f32, color: Rgba) {
    for i in 0..spec.count(count) {
        let fi = i as f32;
        let x = hash_range(fi, 21.0, seed, 0.0, spec.w());
        let y = hash_range(fi, 22.0, seed, y0, y1);
        let len = hash_range(fi, 23.0, seed, 18.0, 46.0);
        let pts: Vec<Vec2> = (0..=6)
            .map(|k| {
                let t = k as f32 / 6.0;
                Vec2::new(x + t * len, y + (t * std::f32::consts::PI).sin() * -3.0)
            })
            .collect();
        r.stroke_polyline(&pts, 1.4, color);
    }
}

pub fn desert_ground(spec: &GroundSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    let (w, h, g) = (spec.w(), spec.h(), spec.grass_band);
    r.fill_vertical_gradient(
        0.0,
        0.0,
        w,
        h,
        &[
            (0.0, Rgba::hex(0xE6D6A2)),
            (0.35, Rgba::hex(0xD9B677)),
            (0.75, Rgba::hex(0xC99A5A)),
            (1.0, Rgba::hex(0xA67846)),
        ],
    );
    // Dunes
    undulating_layer(&mut r, spec, g * 0.9, 8.0, 4, 3.1, Rgba::hex(0xD9B677).alpha(0.7));
    undulating_layer(&mut r, spec, h * 0.55, 12.0, 3, 7.7, Rgba::hex(0xC99A5A).alpha(0.55));
    ripples(&mut r, spec, 26, g, h * 0.9, 1.3, Rgba::hex(0xA67846).alpha(0.35));
    scatter_stones(&mut r, spec, 10, g + 6.0, h - 6.0, (2.0, 5.0), 9.2, &[Rgba::hex(0xA67846), Rgba::hex(0x8d6238)]);
    scatter_specks(&mut r, spec, 120, 0.0, 4.4, Rgba::hex(0x8d6238).alpha(0.35));
    r
}

pub fn arctic_ground(spec: &GroundSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    let (w, h, g) = (spec.w(), spec.h(), spec.grass_band);
    r.fill_vertical_gradient(
        0.0,
        0.0,
        w,
        h,
        &[
            (0.0, Rgba::hex(0xf8fcff)),
            (0.3, Rgba::hex(0xeef8ff)),
            (0.7, Rgba::hex(0xe6eef6)),
            (1.0, Rgba::hex(0xcfd9e3)),
        ],
    );
    // Drifts
    undulating_layer(&mut r, spec, g * 1.1, 10.0, 3, 5.5, Rgba::hex(0xe6eef6).alpha(0.8));
    undulating_layer(&mut r, spec, h * 0.65, 9.0, 4, 2.2, Rgba::hex(0xcfd9e3).alpha(0.6));
    ripples(&mut r, spec, 14, g, h * 0.8, 6.6, Rgba::hex(0xb8c8d8).alpha(0.4));
    scatter_stones(&mut r, spec, 6, g + 10.0, h - 4.0, (3.0, 6.0), 8.1, &[Rgba::hex(0x9fb3c6), Rgba::hex(0x7e93a8)]);
    scatter_specks(&mut r, spec, 60, 0.0, 2.9, Rgba::WHITE.alpha(0.9));
    r
}

/// Paved street: bangu and city
pub fn street_ground(spec: &GroundSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    let (w, h, g) = (spec.w(), spec.h(), spec.grass_band);
    r.fill_vertical_gradient(
        0.0,
        0.0,
        w,
        h,
        &[(0.0, Rgba::hex(0x9a9a9a)), (0.5, Rgba::hex(0x7f7d7b)), (1.0, Rgba::hex(0x6a6765))],
    );
    // Curb
    r.fill_rect(0.0, 0.0, w, g.min(h) * 0.35, Rgba::hex(0xb3b1ae));
    r.fill_rect(0.0, g.min(h) * 0.35, w, 2.0, Rgba::hex(0x5a5856));
    // Slab joints every 52 px keep the tile seamless at 260
    let mut x = 0.0;
    while x < w {
        r.fill_rect(x, g * 0.35, 1.5, h, Rgba::hex(0x5a5856).alpha(0.5));
        x += 52.0;
    }
    scatter_stones(&mut r, spec, 8, g, h - 4.0, (1.5, 3.5), 4.8, &[Rgba::hex(0x6a6765), Rgba::hex(0x575553)]);
    scatter_specks(&mut r, spec, 140, g * 0.4, 5.3, Rgba::BLACK.alpha(0.18));
    r
}

pub fn haunted_ground(spec: &GroundSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    let (w, h, g) = (spec.w(), spec.h(), spec.grass_band);
    r.fill_vertical_gradient(
        0.0,
        0.0,
        w,
        h,
        &[(0.0, Rgba::hex(0x222328)), (0.4, Rgba::hex(0x16161a)), (1.0, Rgba::hex(0x151416))],
    );
    undulating_layer(&mut r, spec, g * 0.8, 6.0, 5, 1.9, Rgba::hex(0x1b1d20).alpha(0.9));
    // Dead grass blades
    for i in 0..spec.count(70) {
        let fi = i as f32;
        let x = hash_range(fi, 31.0, 3.3, 0.0, w);
        let top = g * 0.6 + vertical_wobble(x, 3.3, 4.0);
        let len = hash_range(fi, 32.0, 3.3, 5.0, 12.0);
        let lean = hash_range(fi, 33.0, 3.3, -3.0, 3.0);
        r.stroke_segment(Vec2::new(x, top + len), Vec2::new(x + lean, top), 1.2, Rgba::hex(0x3a3b33));
    }
    scatter_stones(&mut r, spec, 8, g, h - 4.0, (2.0, 4.5), 6.2, &[Rgba::hex(0x2d2e33), Rgba::hex(0x3b3c42)]);
    // Low fog
    r.fill_rect(0.0, 0.0, w, g * 0.8, Rgba::hex(0xc8ccd8).alpha(0.06));
    r
}

/// Dark forest floor with turf
pub fn forest_ground(spec: &GroundSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    let (w, h, g) = (spec.w(), spec.h(), spec.grass_band);
    r.fill_vertical_gradient(
        0.0,
        0.0,
        w,
        h,
        &[(0.0, Rgba::hex(0x2f2417)), (0.5, Rgba::hex(0x33241a)), (1.0, Rgba::hex(0x1b2213))],
    );
    // Moss turf
    r.fill_rect(0.0, 0.0, w, g * 0.5, Rgba::hex(0x2e4a22));
    undulating_layer(&mut r, spec, g * 0.6, 5.0, 5, 4.1, Rgba::hex(0x2f2417));
    scatter_stones(&mut r, spec, 12, g, h - 4.0, (2.0, 5.0), 2.7, &[Rgba::hex(0x4a3a2a), Rgba::hex(0x3b2d1f)]);
    // Fallen needles
    ripples(&mut r, spec, 30, g, h, 8.8, Rgba::hex(0x6a4a22).alpha(0.5));
    r
}

pub fn beach_ground(spec: &GroundSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    let (w, h, g) = (spec.w(), spec.h(), spec.grass_band);
    r.fill_vertical_gradient(
        0.0,
        0.0,
        w,
        h,
        &[
            (0.0, Rgba::hex(0xf9edd4)),
            (0.3, Rgba::hex(0xe9d88c)),
            (0.7, Rgba::hex(0xd8be81)),
            (1.0, Rgba::hex(0xb4995d)),
        ],
    );
    // Wet sand line
    undulating_layer(&mut r, spec, h * 0.6, 7.0, 4, 1.1, Rgba::hex(0xd8be81).alpha(0.6));
    ripples(&mut r, spec, 18, g, h * 0.9, 3.9, Rgba::hex(0xb4995d).alpha(0.3));
    // Shells
    for i in 0..spec.count(7) {
        let fi = i as f32;
        let c = Vec2::new(hash_range(fi, 41.0, 2.4, 0.0, w), hash_range(fi, 42.0, 2.4, g, h - 6.0));
        r.fill_ellipse(c, 3.5, 2.5, Rgba::hex(0xfff6ee));
        r.fill_ellipse(c + Vec2::new(0.0, 0.8), 2.0, 1.2, Rgba::hex(0xf3c6b5));
    }
    scatter_specks(&mut r, spec, 100, 0.0, 7.4, Rgba::hex(0xb4995d).alpha(0.4));
    r
}

/// Grass turf over soil with pebbles and flowers
pub fn meadow_ground(spec: &GroundSpec) -> Raster {
    let mut r = Raster::new(spec.width, spec.height);
    let (w, h, g) = (spec.w(), spec.h(), spec.grass_band);
    r.fill_vertical_gradient(
        0.0,
        0.0,
        w,
        h,
        &[(0.0, Rgba::hex(0x5b3f2a)), (0.5, Rgba::hex(0x4b3323)), (1.0, Rgba::hex(0x382714))],
    );
    // Turf
    r.fill_vertical_gradient(0.0, 0.0, w, g, &[(0.0, Rgba::hex(0x8ecb79)), (1.0, Rgba::hex(0x5e9b4c))]);
    let edge = band_curve(spec, g, 3.0, 8, 0.6);
    let mut turf = vec![Vec2::ZERO];
    turf.extend(edge);
    turf.push(Vec2::new(w, 0.0));
    r.fill_polygon(&turf, Rgba::hex(0x6aa75a));
    // Tufts
    for i in 0..spec.count(60) {
        let fi = i as f32;
        let x = hash_range(fi, 51.0, 5.0, 0.0, w);
        let top = hash_range(fi, 52.0, 5.0, -2.0, g * 0.5);
        r.stroke_segment(Vec2::new(x, top + 7.0), Vec2::new(x + 1.5, top), 1.3, Rgba::hex(0x3e7a36));
    }
    scatter_stones(&mut r, spec, 10, g + 8.0, h - 4.0, (2.0, 4.0), 1.7, &[Rgba::hex(0x8b7a68), Rgba::hex(0x6f6052)]);
    // Flowers
    for i in 0..spec.count(8) {
        let fi = i as f32;
        let c = Vec2::new(hash_range(fi, 61.0, 6.0, 0.0, w), hash_range(fi, 62.0, 6.0, 2.0, g * 0.8));
        let petal = if coord_hash(fi, 63.0, 6.0) < 0.5 { Rgba::hex(0xffd2d8) } else { Rgba::hex(0xffb84d) };
        r.fill_circle(c, 2.2, petal);
        r.fill_circle(c, 0.9, Rgba::hex(0xfff3b0));
    }
    r
}
