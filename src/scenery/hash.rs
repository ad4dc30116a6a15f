//! Deterministic coordinate hashes for procedural scenery
//!
//! Not cryptographic. The same inputs always give the same output, so
//! textures are stable across rebuilds without storing per-pixel noise.

/// `fract(|sin(x*12.9898 + y*78.233 + seed) * 43758.5453|)` in `[0, 1)`
#[inline]
pub fn coord_hash(x: f32, y: f32, seed: f32) -> f32 {
    let v = ((x as f64 * 12.9898 + y as f64 * 78.233 + seed as f64).sin() * 43758.5453).abs();
    let f = v.fract() as f32;
    // f64 -> f32 rounding can land exactly on 1.0
    if f >= 1.0 { 0.0 } else { f }
}

/// Hash mapped to `[lo, hi)`
#[inline]
pub fn hash_range(x: f32, y: f32, seed: f32, lo: f32, hi: f32) -> f32 {
    lo + coord_hash(x, y, seed) * (hi - lo)
}

/// Hash mapped to an index in `0..n` (n > 0)
#[inline]
pub fn hash_index(x: f32, y: f32, seed: f32, n: usize) -> usize {
    ((coord_hash(x, y, seed) * n as f32) as usize).min(n.saturating_sub(1))
}

/// mulberry32 single step: `[0, 1)` from a 32-bit seed
pub fn mulberry32(seed: u32) -> f32 {
    let mut t = seed.wrapping_add(0x6D2B_79F5);
    t = (t ^ (t >> 15)).wrapping_mul(t | 1);
    t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
    let out = t ^ (t >> 14);
    let v = (out as f64 / 4_294_967_296.0) as f32;
    v.min(1.0 - f32::EPSILON / 2.0)
}

/// Two-key seeded value in `[-1, 1)`
pub fn signed_hash(seed: u32, alt: u32) -> f32 {
    let mixed = seed.wrapping_mul(374_761_393) ^ alt.wrapping_mul(668_265_263);
    mulberry32(mixed) * 2.0 - 1.0
}

/// Smooth vertical offset along x for wavy bands (grass lines, sand edges)
pub fn vertical_wobble(x: f32, seed: f32, amplitude: f32) -> f32 {
    let a = (x * 0.021 + seed).sin();
    let b = (x * 0.047 + seed * 1.7).sin() * 0.5;
    (a + b) / 1.5 * amplitude
}

/// Stable numeric seed for a string key
pub fn key_seed(key: &str) -> f32 {
    key.bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32)) as f32
        % 9973.0
}
