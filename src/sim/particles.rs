//! Impact particles and shard debris
//!
//! Spawn, integrate and cull with a fixed countdown lifetime. Weather has its
//! own store in [`super::weather`]; rain splashes land here.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::renderer::Rgba;
use crate::renderer::color::palette;

/// A particle or shard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds remaining
    pub life: f32,
    pub size: f32,
    pub color: Rgba,
    pub rotation: f32,
    pub spin: f32,
}

impl Particle {
    /// Plain particle with no spin
    pub fn new(pos: Vec2, vel: Vec2, life: f32, size: f32, color: Rgba) -> Self {
        Self {
            pos,
            vel,
            life,
            size,
            color,
            rotation: 0.0,
            spin: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Signed uniform in `[-0.5, 0.5) * span`
#[inline]
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, span: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * span
}

/// Warm dust burst; `count` is scaled by the quality particle factor
pub fn spawn_burst<R: Rng + ?Sized>(
    out: &mut Vec<Particle>,
    rng: &mut R,
    center: Vec2,
    count: u32,
    scale: f32,
) {
    let n = (count as f32 * scale).floor() as u32;
    for _ in 0..n {
        let speed = 80.0 + rng.random::<f32>() * 200.0;
        let ang = rng.random::<f32>() * std::f32::consts::TAU;
        let color = Rgba::rgb(
            140 + rng.random_range(0..80u8),
            90 + rng.random_range(0..80u8),
            60 + rng.random_range(0..40u8),
        );
        out.push(Particle {
            pos: center + Vec2::new(jitter(rng, 10.0), jitter(rng, 10.0)),
            vel: Vec2::new(
                ang.cos() * speed,
                ang.sin() * speed * -0.6 - rng.random::<f32>() * 40.0,
            ),
            life: 0.5 + rng.random::<f32>() * 1.2,
            size: 1.0 + rng.random::<f32>() * 3.0,
            color,
            rotation: rng.random::<f32>() * std::f32::consts::PI,
            spin: jitter(rng, 6.0),
        });
    }
}

/// Heavier grey debris
pub fn spawn_shards<R: Rng + ?Sized>(out: &mut Vec<Particle>, rng: &mut R, center: Vec2, count: u32) {
    for _ in 0..count {
        out.push(Particle {
            pos: center + Vec2::new(jitter(rng, 12.0), jitter(rng, 8.0)),
            vel: Vec2::new(jitter(rng, 260.0), -rng.random::<f32>() * 160.0),
            life: 0.8 + rng.random::<f32>() * 0.9,
            size: 3.0 + rng.random::<f32>() * 4.0,
            color: palette::SHARD,
            rotation: rng.random::<f32>() * std::f32::consts::PI,
            spin: jitter(rng, 8.0),
        });
    }
}

/// Break a polyline into shards along each segment
///
/// One shard per 12 px of segment (at least one), sized from the stroke
/// thickness.
pub fn path_to_shards<R: Rng + ?Sized>(
    out: &mut Vec<Particle>,
    rng: &mut R,
    path: &[Vec2],
    thickness: f32,
) -> usize {
    let before = out.len();
    let size = (thickness / 3.0).clamp(2.0, 8.0);
    for seg in path.windows(2) {
        let mid = (seg[0] + seg[1]) * 0.5;
        let count = ((seg[0].distance(seg[1]) / 12.0).floor() as u32).max(1);
        for _ in 0..count {
            out.push(Particle::new(
                mid + Vec2::new(jitter(rng, 6.0), jitter(rng, 6.0)),
                Vec2::new(jitter(rng, 120.0), -10.0 - rng.random::<f32>() * 50.0),
                0.6 + rng.random::<f32>() * 1.0,
                size,
                palette::SHARD,
            ));
        }
    }
    out.len() - before
}

/// Runner hit burst; `count` is scaled like [`spawn_burst`]
pub fn spawn_debris<R: Rng + ?Sized>(
    out: &mut Vec<Particle>,
    rng: &mut R,
    center: Vec2,
    count: u32,
    scale: f32,
) {
    let n = (count as f32 * scale).floor() as u32;
    for _ in 0..n {
        out.push(Particle::new(
            center + Vec2::new(jitter(rng, 24.0), jitter(rng, 12.0)),
            Vec2::new(jitter(rng, 200.0), -rng.random::<f32>() * 240.0),
            0.6 + rng.random::<f32>() * 0.8,
            3.0,
            palette::SHARD,
        ));
    }
}

/// Coin pickup sparkles
pub fn spawn_sparkles<R: Rng + ?Sized>(
    out: &mut Vec<Particle>,
    rng: &mut R,
    center: Vec2,
    count: u32,
    scale: f32,
) {
    let n = (count as f32 * scale).floor() as u32;
    for _ in 0..n {
        out.push(Particle::new(
            center + Vec2::new(jitter(rng, 20.0), jitter(rng, 8.0)),
            Vec2::new(jitter(rng, 160.0), -100.0 - rng.random::<f32>() * 140.0),
            0.5 + rng.random::<f32>() * 0.6,
            3.0,
            palette::COIN,
        ));
    }
}

/// Integrate under constant downward acceleration and cull expired
pub fn update_particles(particles: &mut Vec<Particle>, dt: f32, gravity: f32) {
    for p in particles.iter_mut() {
        p.vel.y += gravity * dt;
        p.pos += p.vel * dt;
        p.rotation += p.spin * dt;
        p.life -= dt;
    }
    particles.retain(|p| p.life > 0.0);
}

/// Truncate a store to `cap`, keeping the oldest entries; returns evicted count
pub fn enforce_cap<T>(store: &mut Vec<T>, cap: usize) -> usize {
    if store.len() > cap {
        let evicted = store.len() - cap;
        store.truncate(cap);
        evicted
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst_scaled_count() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut v = Vec::new();
        spawn_burst(&mut v, &mut rng, Vec2::ZERO, 10, 0.6);
        assert_eq!(v.len(), 6);
        spawn_burst(&mut v, &mut rng, Vec2::ZERO, 10, 1.0);
        assert_eq!(v.len(), 16);
    }

    #[test]
    fn test_shard_ranges() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut v = Vec::new();
        spawn_shards(&mut v, &mut rng, Vec2::new(50.0, 50.0), 40);
        for s in &v {
            assert!((3.0..7.0).contains(&s.size));
            assert!((0.8..1.7).contains(&s.life));
            assert!(s.vel.y <= 0.0);
        }
    }

    #[test]
    fn test_path_to_shards_counts() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut v = Vec::new();
        // 36 px segment -> 3 shards, 5 px segment -> 1 shard
        let path = [Vec2::ZERO, Vec2::new(36.0, 0.0), Vec2::new(41.0, 0.0)];
        let n = path_to_shards(&mut v, &mut rng, &path, 30.0);
        assert_eq!(n, 4);
        assert!(v.iter().all(|s| (s.size - 8.0).abs() < 0.001));
    }

    #[test]
    fn test_update_culls_expired() {
        let mut v = vec![
            Particle::new(Vec2::ZERO, Vec2::ZERO, 0.01, 1.0, Rgba::WHITE),
            Particle::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0, 1.0, Rgba::WHITE),
        ];
        update_particles(&mut v, 0.02, 13.2);
        assert_eq!(v.len(), 1);
        assert!((v[0].pos.x - 0.2).abs() < 0.001);
        assert!(v[0].vel.y > 0.0);
    }

    proptest! {
        #[test]
        fn prop_cap_never_exceeded(len in 0usize..3000, cap in 0usize..2000) {
            let mut v: Vec<u32> = (0..len as u32).collect();
            let evicted = enforce_cap(&mut v, cap);
            prop_assert!(v.len() <= cap);
            prop_assert_eq!(evicted + v.len(), len);
            // Oldest kept
            if !v.is_empty() {
                prop_assert_eq!(v[0], 0);
            }
        }
    }
}
