//! Weather scheduling and weather particles
//!
//! Two flavours share one particle type:
//! - [`WeatherSystem`]: runner-style timed episodes (scheduled start/stop,
//!   rate-based emission up to a per-kind cap, rain splashes)
//! - [`AmbientWeather`]: a fixed sketch-mode field that wraps to the top
//!
//! All velocities are px/s.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::environment::Environment;
use super::particles::{Particle, jitter};
use crate::renderer::Rgba;
use crate::renderer::color::palette;

pub mod consts {
    pub const MIN_INTENSITY: f32 = 0.15;
    pub const MAX_INTENSITY: f32 = 1.0;
    /// Margin outside the viewport before rain/sand is culled
    pub const CULL_MARGIN: f32 = 80.0;
    /// Spawn band either side of the viewport
    pub const SPAWN_MARGIN: f32 = 40.0;
    /// Ambient particles wrap once this far below the viewport
    pub const AMBIENT_WRAP_BELOW: f32 = 20.0;
}

use consts::*;

/// Kind of precipitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    Rain,
    Snow,
    Sand,
}

impl WeatherKind {
    /// Particles per second at intensity 1
    pub fn rate(self) -> f32 {
        match self {
            WeatherKind::Rain => 120.0,
            _ => 38.0,
        }
    }

    /// Live particle cap
    pub fn cap(self) -> usize {
        match self {
            WeatherKind::Snow => 420,
            WeatherKind::Rain => 700,
            WeatherKind::Sand => 300,
        }
    }

    /// Full-screen tint for an intensity
    pub fn tint(self, intensity: f32) -> Rgba {
        match self {
            WeatherKind::Snow => palette::SNOW_TINT.alpha(0.02 * intensity),
            WeatherKind::Rain => palette::RAIN_TINT.alpha(0.04 * intensity),
            WeatherKind::Sand => palette::SAND_TINT.alpha(0.03 * intensity),
        }
    }
}

/// Per-environment weather behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherProfile {
    /// Kind of timed episodes
    pub kind: WeatherKind,
    /// Chance an inactive check starts an episode
    pub start_probability: f32,
    /// Fixed ambient field in sketch mode, if any
    pub ambient: Option<WeatherKind>,
}

impl WeatherProfile {
    pub fn for_env(env: Environment) -> Self {
        let (kind, start_probability, ambient) = match env {
            Environment::Arctic => (WeatherKind::Snow, 0.26, Some(WeatherKind::Snow)),
            Environment::Haunted => (WeatherKind::Rain, 0.18, Some(WeatherKind::Rain)),
            Environment::Desert | Environment::Beach => (WeatherKind::Sand, 0.08, Some(WeatherKind::Sand)),
            // City dust is drawn as sand
            Environment::City => (WeatherKind::Sand, 0.08, Some(WeatherKind::Sand)),
            Environment::Forest => (WeatherKind::Rain, 0.08, Some(WeatherKind::Rain)),
            Environment::Meadow | Environment::Bangu => (WeatherKind::Rain, 0.08, None),
        };
        Self {
            kind,
            start_probability,
            ambient,
        }
    }
}

/// A rain drop, snowflake or sand grain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherParticle {
    pub kind: WeatherKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Radius for snow/sand, streak length for rain
    pub size: f32,
    pub alpha: f32,
}

/// Scheduler transition reported by [`WeatherSystem::maybe_toggle`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeatherTransition {
    None,
    Started { kind: WeatherKind, duration_ms: f64, intensity: f32 },
    Stopped,
}

#[inline]
fn rnd_ms<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + rng.random::<f64>() * (hi - lo)
}

/// Timed weather episodes for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSystem {
    pub profile: WeatherProfile,
    pub active: bool,
    pub kind: Option<WeatherKind>,
    pub intensity: f32,
    pub end_time: f64,
    pub next_check: f64,
    pub last_emit: Option<f64>,
    /// Quality multiplier on the per-kind cap
    pub cap_scale: f32,
    pub particles: Vec<WeatherParticle>,
}

impl WeatherSystem {
    /// First check happens shortly after the round starts
    pub fn new<R: Rng + ?Sized>(profile: WeatherProfile, now: f64, rng: &mut R) -> Self {
        Self {
            profile,
            active: false,
            kind: None,
            intensity: 0.0,
            end_time: 0.0,
            next_check: now + rnd_ms(rng, 800.0, 2400.0),
            last_emit: None,
            cap_scale: 1.0,
            particles: Vec::new(),
        }
    }

    /// Effective cap for the active kind
    pub fn cap(&self) -> usize {
        self.kind
            .map(|k| ((k.cap() as f32 * self.cap_scale).round() as usize).max(1))
            .unwrap_or(0)
    }

    pub fn start<R: Rng + ?Sized>(&mut self, now: f64, kind: WeatherKind, duration_ms: f64, intensity: f32, rng: &mut R) {
        self.active = true;
        self.kind = Some(kind);
        self.end_time = now + duration_ms;
        self.intensity = intensity.clamp(MIN_INTENSITY, MAX_INTENSITY);
        self.particles.clear();
        self.last_emit = None;
        self.next_check = self.end_time + rnd_ms(rng, 6000.0, 15000.0);
    }

    pub fn stop<R: Rng + ?Sized>(&mut self, now: f64, rng: &mut R) {
        self.active = false;
        self.kind = None;
        self.particles.clear();
        self.end_time = 0.0;
        self.last_emit = None;
        self.next_check = now + rnd_ms(rng, 6000.0, 14000.0);
    }

    /// End an expired episode or roll for a new one
    pub fn maybe_toggle<R: Rng + ?Sized>(&mut self, now: f64, rng: &mut R) -> WeatherTransition {
        if self.active {
            if now >= self.end_time {
                self.stop(now, rng);
                log::debug!("Weather stopped");
                return WeatherTransition::Stopped;
            }
            return WeatherTransition::None;
        }
        if now < self.next_check {
            return WeatherTransition::None;
        }
        if rng.random::<f32>() < self.profile.start_probability {
            let duration_ms = rnd_ms(rng, 3800.0, 14000.0);
            let intensity = 0.45 + rng.random::<f32>() * 0.5;
            let kind = self.profile.kind;
            self.start(now, kind, duration_ms, intensity, rng);
            log::debug!("Weather started: {:?} for {:.0} ms at {:.2}", kind, duration_ms, intensity);
            WeatherTransition::Started {
                kind,
                duration_ms,
                intensity,
            }
        } else {
            self.next_check = now + rnd_ms(rng, 4000.0, 12000.0);
            WeatherTransition::None
        }
    }

    /// Rate-based emission; never pushes past the cap
    pub fn emit<R: Rng + ?Sized>(&mut self, now: f64, view: Vec2, ground_top: f32, rng: &mut R) -> usize {
        let Some(kind) = self.kind.filter(|_| self.active) else {
            return 0;
        };
        let since = (now - self.last_emit.unwrap_or(now)).max(1.0);
        let wanted = (kind.rate() * self.intensity * since as f32 / 1000.0).ceil() as usize;
        self.last_emit = Some(now);

        let room = self.cap().saturating_sub(self.particles.len());
        let n = wanted.min(room);
        let i = self.intensity;
        for _ in 0..n {
            let x = -SPAWN_MARGIN + rng.random::<f32>() * (view.x + 2.0 * SPAWN_MARGIN);
            let particle = match kind {
                WeatherKind::Snow => WeatherParticle {
                    kind,
                    pos: Vec2::new(x, -rng.random::<f32>() * 120.0),
                    vel: Vec2::new(
                        (rng.random::<f32>() * std::f32::consts::TAU).sin() * 24.0 * i,
                        20.0 + rng.random::<f32>() * 46.0 * i,
                    ),
                    size: 2.0 + rng.random::<f32>() * 5.0 * i,
                    alpha: 0.6 + rng.random::<f32>() * 0.4,
                },
                WeatherKind::Rain => WeatherParticle {
                    kind,
                    pos: Vec2::new(x, -rng.random::<f32>() * 160.0),
                    vel: Vec2::new(-60.0 - rng.random::<f32>() * 40.0, 420.0 + rng.random::<f32>() * 320.0 * i),
                    size: 10.0 + rng.random::<f32>() * 18.0 * i.max(0.6),
                    alpha: 0.35 + rng.random::<f32>() * 0.25,
                },
                WeatherKind::Sand => WeatherParticle {
                    kind,
                    pos: Vec2::new(view.x + rng.random::<f32>() * SPAWN_MARGIN, ground_top - rng.random::<f32>() * 160.0),
                    vel: Vec2::new(-(60.0 + rng.random::<f32>() * 80.0 * i), jitter(rng, 20.0)),
                    size: 1.0 + rng.random::<f32>() * 1.6,
                    alpha: 0.2 + rng.random::<f32>() * 0.3,
                },
            };
            self.particles.push(particle);
        }
        n
    }

    /// Move and cull; rain hitting the ground splashes into `splashes`
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        dt: f32,
        view: Vec2,
        ground_top: f32,
        rng: &mut R,
        splashes: &mut Vec<Particle>,
    ) {
        let intensity = self.intensity;
        let fall_accel = 4.0 * (0.4 + intensity * 0.8);
        self.particles.retain_mut(|p| match p.kind {
            WeatherKind::Snow => {
                p.pos += p.vel * dt;
                p.vel.x += ((p.pos.y + now as f32) / 600.0).sin() * 0.3 * 60.0 * dt;
                p.vel.y += fall_accel * dt;
                p.pos.y <= ground_top + 6.0
            }
            WeatherKind::Rain => {
                p.pos += p.vel * dt;
                if p.pos.y > ground_top - 4.0 {
                    let count = 2 + (rng.random::<f32>() * 3.0 * intensity).round() as u32;
                    for _ in 0..count {
                        splashes.push(Particle::new(
                            Vec2::new(p.pos.x + jitter(rng, 8.0), ground_top - 6.0 + rng.random::<f32>() * 6.0),
                            Vec2::new(jitter(rng, 80.0), -120.0 - rng.random::<f32>() * 80.0),
                            0.28 + rng.random::<f32>() * 0.4,
                            1.5,
                            palette::RAIN_STREAK,
                        ));
                    }
                    return false;
                }
                in_cull_bounds(p.pos, view)
            }
            WeatherKind::Sand => {
                p.pos += p.vel * dt;
                in_cull_bounds(p.pos, view)
            }
        });
    }

    /// Full frame: schedule, emit, then update
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        dt: f32,
        view: Vec2,
        ground_top: f32,
        rng: &mut R,
        splashes: &mut Vec<Particle>,
    ) -> WeatherTransition {
        let transition = self.maybe_toggle(now, rng);
        if self.active {
            self.emit(now, view, ground_top, rng);
            self.update(now, dt, view, ground_top, rng, splashes);
        }
        transition
    }

    /// Screen tint while an episode runs
    pub fn tint(&self) -> Option<Rgba> {
        self.kind.filter(|_| self.active).map(|k| k.tint(self.intensity))
    }
}

fn in_cull_bounds(p: Vec2, view: Vec2) -> bool {
    p.x >= -CULL_MARGIN && p.x <= view.x + CULL_MARGIN && p.y <= view.y + CULL_MARGIN
}

/// Fixed sketch-mode weather field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmbientWeather {
    pub kind: Option<WeatherKind>,
    pub particles: Vec<WeatherParticle>,
}

impl AmbientWeather {
    /// Populate the field: `W/6` rain drops or `W/18` other particles
    pub fn new<R: Rng + ?Sized>(kind: Option<WeatherKind>, view: Vec2, rng: &mut R) -> Self {
        let Some(kind) = kind else {
            return Self::default();
        };
        let divisor = if kind == WeatherKind::Rain { 6.0 } else { 18.0 };
        let count = (view.x / divisor).floor().max(0.0) as usize;
        let particles = (0..count)
            .map(|_| {
                let pos = Vec2::new(rng.random::<f32>() * view.x, rng.random::<f32>() * view.y);
                let (vel, size) = Self::sample_motion(kind, rng);
                WeatherParticle {
                    kind,
                    pos,
                    vel,
                    size,
                    alpha: 1.0,
                }
            })
            .collect();
        Self {
            kind: Some(kind),
            particles,
        }
    }

    fn sample_motion<R: Rng + ?Sized>(kind: WeatherKind, rng: &mut R) -> (Vec2, f32) {
        match kind {
            WeatherKind::Rain => (
                Vec2::new(jitter(rng, 0.4), 240.0 + rng.random::<f32>() * 120.0),
                8.0 + rng.random::<f32>() * 10.0,
            ),
            WeatherKind::Snow => (
                Vec2::new(jitter(rng, 12.0), 30.0 + rng.random::<f32>() * 40.0),
                1.0 + rng.random::<f32>() * 2.4,
            ),
            WeatherKind::Sand => (
                Vec2::new(-20.0 + rng.random::<f32>() * 40.0, 10.0 + rng.random::<f32>() * 8.0),
                1.0 + rng.random::<f32>() * 1.6,
            ),
        }
    }

    /// Move and wrap particles that left the view back above the top
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, view: Vec2, rng: &mut R) {
        for p in &mut self.particles {
            p.pos += p.vel * dt;
            if p.pos.y > view.y + AMBIENT_WRAP_BELOW || p.pos.x < -SPAWN_MARGIN || p.pos.x > view.x + SPAWN_MARGIN {
                p.pos = Vec2::new(rng.random::<f32>() * view.x, -10.0 - rng.random::<f32>() * 80.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_start_clamps_intensity() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut w = WeatherSystem::new(WeatherProfile::for_env(Environment::Arctic), 0.0, &mut rng);
        w.start(1000.0, WeatherKind::Snow, 5000.0, 0.01, &mut rng);
        assert_eq!(w.intensity, MIN_INTENSITY);
        assert!(w.next_check >= 6000.0 + 6000.0 && w.next_check <= 6000.0 + 15000.0);
        w.start(1000.0, WeatherKind::Snow, 5000.0, 4.0, &mut rng);
        assert_eq!(w.intensity, 1.0);
    }

    #[test]
    fn test_episode_expires() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut w = WeatherSystem::new(WeatherProfile::for_env(Environment::Haunted), 0.0, &mut rng);
        w.start(0.0, WeatherKind::Rain, 1000.0, 0.8, &mut rng);
        assert_eq!(w.maybe_toggle(500.0, &mut rng), WeatherTransition::None);
        assert_eq!(w.maybe_toggle(1000.0, &mut rng), WeatherTransition::Stopped);
        assert!(!w.active);
        assert!(w.tint().is_none());
        assert!(w.next_check >= 7000.0 && w.next_check <= 15000.0);
    }

    #[test]
    fn test_failed_roll_reschedules() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut profile = WeatherProfile::for_env(Environment::Meadow);
        profile.start_probability = 0.0;
        let mut w = WeatherSystem::new(profile, 0.0, &mut rng);
        assert_eq!(w.maybe_toggle(10_000.0, &mut rng), WeatherTransition::None);
        assert!(w.next_check >= 14_000.0 && w.next_check <= 22_000.0);
    }

    #[test]
    fn test_certain_roll_starts_profile_kind() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut profile = WeatherProfile::for_env(Environment::Desert);
        profile.start_probability = 1.0;
        let mut w = WeatherSystem::new(profile, 0.0, &mut rng);
        match w.maybe_toggle(10_000.0, &mut rng) {
            WeatherTransition::Started { kind, duration_ms, intensity } => {
                assert_eq!(kind, WeatherKind::Sand);
                assert!((3800.0..=14000.0).contains(&duration_ms));
                assert!((0.45..=0.95).contains(&intensity));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_sustained_snow_plateaus_at_cap() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut w = WeatherSystem::new(WeatherProfile::for_env(Environment::Arctic), 0.0, &mut rng);
        w.start(0.0, WeatherKind::Snow, 1.0e9, 1.0, &mut rng);
        let view = Vec2::new(800.0, 2000.0);
        let ground_top = 1800.0;
        let mut splashes = Vec::new();
        let mut now = 0.0;
        let mut peak = 0;
        for _ in 0..900 {
            now += 1000.0 / 60.0;
            w.step(now, 1.0 / 60.0, view, ground_top, &mut rng, &mut splashes);
            peak = peak.max(w.particles.len());
            assert!(w.particles.len() <= 420);
        }
        assert_eq!(peak, 420);
        assert_eq!(w.particles.len(), 420);
    }

    #[test]
    fn test_rain_splashes_on_ground() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut w = WeatherSystem::new(WeatherProfile::for_env(Environment::Haunted), 0.0, &mut rng);
        w.start(0.0, WeatherKind::Rain, 1.0e9, 1.0, &mut rng);
        w.particles.push(WeatherParticle {
            kind: WeatherKind::Rain,
            pos: Vec2::new(100.0, 395.0),
            vel: Vec2::new(-60.0, 600.0),
            size: 12.0,
            alpha: 0.5,
        });
        let mut splashes = Vec::new();
        w.update(0.0, 1.0 / 60.0, Vec2::new(800.0, 600.0), 400.0, &mut rng, &mut splashes);
        assert!(w.particles.is_empty());
        assert!((2..=5).contains(&splashes.len()));
    }

    #[test]
    fn test_tint_alpha_scales() {
        assert_eq!(WeatherKind::Rain.tint(1.0), Rgba::new(20, 30, 40, 10));
        assert_eq!(WeatherKind::Snow.tint(1.0).a, 5);
    }

    #[test]
    fn test_ambient_field_wraps() {
        let mut rng = Pcg32::seed_from_u64(7);
        let view = Vec2::new(600.0, 400.0);
        let mut a = AmbientWeather::new(Some(WeatherKind::Rain), view, &mut rng);
        assert_eq!(a.particles.len(), 100);
        for _ in 0..600 {
            a.update(1.0 / 60.0, view, &mut rng);
            assert!(a.particles.iter().all(|p| p.pos.y <= view.y + AMBIENT_WRAP_BELOW + 10.0));
        }
        assert_eq!(a.particles.len(), 100);
        let sand = AmbientWeather::new(Some(WeatherKind::Sand), view, &mut rng);
        assert_eq!(sand.particles.len(), 33);
        assert!(AmbientWeather::new(None, view, &mut rng).particles.is_empty());
    }
}
