//! Difficulty-scaled spawning
//!
//! - Sketch: timed batches of weighted hazard types with a decaying interval
//! - Runner: timed obstacles spaced by an oscillating per-environment gap,
//!   with coins dropped into wide gaps

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::{Coin, Danger, DangerKind, Obstacle};
use super::environment::Environment;
use super::ids::IdAllocator;
use super::particles::jitter;

pub mod consts {
    /// Initial sketch spawn interval (ms)
    pub const SPAWN_INTERVAL_START: f64 = 2000.0;
    /// Floor of the sketch spawn interval (ms)
    pub const SPAWN_INTERVAL_MIN: f64 = 130.0;
    /// Interval multiplier per spawn event
    pub const SPAWN_ACCEL: f64 = 0.9935;
    /// Live hazard allowance at the start of a round
    pub const BASE_MAX_DANGERS: usize = 15;
    /// Live hazard allowance ceiling
    pub const HARD_MAX_DANGERS: usize = 60;
    pub const MAX_BATCH: u32 = 4;
    pub const SMALL_SCALE_BOOST: f32 = 1.15;
    pub const MIN_HAZARD_SIZE: f32 = 14.0;
    pub const LARGE_SIZE_CAP: f32 = 56.0;

    /// Runner spawn period (ms)
    pub const RUNNER_SPAWN_INTERVAL: f64 = 1200.0;
    /// Max random backdate of the next runner spawn (ms)
    pub const RUNNER_SPAWN_BACKDATE: f64 = 300.0;
    pub const MAX_OBSTACLES: usize = 14;
    /// Base run speed (px/s)
    pub const RUN_SPEED: f32 = 260.0;
    pub const OBSTACLE_SCALE: f32 = 0.7;
    pub const MIN_OBSTACLE_SIZE: f32 = 16.0;
    pub const BIG_OBSTACLE_CHANCE: f32 = 0.28;
    pub const ABSOLUTE_MIN_GAP: f32 = 120.0;
    /// Smallest gap that receives coins
    pub const COIN_GAP_MIN: f32 = 100.0;
    pub const COIN_SIZE: f32 = 32.0;
    /// Coin height above the new obstacle's top
    pub const COIN_LIFT: f32 = 27.0;
}

use consts::*;

/// `1 + min(6, elapsed / 20)`
pub fn difficulty(elapsed_secs: f32) -> f32 {
    1.0 + (elapsed_secs.max(0.0) / 20.0).min(6.0)
}

/// Hazards per sketch spawn event
pub fn batch_size(difficulty: f32) -> u32 {
    (difficulty.floor() as u32).clamp(1, MAX_BATCH)
}

/// Live hazard allowance for a round age
pub fn dynamic_max(elapsed_secs: f32) -> usize {
    let grown = BASE_MAX_DANGERS + (elapsed_secs.max(0.0) / 12.0).floor() as usize;
    grown.clamp(BASE_MAX_DANGERS, HARD_MAX_DANGERS)
}

/// Periodic spawn trigger with an optionally decaying interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTimer {
    pub interval: f64,
    pub min_interval: f64,
    pub decay: f64,
    pub last_spawn: f64,
}

impl SpawnTimer {
    /// Sketch timer: 2000 ms decaying by 0.9935 down to 130 ms
    pub fn sketch(now: f64) -> Self {
        Self {
            interval: SPAWN_INTERVAL_START,
            min_interval: SPAWN_INTERVAL_MIN,
            decay: SPAWN_ACCEL,
            last_spawn: now,
        }
    }

    /// Runner timer: fixed 1200 ms
    pub fn runner(now: f64) -> Self {
        Self {
            interval: RUNNER_SPAWN_INTERVAL,
            min_interval: RUNNER_SPAWN_INTERVAL,
            decay: 1.0,
            last_spawn: now,
        }
    }

    pub fn due(&self, now: f64) -> bool {
        now - self.last_spawn > self.interval
    }

    /// Record a spawn event at `stamp` and decay the interval
    pub fn fire(&mut self, stamp: f64) {
        self.last_spawn = stamp;
        self.interval = (self.interval * self.decay).max(self.min_interval);
    }

    /// Closed form of the interval after `n` spawn events
    pub fn interval_after(n: u32) -> f64 {
        (SPAWN_INTERVAL_START * SPAWN_ACCEL.powi(n as i32)).max(SPAWN_INTERVAL_MIN)
    }
}

/// Per-type selection weights at a difficulty, in declaration order
pub fn type_weights(difficulty: f32) -> [f32; DangerKind::ALL.len()] {
    let mut weights = [0.0; DangerKind::ALL.len()];
    for (w, kind) in weights.iter_mut().zip(DangerKind::ALL) {
        let (base, boost) = if kind.is_heavy() { (1.8, 0.5) } else { (1.0, 0.12) };
        *w = (base * (1.0 + boost * (difficulty - 1.0))).max(0.1);
    }
    weights
}

/// Subtract weights from `r` in order; the first index reaching `<= 0` wins
///
/// Falls back to index 0 when rounding leaves `r` positive.
pub fn pick_weighted(weights: &[f32], mut r: f32) -> usize {
    for (i, w) in weights.iter().enumerate() {
        r -= w;
        if r <= 0.0 {
            return i;
        }
    }
    0
}

pub fn choose_danger_kind<R: Rng + ?Sized>(rng: &mut R, difficulty: f32) -> DangerKind {
    let weights = type_weights(difficulty);
    let total: f32 = weights.iter().sum();
    DangerKind::ALL[pick_weighted(&weights, rng.random::<f32>() * total)]
}

/// Independently capped growth multipliers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyScales {
    pub size: f32,
    pub hp: f32,
    pub mass: f32,
    pub speed: f32,
}

impl DifficultyScales {
    pub fn at(difficulty: f32) -> Self {
        let d = difficulty - 1.0;
        Self {
            size: 1.0 + (d * 0.08).min(1.2),
            hp: 1.0 + (d * 0.18).min(1.6),
            mass: 1.0 + (d * 0.12).min(1.2),
            speed: 1.0 + (d * 0.16).min(1.6),
        }
    }
}

/// Build one hazard above the viewport
pub fn spawn_danger<R: Rng + ?Sized>(
    rng: &mut R,
    ids: &mut IdAllocator,
    view_width: f32,
    difficulty: f32,
) -> Danger {
    let kind = choose_danger_kind(rng, difficulty);
    let props = kind.props();
    let scales = DifficultyScales::at(difficulty);

    let boost = if props.size < 1.0 { SMALL_SCALE_BOOST } else { 1.0 };
    let base = 28.0 * props.size * boost;
    let width = (base * scales.size + rng.random::<f32>() * base * 0.6).clamp(MIN_HAZARD_SIZE, LARGE_SIZE_CAP);
    let height = (base * scales.size + rng.random::<f32>() * base * 0.6).clamp(MIN_HAZARD_SIZE, LARGE_SIZE_CAP);
    let x = rng.random::<f32>() * (view_width - width).max(1.0);
    let y = -height - rng.random::<f32>() * (40.0 + 60.0 * (difficulty * 0.4).min(1.6));

    let vy = 40.0 * (1.0 + rng.random::<f32>() * 0.9) / 60.0 * scales.speed;
    let vx = jitter(rng, 0.8) * (1.0 + (difficulty - 1.0) * 0.08);
    let rotation = rng.random::<f32>() * std::f32::consts::TAU;
    let angular_vel = jitter(rng, 1.2 + (difficulty - 1.0) * 0.35);
    let hp = props.hp * (1.0 + rng.random::<f32>() * 0.18) * scales.hp;

    Danger {
        id: ids.next_id(),
        kind,
        pos: Vec2::new(x, y),
        vel: Vec2::new(vx, vy),
        rotation,
        angular_vel,
        mass: props.mass * scales.mass,
        hp,
        max_hp: hp,
        base_damage: props.base_damage,
        width,
        height,
        clicked_times: 0,
    }
}

/// Per-environment obstacle spacing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapProfile {
    pub min: f32,
    pub max: f32,
    /// Oscillation frequency (Hz)
    pub freq: f32,
    /// Oscillation amplitude around the middle of the range
    pub amp: f32,
}

impl GapProfile {
    pub const fn new(min: f32, max: f32, freq: f32, amp: f32) -> Self {
        Self { min, max, freq, amp }
    }

    pub fn for_env(env: Environment) -> Self {
        match env {
            Environment::Meadow => Self::new(320.0, 780.0, 0.10, 0.36),
            Environment::Desert => Self::new(300.0, 700.0, 0.12, 0.30),
            Environment::Arctic => Self::new(340.0, 820.0, 0.08, 0.42),
            Environment::Bangu => Self::new(300.0, 640.0, 0.14, 0.28),
            Environment::Haunted => Self::new(360.0, 820.0, 0.10, 0.44),
            Environment::Forest => Self::new(350.0, 780.0, 0.11, 0.34),
            Environment::Beach => Self::new(310.0, 720.0, 0.13, 0.38),
            Environment::City => Self::new(320.0, 780.0, 0.12, 0.36),
        }
    }

    pub fn range(&self) -> f32 {
        self.max - self.min
    }

    /// Oscillating base gap at round time `t` (s)
    pub fn base_gap(&self, t: f32, phase: f32) -> f32 {
        let osc = 0.5 + 0.5 * (t * std::f32::consts::TAU * self.freq + phase).sin();
        let m = (0.5 + (osc - 0.5) * self.amp).clamp(0.0, 1.0);
        (self.min + self.range() * m).round()
    }

    /// Minimum spacing from the previous obstacle, scaled by run speed
    pub fn min_gap(&self, t: f32, phase: f32, speed: f32, jitter: f32) -> f32 {
        let speed_scale = (speed / RUN_SPEED).clamp(0.8, 1.6);
        (self.base_gap(t, phase) * speed_scale + jitter).round().max(ABSOLUTE_MIN_GAP)
    }

    /// Random jitter within `±range * 0.08`, whole pixels
    pub fn sample_jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let span = (self.range() * 0.08).round() as i32;
        if span == 0 {
            0.0
        } else {
            rng.random_range(-span..span) as f32
        }
    }
}

/// Obstacle asset keys drawn from for an environment
pub fn obstacle_pool(env: Environment) -> &'static [&'static str] {
    match env {
        Environment::Desert => &[
            "cactus",
            "snail_shell",
            "worm_ring_move_a",
            "slime_fire_flat",
            "slime_fire_walk_a",
            "rock",
            "block_planks",
            "bricks_brown",
        ],
        Environment::Arctic => &[
            "snow",
            "slime_normal_flat",
            "snail_shell",
            "worm_normal_move_a",
            "spring",
            "spikes",
            "bricks_grey",
        ],
        Environment::Haunted => &[
            "barnacle_attack_a",
            "barnacle_attack_b",
            "fly_a",
            "fly_b",
            "slime_spike_flat",
            "spikes",
            "mouse_walk_a",
            "mouse_walk_b",
            "saw_b",
            "grass_purple",
            "ladybug_fly",
        ],
        Environment::Bangu => &[
            "asad_kamal",
            "barri_sumon",
            "dorbesh",
            "hasao_mahmud",
            "hasina",
            "joy",
            "kauua_kader",
            "momen",
            "momtag_biddut",
            "murgi_kobir",
            "palak",
            "s_osman",
            "sheik_selim",
        ],
        _ => &[
            "block_planks",
            "block_plank",
            "rock",
            "fence_broken",
            "frog_idle",
            "frog_jump",
            "ladybug_walk_a",
            "ladybug_walk_b",
            "bee_a",
            "bee_b",
        ],
    }
}

/// Build the next obstacle, standing on `floor_y`
///
/// Placed off-screen right and at least `min_gap` past `last`.
#[allow(clippy::too_many_arguments)]
pub fn spawn_obstacle<R: Rng + ?Sized>(
    rng: &mut R,
    ids: &mut IdAllocator,
    env: Environment,
    view_width: f32,
    floor_y: f32,
    last: Option<&Obstacle>,
    min_gap: f32,
    speed: f32,
) -> Obstacle {
    let pool = obstacle_pool(env);
    let kind = pool[rng.random_range(0..pool.len())];
    let big = rng.random::<f32>() < BIG_OBSTACLE_CHANCE;
    let (base_w, base_h) = if big {
        (rng.random_range(56..92), rng.random_range(48..80))
    } else {
        (rng.random_range(30..46), rng.random_range(28..44))
    };
    let width = (base_w as f32 * OBSTACLE_SCALE).floor().max(MIN_OBSTACLE_SIZE);
    let height = (base_h as f32 * OBSTACLE_SCALE).floor().max(MIN_OBSTACLE_SIZE);

    let mut x = view_width + rng.random_range(160..280) as f32;
    if let Some(prev) = last {
        x = x.max(prev.right() + min_gap);
    }

    Obstacle {
        id: ids.next_id(),
        kind: kind.to_string(),
        pos: Vec2::new(x, floor_y - height),
        width,
        height,
        big,
        vx: -speed.round(),
    }
}

/// Coins evenly spread through the gap between two obstacles
///
/// Gaps narrower than 100 px get none.
pub fn coins_in_gap<R: Rng + ?Sized>(
    rng: &mut R,
    ids: &mut IdAllocator,
    prev: &Obstacle,
    next: &Obstacle,
    floor_y: f32,
    speed: f32,
) -> Vec<Coin> {
    let start = prev.right() + 5.0;
    let gap = next.pos.x - 5.0 - start;
    if gap < COIN_GAP_MIN {
        return Vec::new();
    }
    let max_coins = ((gap / COIN_GAP_MIN).floor() as u32).min(3);
    let count = rng.random_range(0..=max_coins).max(1);
    let y = floor_y - next.height - COIN_LIFT;
    let step = gap / count as f32;

    (0..count)
        .map(|i| Coin {
            id: ids.next_id(),
            pos: Vec2::new((start + (i as f32 + 0.5) * step + jitter(rng, 25.0)).round(), y),
            width: COIN_SIZE,
            height: COIN_SIZE,
            vx: -speed.round(),
            collected: false,
            anim_time: 0.0,
        })
        .collect()
}
