//! Pointer strokes into shields
//!
//! A stroke is collected between press and release. On completion it becomes
//! an anchored [`Shield`] when it touches the ground band and stays clear of
//! the hero zone; anything else shatters into debris.

use glam::Vec2;
use rand::Rng;

use super::collision::in_protected_zone;
use super::entities::Shield;
use super::ids::IdAllocator;
use super::particles::{Particle, path_to_shards, spawn_burst};

pub mod consts {
    /// Radius of the protected disc around the sketch hero
    pub const HERO_PROTECTED_RADIUS: f32 = 30.0;
    /// A point this close above the ground line anchors a stroke
    pub const ANCHOR_TOLERANCE: f32 = 8.0;
    pub const MIN_THICKNESS: f32 = 4.0;
    pub const MAX_THICKNESS: f32 = 34.0;
    /// Stroke length per extra pixel of thickness
    pub const THICKNESS_PER_PX: f32 = 28.0;
    pub const MIN_DURABILITY: f32 = 60.0;
    pub const MAX_DURABILITY: f32 = 520.0;
    pub const DURABILITY_PER_AREA: f32 = 0.68;
    /// Feedback burst when a press or move hits the hero zone
    pub const ZONE_FEEDBACK_PARTICLES: u32 = 8;
    pub const DEBRIS_PARTICLES: u32 = 12;
    pub const ZONE_DEBRIS_PARTICLES: u32 = 18;
}

use consts::*;

/// Circle no stroke may enter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroZone {
    pub center: Vec2,
    pub radius: f32,
}

impl HeroZone {
    pub fn new(center: Vec2) -> Self {
        Self {
            center,
            radius: HERO_PROTECTED_RADIUS,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        in_protected_zone(p, self.center, self.radius)
    }
}

/// Result of feeding a pointer event to the builder
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeEvent {
    /// Nothing happened (no active stroke)
    Idle,
    /// Press inside the hero zone was refused
    Rejected(Vec2),
    Started,
    Extended,
    /// The stroke ended; `blocked` is set when it ran into the hero zone
    Completed { path: Vec<Vec2>, blocked: bool },
}

/// In-progress stroke
#[derive(Debug, Clone, Default)]
pub struct StrokeBuilder {
    path: Vec<Vec2>,
    active: bool,
}

impl StrokeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Points drawn so far, for the preview polyline
    pub fn preview(&self) -> &[Vec2] {
        &self.path
    }

    pub fn press(&mut self, p: Vec2, zone: &HeroZone) -> StrokeEvent {
        if zone.contains(p) {
            return StrokeEvent::Rejected(p);
        }
        self.active = true;
        self.path.clear();
        self.path.push(p);
        StrokeEvent::Started
    }

    /// Entering the zone ends the stroke with what was drawn so far
    pub fn move_to(&mut self, p: Vec2, zone: &HeroZone) -> StrokeEvent {
        if !self.active {
            return StrokeEvent::Idle;
        }
        if zone.contains(p) {
            self.active = false;
            return StrokeEvent::Completed {
                path: std::mem::take(&mut self.path),
                blocked: true,
            };
        }
        self.path.push(p);
        StrokeEvent::Extended
    }

    pub fn release(&mut self) -> StrokeEvent {
        let was_active = std::mem::replace(&mut self.active, false);
        let path = std::mem::take(&mut self.path);
        if !was_active && path.len() <= 1 {
            return StrokeEvent::Idle;
        }
        StrokeEvent::Completed { path, blocked: false }
    }

    /// Drop any partial stroke (round reset)
    pub fn cancel(&mut self) {
        self.active = false;
        self.path.clear();
    }
}

/// Total polyline length
pub fn path_length(path: &[Vec2]) -> f32 {
    path.windows(2).map(|s| s[0].distance(s[1])).sum()
}

/// Thickness from length: `clamp(4 + len / 28, 4, 34)`
pub fn stroke_thickness(length: f32) -> f32 {
    (MIN_THICKNESS + length / THICKNESS_PER_PX).clamp(MIN_THICKNESS, MAX_THICKNESS)
}

/// Durability from covered area: `clamp(floor(len * thickness * 0.68), 60, 520)`
pub fn stroke_durability(length: f32, thickness: f32) -> f32 {
    (length * thickness * DURABILITY_PER_AREA)
        .floor()
        .clamp(MIN_DURABILITY, MAX_DURABILITY)
}

/// What a completed stroke turned into
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeOutcome {
    /// Too short to process
    Ignored,
    Shield { id: u32 },
    /// Shattered; `zone_violation` if the stroke touched or was cut off by the hero zone
    Debris { shards: usize, zone_violation: bool },
}

/// Where completed strokes deposit their results
pub struct StrokeSink<'a> {
    pub shields: &'a mut Vec<Shield>,
    pub shards: &'a mut Vec<Particle>,
    pub particles: &'a mut Vec<Particle>,
    pub particle_scale: f32,
}

/// Turn a completed path into a shield or debris
///
/// `blocked` marks a stroke cut off by entering the hero zone; it shatters
/// like any other zone violation.
#[allow(clippy::too_many_arguments)]
pub fn process_completed_path<R: Rng + ?Sized>(
    path: Vec<Vec2>,
    blocked: bool,
    ground_top: f32,
    zone: &HeroZone,
    ids: &mut IdAllocator,
    now_ms: f64,
    rng: &mut R,
    sink: StrokeSink<'_>,
) -> StrokeOutcome {
    if path.len() < 2 {
        return StrokeOutcome::Ignored;
    }
    let length = path_length(&path);
    let thickness = stroke_thickness(length);
    let durability = stroke_durability(length, thickness);

    let anchored = path.iter().any(|p| p.y >= ground_top - ANCHOR_TOLERANCE);
    let zone_violation = blocked || path.iter().any(|p| zone.contains(*p));

    if anchored && !zone_violation {
        let id = ids.next_id();
        sink.shields.push(Shield {
            id,
            points: path,
            thickness,
            durability,
            max_durability: durability,
            anchored: true,
            created_at: now_ms,
        });
        return StrokeOutcome::Shield { id };
    }

    let first = sink.shards.len();
    let shards = path_to_shards(sink.shards, rng, &path, thickness);
    let at = sink.shards.get(first).map(|s| s.pos).unwrap_or(path[0]);
    let burst = if zone_violation { ZONE_DEBRIS_PARTICLES } else { DEBRIS_PARTICLES };
    spawn_burst(sink.particles, rng, at, burst, sink.particle_scale);
    log::debug!(
        "Stroke shattered ({} shards, anchored={}, zone={})",
        shards,
        anchored,
        zone_violation
    );
    StrokeOutcome::Debris { shards, zone_violation }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const GROUND: f32 = 500.0;

    fn zone() -> HeroZone {
        HeroZone::new(Vec2::new(400.0, GROUND - 20.0))
    }

    struct Stores {
        shields: Vec<Shield>,
        shards: Vec<Particle>,
        particles: Vec<Particle>,
    }

    impl Stores {
        fn new() -> Self {
            Self {
                shields: Vec::new(),
                shards: Vec::new(),
                particles: Vec::new(),
            }
        }

        fn sink(&mut self) -> StrokeSink<'_> {
            StrokeSink {
                shields: &mut self.shields,
                shards: &mut self.shards,
                particles: &mut self.particles,
                particle_scale: 1.0,
            }
        }
    }

    fn process(path: Vec<Vec2>, stores: &mut Stores) -> StrokeOutcome {
        process_with(path, false, stores)
    }

    fn process_with(path: Vec<Vec2>, blocked: bool, stores: &mut Stores) -> StrokeOutcome {
        let mut ids = IdAllocator::new();
        let mut rng = Pcg32::seed_from_u64(1);
        process_completed_path(path, blocked, GROUND, &zone(), &mut ids, 1234.0, &mut rng, stores.sink())
    }

    #[test]
    fn test_horizontal_ground_stroke_makes_shield() {
        let mut stores = Stores::new();
        let path = vec![Vec2::new(50.0, GROUND), Vec2::new(250.0, GROUND)];
        let out = process(path, &mut stores);
        assert_eq!(out, StrokeOutcome::Shield { id: 1 });
        assert_eq!(stores.shields.len(), 1);
        let s = &stores.shields[0];
        assert!((s.thickness - 11.142857).abs() < 0.001);
        assert_eq!(s.durability, 520.0);
        assert_eq!(s.max_durability, 520.0);
        assert!(s.anchored);
        assert!(s.is_collidable());
        assert!(stores.shards.is_empty());
    }

    #[test]
    fn test_floating_stroke_shatters() {
        let mut stores = Stores::new();
        let path = vec![Vec2::new(50.0, 100.0), Vec2::new(86.0, 100.0)];
        let out = process(path, &mut stores);
        assert_eq!(
            out,
            StrokeOutcome::Debris {
                shards: 3,
                zone_violation: false
            }
        );
        assert!(stores.shields.is_empty());
        assert_eq!(stores.particles.len(), 12);
    }

    #[test]
    fn test_zone_violation_shatters_even_if_anchored() {
        let mut stores = Stores::new();
        let path = vec![Vec2::new(300.0, GROUND), Vec2::new(400.0, GROUND - 20.0)];
        let out = process(path, &mut stores);
        assert!(matches!(out, StrokeOutcome::Debris { zone_violation: true, .. }));
        assert_eq!(stores.particles.len(), 18);
    }

    #[test]
    fn test_blocked_anchored_stroke_shatters() {
        let mut stores = Stores::new();
        // Both points clear of the zone; the cut-off alone decides
        let path = vec![Vec2::new(200.0, GROUND), Vec2::new(260.0, GROUND)];
        let out = process_with(path, true, &mut stores);
        assert!(matches!(out, StrokeOutcome::Debris { zone_violation: true, .. }));
        assert!(stores.shields.is_empty());
        assert!(!stores.shards.is_empty());
        assert_eq!(stores.particles.len(), 18);
    }

    #[test]
    fn test_single_point_ignored() {
        let mut stores = Stores::new();
        assert_eq!(process(vec![Vec2::new(1.0, GROUND)], &mut stores), StrokeOutcome::Ignored);
        assert!(stores.shields.is_empty());
    }

    #[test]
    fn test_press_in_zone_rejected() {
        let mut b = StrokeBuilder::new();
        let p = Vec2::new(405.0, GROUND - 20.0);
        assert_eq!(b.press(p, &zone()), StrokeEvent::Rejected(p));
        assert!(!b.is_active());
    }

    #[test]
    fn test_move_into_zone_completes() {
        let mut b = StrokeBuilder::new();
        assert_eq!(b.press(Vec2::new(300.0, GROUND), &zone()), StrokeEvent::Started);
        assert_eq!(b.move_to(Vec2::new(340.0, GROUND), &zone()), StrokeEvent::Extended);
        match b.move_to(Vec2::new(400.0, GROUND - 10.0), &zone()) {
            StrokeEvent::Completed { path, blocked } => {
                assert!(blocked);
                assert_eq!(path.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!b.is_active());
        assert!(b.preview().is_empty());
        assert_eq!(b.move_to(Vec2::new(300.0, GROUND), &zone()), StrokeEvent::Idle);
    }

    #[test]
    fn test_release_without_stroke_is_idle() {
        let mut b = StrokeBuilder::new();
        assert_eq!(b.release(), StrokeEvent::Idle);
    }

    #[test]
    fn test_durability_bounds() {
        assert_eq!(stroke_durability(1.0, 4.0), 60.0);
        assert_eq!(stroke_durability(10_000.0, 34.0), 520.0);
        assert_eq!(stroke_thickness(0.0), 4.0);
        assert_eq!(stroke_thickness(10_000.0), 34.0);
    }
}
