//! Hero state for both modes

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Hero animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeroAnim {
    #[default]
    Idle,
    Walk,
    Jump,
    Hurt,
    /// Terminal pose after the last hit
    Fall,
}

pub mod consts {
    /// Sketch hero stands this far above the ground line
    pub const SKETCH_HERO_OFFSET: f32 = 20.0;
    /// Half-extent of the sketch hero hit box
    pub const SKETCH_HERO_HALF: f32 = 24.0;
    pub const SKETCH_HURT_SECS: f32 = 0.28;
    pub const SKETCH_IDLE_FRAME_SECS: f32 = 0.5;

    /// Runner hero fixed screen x
    pub const RUNNER_HERO_X: f32 = 140.0;
    pub const RUNNER_GRAVITY: f32 = 1200.0;
    pub const RUNNER_JUMP_V: f32 = -600.0;
    pub const RUNNER_SCALE: f32 = 1.1;
    pub const RUNNER_HURT_SECS: f32 = 0.5;
    pub const RUNNER_WALK_FRAME_SECS: f32 = 0.10;
}

use consts::*;

/// Sketch-mode hero: centred, grounded, counts hits
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SketchHero {
    pub anim: HeroAnim,
    pub anim_time: f32,
    pub hits: u32,
}

impl SketchHero {
    /// Feet position for a viewport width and ground line
    pub fn anchor(width: f32, ground_top: f32) -> Vec2 {
        Vec2::new(width / 2.0, ground_top - SKETCH_HERO_OFFSET)
    }

    /// Draw size: `w = clamp(round(W/9), 80, 220)`, `h = clamp(round(W/9*1.8), 90, 260)`
    pub fn draw_size(width: f32) -> Vec2 {
        let base = width / 9.0;
        Vec2::new(
            base.round().clamp(80.0, 220.0),
            (base * 1.8).round().clamp(90.0, 260.0),
        )
    }

    pub fn hurt(&mut self) {
        self.anim = HeroAnim::Hurt;
        self.anim_time = 0.0;
    }

    /// Register a hit; returns true when the hit limit is reached
    pub fn register_hit(&mut self, max_hits: u32) -> bool {
        self.hits += 1;
        if self.hits >= max_hits {
            self.anim = HeroAnim::Fall;
            self.anim_time = 0.0;
            true
        } else {
            self.hurt();
            false
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.anim_time += dt;
        if self.anim == HeroAnim::Hurt && self.anim_time > SKETCH_HURT_SECS {
            self.anim = HeroAnim::Idle;
            self.anim_time = 0.0;
        }
    }

    /// Which idle frame (0/1) to show at a session time
    pub fn idle_frame(elapsed_secs: f32) -> usize {
        ((elapsed_secs / SKETCH_IDLE_FRAME_SECS).floor() as i64).rem_euclid(2) as usize
    }
}

/// Runner-mode hero with vertical physics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerHero {
    pub pos: Vec2,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub on_ground: bool,
    pub anim: HeroAnim,
    pub anim_time: f32,
    pub frame: usize,
}

impl Default for RunnerHero {
    fn default() -> Self {
        Self {
            pos: Vec2::new(RUNNER_HERO_X, 0.0),
            vy: 0.0,
            width: 48.0,
            height: 64.0,
            on_ground: true,
            anim: HeroAnim::Idle,
            anim_time: 0.0,
            frame: 0,
        }
    }
}

impl RunnerHero {
    /// Sprite size for a viewport width: `clamp(floor(W/8), 40, 96)`
    pub fn sprite_size(width: f32) -> f32 {
        (width / 8.0).floor().clamp(40.0, 96.0)
    }

    /// Re-derive the collision box from the viewport width
    pub fn resize(&mut self, width: f32) {
        let draw = (Self::sprite_size(width) * RUNNER_SCALE).floor().max(24.0);
        self.width = (draw * 0.75).floor();
        self.height = draw;
    }

    /// Start a jump if grounded; returns whether it happened
    pub fn jump(&mut self) -> bool {
        if !self.on_ground {
            return false;
        }
        self.vy = RUNNER_JUMP_V;
        self.on_ground = false;
        self.anim = HeroAnim::Jump;
        self.anim_time = 0.0;
        true
    }

    /// Semi-implicit Euler under gravity, landing on `baseline`
    pub fn integrate(&mut self, dt: f32, baseline: f32) {
        self.anim_time += dt;
        self.vy += RUNNER_GRAVITY * dt;
        self.pos.y += self.vy * dt;
        if self.pos.y >= baseline {
            self.pos.y = baseline;
            self.vy = 0.0;
            self.on_ground = true;
        } else {
            self.on_ground = false;
        }
    }

    /// Advance hurt/jump/walk; `walk_frames` is 2 or 3 depending on sprites
    pub fn animate(&mut self, walk_frames: usize) {
        match self.anim {
            HeroAnim::Hurt => {
                if self.anim_time > RUNNER_HURT_SECS {
                    self.anim = if self.on_ground { HeroAnim::Walk } else { HeroAnim::Jump };
                    self.anim_time = 0.0;
                }
            }
            HeroAnim::Fall => {}
            _ if !self.on_ground => self.anim = HeroAnim::Jump,
            _ => {
                self.anim = HeroAnim::Walk;
                if self.anim_time > RUNNER_WALK_FRAME_SECS {
                    self.frame = (self.frame + 1) % walk_frames.max(1);
                    self.anim_time = 0.0;
                }
            }
        }
    }

    pub fn hurt(&mut self) {
        self.anim = HeroAnim::Hurt;
        self.anim_time = 0.0;
    }

    pub fn bounds(&self) -> super::collision::Aabb {
        super::collision::Aabb::new(self.pos.x, self.pos.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_then_land() {
        let mut hero = RunnerHero::default();
        let baseline = 300.0;
        hero.pos.y = baseline;
        assert!(hero.on_ground);

        assert!(hero.jump());
        assert_eq!(hero.vy, RUNNER_JUMP_V);
        assert!(!hero.on_ground);
        // Cannot double jump
        assert!(!hero.jump());

        let mut landed_at = None;
        for i in 0..200 {
            hero.integrate(1.0 / 60.0, baseline);
            if hero.on_ground {
                landed_at = Some(i);
                break;
            }
            assert!(hero.pos.y < baseline);
        }
        // Airtime ~ 2*600/1200 = 1s
        let frames = landed_at.expect("hero should land");
        assert!((55..=65).contains(&frames), "landed after {frames} frames");
        assert_eq!(hero.pos.y, baseline);
        assert_eq!(hero.vy, 0.0);
    }

    #[test]
    fn test_walk_frames_cycle() {
        let mut hero = RunnerHero::default();
        hero.anim = HeroAnim::Walk;
        hero.anim_time = 0.11;
        hero.animate(3);
        assert_eq!(hero.frame, 1);
        hero.anim_time = 0.11;
        hero.animate(3);
        hero.anim_time = 0.11;
        hero.animate(3);
        assert_eq!(hero.frame, 0);
    }

    #[test]
    fn test_hurt_recovers() {
        let mut hero = RunnerHero::default();
        hero.hurt();
        hero.anim_time = 0.51;
        hero.animate(2);
        assert_eq!(hero.anim, HeroAnim::Walk);
    }

    #[test]
    fn test_runner_resize() {
        let mut hero = RunnerHero::default();
        hero.resize(800.0);
        // floor(800/8)=100 -> 96 -> *1.1 = 105.6 -> 105
        assert_eq!(hero.height, 105.0);
        assert_eq!(hero.width, 78.0);
    }

    #[test]
    fn test_sketch_hits_to_fall() {
        let mut hero = SketchHero::default();
        assert!(!hero.register_hit(3));
        assert_eq!(hero.anim, HeroAnim::Hurt);
        assert!(!hero.register_hit(3));
        assert!(hero.register_hit(3));
        assert_eq!(hero.anim, HeroAnim::Fall);
    }

    #[test]
    fn test_sketch_draw_size_clamps() {
        assert_eq!(SketchHero::draw_size(360.0), Vec2::new(80.0, 90.0));
        assert_eq!(SketchHero::draw_size(3600.0), Vec2::new(220.0, 260.0));
    }

    #[test]
    fn test_idle_frame_alternates() {
        assert_eq!(SketchHero::idle_frame(0.2), 0);
        assert_eq!(SketchHero::idle_frame(0.7), 1);
        assert_eq!(SketchHero::idle_frame(1.2), 0);
    }
}
