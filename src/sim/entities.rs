//! Entity types held in the game stores
//!
//! All hp/durability mutation goes through `apply_damage`, which saturates
//! at zero and reports destruction exactly once.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;

/// Falling hazard types (declaration order is the spawn-table order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DangerKind {
    BlockPlank,
    Slime,
    Saw,
    Weight,
    SawTile,
    Rock,
    Fireball,
    Chain,
    BrickGrey,
    BrickBrown,
    BrickBrownDiag,
    Spikes,
    BlockPlanks,
    Hasina,
    Joy,
    Kader,
    Murgi,
}

/// Static per-type tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DangerProps {
    pub mass: f32,
    pub hp: f32,
    pub size: f32,
    pub base_damage: f32,
}

const fn props(mass: f32, hp: f32, size: f32, base_damage: f32) -> DangerProps {
    DangerProps {
        mass,
        hp,
        size,
        base_damage,
    }
}

impl DangerKind {
    pub const ALL: [DangerKind; 17] = [
        DangerKind::BlockPlank,
        DangerKind::Slime,
        DangerKind::Saw,
        DangerKind::Weight,
        DangerKind::SawTile,
        DangerKind::Rock,
        DangerKind::Fireball,
        DangerKind::Chain,
        DangerKind::BrickGrey,
        DangerKind::BrickBrown,
        DangerKind::BrickBrownDiag,
        DangerKind::Spikes,
        DangerKind::BlockPlanks,
        DangerKind::Hasina,
        DangerKind::Joy,
        DangerKind::Kader,
        DangerKind::Murgi,
    ];

    pub fn props(self) -> DangerProps {
        match self {
            DangerKind::BlockPlank => props(36.0, 19.0, 1.04, 3.0),
            DangerKind::Slime => props(25.0, 13.0, 1.04, 2.0),
            DangerKind::Saw => props(31.0, 18.0, 1.03, 3.0),
            DangerKind::Weight => props(46.0, 26.0, 1.0, 5.0),
            DangerKind::SawTile => props(24.0, 18.0, 1.0, 2.0),
            DangerKind::Rock => props(45.0, 20.0, 1.02, 3.0),
            DangerKind::Fireball => props(21.0, 20.0, 1.0, 3.0),
            DangerKind::Chain => props(37.0, 16.0, 1.0, 5.0),
            DangerKind::BrickGrey => props(27.0, 20.0, 1.06, 2.0),
            DangerKind::BrickBrown => props(25.0, 18.0, 1.06, 2.0),
            DangerKind::BrickBrownDiag => props(25.0, 18.0, 1.07, 3.0),
            DangerKind::Spikes => props(28.0, 12.0, 1.03, 4.0),
            DangerKind::BlockPlanks => props(30.0, 18.0, 1.03, 4.0),
            DangerKind::Hasina => props(25.0, 15.0, 1.5, 4.0),
            DangerKind::Joy => props(23.0, 17.0, 1.2, 3.0),
            DangerKind::Kader => props(23.0, 19.0, 1.3, 3.0),
            DangerKind::Murgi => props(22.0, 16.0, 1.4, 3.0),
        }
    }

    /// Asset-catalog key
    pub fn key(self) -> &'static str {
        match self {
            DangerKind::BlockPlank => "block_plank",
            DangerKind::Slime => "slime",
            DangerKind::Saw => "saw",
            DangerKind::Weight => "weight",
            DangerKind::SawTile => "saw_tile",
            DangerKind::Rock => "rock",
            DangerKind::Fireball => "fireball",
            DangerKind::Chain => "chain",
            DangerKind::BrickGrey => "brick_grey",
            DangerKind::BrickBrown => "brick_brown",
            DangerKind::BrickBrownDiag => "brick_brown_diag",
            DangerKind::Spikes => "spikes",
            DangerKind::BlockPlanks => "block_planks",
            DangerKind::Hasina => "hasina",
            DangerKind::Joy => "joy",
            DangerKind::Kader => "kader",
            DangerKind::Murgi => "murgi",
        }
    }

    /// Heavy types get a larger base weight and difficulty boost
    pub fn is_heavy(self) -> bool {
        matches!(
            self,
            DangerKind::Weight | DangerKind::Rock | DangerKind::BrickGrey | DangerKind::Chain
        )
    }
}

/// Saturating damage: `max(0, value - amount)`; true only on the transition to zero
#[inline]
pub fn apply_damage(value: &mut f32, amount: f32) -> bool {
    if *value <= 0.0 {
        return false;
    }
    *value = (*value - amount.max(0.0)).max(0.0);
    *value <= 0.0
}

/// A falling hazard (sketch mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Danger {
    pub id: u32,
    pub kind: DangerKind,
    /// Top-left corner
    pub pos: Vec2,
    /// Per-frame-at-60Hz units (integrated as `pos += vel * 60 * dt`)
    pub vel: Vec2,
    pub rotation: f32,
    pub angular_vel: f32,
    pub mass: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub base_damage: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub clicked_times: u32,
}

impl Danger {
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.width, self.height) * 0.5
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    /// Contact radius for hazard-hazard tests
    pub fn contact_radius(&self) -> f32 {
        self.width.max(self.height) / 2.0
    }

    /// Half-diagonal, used against shield strokes
    pub fn half_diagonal(&self) -> f32 {
        self.width.hypot(self.height) / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.height
    }

    /// Returns true when this hit destroyed the hazard
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        apply_damage(&mut self.hp, amount)
    }

    /// Fraction of hp lost, 0..1
    pub fn damage_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            return 0.0;
        }
        (1.0 - (self.hp / self.max_hp).max(0.0)).clamp(0.0, 1.0)
    }

    /// Damage dealt by a tap: `max(1, round(maxHp / 6))`
    pub fn click_damage(&self) -> f32 {
        (self.max_hp / 6.0).round().max(1.0)
    }
}

/// A player-drawn shield stroke
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shield {
    pub id: u32,
    pub points: Vec<Vec2>,
    pub thickness: f32,
    pub durability: f32,
    pub max_durability: f32,
    pub anchored: bool,
    /// Session clock (ms) at creation
    pub created_at: f64,
}

impl Shield {
    /// Needs at least one segment to block or be stroked
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2
    }

    /// Takes part in hazard collisions
    pub fn is_collidable(&self) -> bool {
        self.anchored && self.durability > 0.0 && self.is_valid()
    }

    pub fn apply_damage(&mut self, amount: f32) -> bool {
        apply_damage(&mut self.durability, amount)
    }

    pub fn durability_ratio(&self) -> f32 {
        if self.max_durability <= 0.0 {
            0.0
        } else {
            (self.durability / self.max_durability).clamp(0.0, 1.0)
        }
    }
}

/// Ground obstacle (runner mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Asset-catalog key
    pub kind: String,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub big: bool,
    /// Horizontal velocity (px/s, negative = toward the hero)
    pub vx: f32,
}

impl Obstacle {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.width
    }

    /// Health cost on contact
    pub fn damage(&self) -> f32 {
        if self.big { 34.0 } else { 20.0 }
    }
}

/// Collectible coin (runner mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub collected: bool,
    /// Bob phase while live, pop-animation clock once collected
    pub anim_time: f32,
}

impl Coin {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos.x, self.pos.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn danger(hp: f32) -> Danger {
        Danger {
            id: 1,
            kind: DangerKind::Rock,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            angular_vel: 0.0,
            mass: 45.0,
            hp,
            max_hp: hp,
            base_damage: 3.0,
            width: 30.0,
            height: 20.0,
            clicked_times: 0,
        }
    }

    #[test]
    fn test_props_table() {
        let w = DangerKind::Weight.props();
        assert_eq!(w.mass, 46.0);
        assert_eq!(w.hp, 26.0);
        assert_eq!(w.base_damage, 5.0);
        assert_eq!(DangerKind::ALL.len(), 17);
        assert_eq!(DangerKind::ALL.iter().filter(|k| k.is_heavy()).count(), 4);
    }

    #[test]
    fn test_two_hits_destroy_once() {
        let mut d = danger(10.0);
        assert!(!d.apply_damage(6.0));
        assert!((d.hp - 4.0).abs() < 0.001);
        assert!(d.apply_damage(6.0));
        assert_eq!(d.hp, 0.0);
        // Already destroyed: no second destruction event
        assert!(!d.apply_damage(6.0));
    }

    #[test]
    fn test_click_damage() {
        assert_eq!(danger(10.0).click_damage(), 2.0);
        assert_eq!(danger(3.0).click_damage(), 1.0);
        assert_eq!(danger(26.0).click_damage(), 4.0);
    }

    #[test]
    fn test_shield_validity() {
        let s = Shield {
            id: 1,
            points: vec![Vec2::ZERO],
            thickness: 5.0,
            durability: 100.0,
            max_durability: 100.0,
            anchored: true,
            created_at: 0.0,
        };
        assert!(!s.is_valid());
        assert!(!s.is_collidable());
    }

    proptest! {
        #[test]
        fn prop_damage_saturates(old in 0.0f32..1000.0, dmg in 0.0f32..1000.0) {
            let mut v = old;
            let destroyed = apply_damage(&mut v, dmg);
            prop_assert!(v >= 0.0);
            prop_assert!((v - (old - dmg).max(0.0)).abs() < 0.001);
            prop_assert_eq!(destroyed, old > 0.0 && v == 0.0);
        }
    }
}
