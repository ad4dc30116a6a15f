//! Integration and contact response
//!
//! Hazard velocities are per-frame-at-60Hz units, so positions advance by
//! `vel * 60 * dt`. Everything else is in px/s.

use glam::Vec2;
use rand::Rng;

use super::collision::{circle_contact, polyline_first_hit};
use super::entities::{Danger, Shield};
use super::particles::jitter;

pub mod consts {
    /// Hazard gravity constant
    pub const GRAVITY: f32 = 11.0;
    /// Hazard-hazard restitution
    pub const RESTITUTION: f32 = 0.35;
    /// Fraction of overlap corrected per contact
    pub const CORRECTION_PERCENT: f32 = 0.12;
    pub const MIN_CORRECTION: f32 = 0.01;
    /// Vertical velocity multiplier when a hazard survives a shield hit
    pub const SHIELD_BOUNCE: f32 = -0.36;
    /// Minimum impact factor for shield damage
    pub const MIN_IMPACT_FACTOR: f32 = 0.18;
    /// Share of shield damage reflected back into the hazard
    pub const HAZARD_RECOIL_SHARE: f32 = 0.07;
    /// Sketch particle downward acceleration (`11 * 0.02 * 60`)
    pub const SKETCH_PARTICLE_GRAVITY: f32 = GRAVITY * 0.02 * 60.0;
    /// Runner particle downward acceleration (`1200 * 0.001`)
    pub const RUNNER_PARTICLE_GRAVITY: f32 = 1200.0 * 0.001;
}

use consts::*;

/// Advance one hazard by `dt` seconds
pub fn integrate_danger(d: &mut Danger, dt: f32) {
    d.vel.y += GRAVITY * d.mass * dt * 0.01;
    d.pos += d.vel * 60.0 * dt;
    d.rotation += d.angular_vel * dt;
}

/// Impulse response between two hazards; returns whether they touched
///
/// Separating or coincident pairs are left alone.
pub fn resolve_danger_pair(a: &mut Danger, b: &mut Danger) -> bool {
    let contact = circle_contact(a.center(), a.contact_radius(), b.center(), b.contact_radius());
    if !contact.hit {
        return false;
    }
    let n = contact.normal;
    let rel = (b.vel - a.vel).dot(n);
    if rel > 0.0 {
        return false;
    }

    let inv_a = 1.0 / a.mass;
    let inv_b = 1.0 / b.mass;
    let j = -(1.0 + RESTITUTION) * rel / (inv_a + inv_b);
    let impulse = n * j;
    a.vel -= impulse * inv_a;
    b.vel += impulse * inv_b;

    let correction = contact.penetration.max(MIN_CORRECTION) * CORRECTION_PERCENT;
    a.pos -= n * correction * inv_a;
    b.pos += n * correction * inv_b;
    true
}

/// Resolve every hazard against every other, in store order
pub fn resolve_danger_contacts(dangers: &mut [Danger]) -> usize {
    let mut contacts = 0;
    for i in 0..dangers.len() {
        for j in (i + 1)..dangers.len() {
            let (head, tail) = dangers.split_at_mut(j);
            if resolve_danger_pair(&mut head[i], &mut tail[0]) {
                contacts += 1;
            }
        }
    }
    contacts
}

/// What a shield contact did to a hazard
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShieldImpact {
    /// The hazard broke on the shield
    Destroyed { shield: usize, center: Vec2 },
    /// The hazard bounced off
    Bounced { shield: usize, center: Vec2 },
}

/// Damage dealt to a shield by a hazard: `baseDamage * max(0.18, |vy| * mass * 0.6)`
pub fn shield_damage(d: &Danger) -> f32 {
    let impact = d.vel.y.abs() * d.mass;
    d.base_damage * MIN_IMPACT_FACTOR.max(impact * 0.6)
}

/// Test a hazard against the shields; the first shield with a segment in reach wins
///
/// Applies damage to both sides. A surviving hazard is bounced with a
/// little velocity jitter.
pub fn collide_with_shields<R: Rng + ?Sized>(
    d: &mut Danger,
    shields: &mut [Shield],
    rng: &mut R,
) -> Option<ShieldImpact> {
    let center = d.center();
    let reach = d.half_diagonal();
    let (index, shield) = shields.iter_mut().enumerate().find(|(_, s)| {
        s.is_collidable() && polyline_first_hit(center, &s.points, reach + s.thickness / 2.0).is_some()
    })?;

    let dmg = shield_damage(d);
    shield.apply_damage(dmg);
    if d.apply_damage(dmg * HAZARD_RECOIL_SHARE) || d.hp <= 0.0 {
        return Some(ShieldImpact::Destroyed { shield: index, center });
    }

    d.vel.y *= SHIELD_BOUNCE;
    d.vel.x += jitter(rng, 0.6);
    d.angular_vel += jitter(rng, 0.6);
    Some(ShieldImpact::Bounced { shield: index, center })
}
