//! Sketch Shield session
//!
//! Hazards fall on a grounded hero. The player draws anchored shield
//! strokes to deflect them and taps hazards to chip their health. Three
//! hazards reaching the hero end the round.
//!
//! Per frame:
//! 1. spawn a batch when the decaying timer fires
//! 2. integrate hazards and resolve hazard-hazard contacts
//! 3. per hazard (newest first): shields, then ground/hero
//! 4. break shields with no durability left into shards
//! 5. advance particles, shards, ambient weather and the hero

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::hero_box_hit;
use super::entities::{Danger, Shield};
use super::environment::Environment;
use super::gesture::{
    HeroZone, StrokeBuilder, StrokeEvent, StrokeOutcome, StrokeSink, consts::ZONE_FEEDBACK_PARTICLES,
    process_completed_path,
};
use super::hero::{HeroAnim, SketchHero, consts::SKETCH_HERO_HALF};
use super::ids::IdAllocator;
use super::input::InputEvent;
use super::particles::{
    Particle, enforce_cap, jitter, path_to_shards, spawn_burst, spawn_shards, update_particles,
};
use super::physics::{
    ShieldImpact, collide_with_shields, consts::SKETCH_PARTICLE_GRAVITY, integrate_danger,
    resolve_danger_contacts,
};
use super::spawn::{SpawnTimer, batch_size, difficulty, dynamic_max, spawn_danger};
use super::weather::AmbientWeather;
use crate::consts::OFFSCREEN_MARGIN;
use crate::error::FrameError;
use crate::frame::{Game, RoundSummary, RoundTally};
use crate::renderer::color::palette;
use crate::renderer::compositor::{
    BackgroundInput, Placeholder, draw_background, draw_ground, draw_hud, draw_media_or_placeholder,
    draw_particles, draw_weather, env_media_key,
};
use crate::renderer::parallax::tile_positions;
use crate::renderer::{AssetCatalog, Layer, MediaSource, Quad, Rgba, Surface};
use crate::scenery::{SceneryCache, SceneryKey};
use crate::settings::Settings;
use crate::Viewport;

pub mod consts {
    pub const MAX_HITS: u32 = 3;

    pub const PARTICLE_CAP: usize = 1500;
    pub const SHARD_CAP: usize = 1200;
    pub const HAZARD_CAP: usize = 30;

    /// Ground band height: `clamp(H * 0.12, 60, 140)`
    pub const GROUND_FRACTION: f32 = 0.12;
    pub const GROUND_MIN: f32 = 60.0;
    pub const GROUND_MAX: f32 = 140.0;
    pub const GRASS_BAND: f32 = 10.0;

    pub const TAP_PARTICLES: u32 = 10;
    pub const TAP_KILL_PARTICLES: u32 = 20;
    pub const TAP_KILL_SHARDS: u32 = 10;
    /// Upward kick on a tapped hazard (per-frame units)
    pub const TAP_LIFT: f32 = 1.8;

    pub const SHIELD_KILL_PARTICLES: u32 = 14;
    pub const SHIELD_KILL_SHARDS: u32 = 8;
    pub const BOUNCE_PARTICLES: u32 = 6;

    pub const HERO_HIT_PARTICLES: u32 = 22;
    pub const HERO_HIT_SHARDS: u32 = 10;
    pub const GROUND_PARTICLES: u32 = 18;
    pub const GROUND_SHARDS: u32 = 8;

    pub const DAMAGE_SHADE_THRESHOLD: f32 = 0.12;
    pub const SHIELD_FRESH_RATIO: f32 = 0.45;
    pub const PREVIEW_WIDTH: f32 = 3.0;
}

use consts::*;

/// Top of the ground band for a viewport height
pub fn ground_top_for(height: f32) -> f32 {
    height - (height * GROUND_FRACTION).clamp(GROUND_MIN, GROUND_MAX)
}

/// One Sketch Shield round
pub struct SketchGame {
    env: Environment,
    settings: Settings,
    seed: u64,
    rng: Pcg32,
    ids: IdAllocator,
    pub dangers: Vec<Danger>,
    pub shields: Vec<Shield>,
    pub particles: Vec<Particle>,
    pub shards: Vec<Particle>,
    pub ambient: AmbientWeather,
    pub hero: SketchHero,
    stroke: StrokeBuilder,
    spawn: SpawnTimer,
    start_ms: f64,
    elapsed: f32,
    terminal: bool,
    scenery: SceneryCache,
}

impl SketchGame {
    pub fn new(env: Environment, settings: Settings, seed: u64) -> Self {
        Self {
            env,
            settings,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            ids: IdAllocator::new(),
            dangers: Vec::new(),
            shields: Vec::new(),
            particles: Vec::new(),
            shards: Vec::new(),
            ambient: AmbientWeather::default(),
            hero: SketchHero::default(),
            stroke: StrokeBuilder::new(),
            spawn: SpawnTimer::sketch(0.0),
            start_ms: 0.0,
            elapsed: 0.0,
            terminal: false,
            scenery: SceneryCache::default(),
        }
    }

    pub fn env(&self) -> Environment {
        self.env
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn spawn_timer(&self) -> &SpawnTimer {
        &self.spawn
    }

    /// Points of the stroke being drawn
    pub fn stroke_preview(&self) -> &[Vec2] {
        self.stroke.preview()
    }

    fn zone(view: Viewport) -> HeroZone {
        HeroZone::new(SketchHero::anchor(view.width, ground_top_for(view.height)))
    }

    fn burst(&mut self, at: Vec2, count: u32) {
        let scale = self.settings.particle_scale();
        spawn_burst(&mut self.particles, &mut self.rng, at, count, scale);
    }

    /// Damage the topmost hazard under `p`; returns its id when one was hit
    pub fn tap(&mut self, p: Vec2) -> Option<u32> {
        let index = self.dangers.iter().rposition(|d| d.bounds().contains(p))?;
        let d = &mut self.dangers[index];
        let id = d.id;
        let center = d.center();
        d.clicked_times += 1;
        d.vel.y -= TAP_LIFT;
        d.angular_vel += jitter(&mut self.rng, 1.0);
        let destroyed = d.apply_damage(d.click_damage());

        self.burst(center, TAP_PARTICLES);
        if destroyed {
            self.dangers.remove(index);
            self.burst(center, TAP_KILL_PARTICLES);
            spawn_shards(&mut self.shards, &mut self.rng, center, TAP_KILL_SHARDS);
        }
        Some(id)
    }

    fn finish_stroke(&mut self, path: Vec<Vec2>, blocked: bool, view: Viewport) -> StrokeOutcome {
        let zone = Self::zone(view);
        if blocked {
            self.burst(zone.center, ZONE_FEEDBACK_PARTICLES);
        }
        let particle_scale = self.settings.particle_scale();
        process_completed_path(
            path,
            blocked,
            ground_top_for(view.height),
            &zone,
            &mut self.ids,
            self.start_ms + self.elapsed as f64 * 1000.0,
            &mut self.rng,
            StrokeSink {
                shields: &mut self.shields,
                shards: &mut self.shards,
                particles: &mut self.particles,
                particle_scale,
            },
        )
    }

    fn spawn_batch(&mut self, now_ms: f64, view_width: f32) {
        let d = difficulty(self.elapsed);
        let allowance = dynamic_max(self.elapsed);
        let mut spawned = 0;
        for _ in 0..batch_size(d) {
            if self.dangers.len() >= allowance {
                break;
            }
            let danger = spawn_danger(&mut self.rng, &mut self.ids, view_width, d);
            self.dangers.push(danger);
            spawned += 1;
        }
        self.spawn.fire(now_ms);
        log::debug!(
            "Spawned {} hazards (difficulty {:.2}, next in {:.0} ms)",
            spawned,
            d,
            self.spawn.interval
        );
    }

    /// Shields, then ground and hero, newest hazard first
    fn resolve_hazards(&mut self, ground_top: f32, view: Viewport) {
        let hero = SketchHero::anchor(view.width, ground_top);
        let mut i = self.dangers.len();
        while i > 0 {
            i -= 1;
            match collide_with_shields(&mut self.dangers[i], &mut self.shields, &mut self.rng) {
                Some(ShieldImpact::Destroyed { center, .. }) => {
                    self.dangers.remove(i);
                    self.burst(center, SHIELD_KILL_PARTICLES);
                    spawn_shards(&mut self.shards, &mut self.rng, center, SHIELD_KILL_SHARDS);
                    continue;
                }
                Some(ShieldImpact::Bounced { center, .. }) => self.burst(center, BOUNCE_PARTICLES),
                None => {}
            }

            let d = &self.dangers[i];
            let center = d.center();
            if d.bottom() >= ground_top {
                let hit_hero = !self.terminal && hero_box_hit(&d.bounds(), hero, SKETCH_HERO_HALF);
                self.dangers.remove(i);
                if hit_hero {
                    self.burst(center, HERO_HIT_PARTICLES);
                    spawn_shards(
                        &mut self.shards,
                        &mut self.rng,
                        Vec2::new(center.x, ground_top - 6.0),
                        HERO_HIT_SHARDS,
                    );
                    if self.hero.register_hit(MAX_HITS) {
                        self.terminal = true;
                        log::info!("Hero down after {} hits at {:.1}s", self.hero.hits, self.elapsed);
                    }
                } else {
                    self.burst(Vec2::new(center.x, ground_top), GROUND_PARTICLES);
                    spawn_shards(
                        &mut self.shards,
                        &mut self.rng,
                        Vec2::new(center.x, ground_top - 8.0),
                        GROUND_SHARDS,
                    );
                }
                continue;
            }

            if d.pos.x + d.width < -OFFSCREEN_MARGIN || d.pos.x > view.width + OFFSCREEN_MARGIN {
                self.dangers.remove(i);
            }
        }
    }

    /// Shields with no durability left turn into shards along their path
    fn break_shields(&mut self) {
        let (broken, kept): (Vec<Shield>, Vec<Shield>) =
            std::mem::take(&mut self.shields).into_iter().partition(|s| s.durability <= 0.0);
        self.shields = kept;
        for shield in &broken {
            path_to_shards(&mut self.shards, &mut self.rng, &shield.points, shield.thickness);
        }
    }

    fn draw_ground<S: Surface>(
        &mut self,
        surface: &mut S,
        assets: &AssetCatalog<S::Media>,
        ground_top: f32,
        view: Viewport,
    ) -> Result<(), FrameError> {
        let v = Vec2::new(view.width, view.height);
        if let Some(tile) = assets.ready(&env_media_key("ground", self.env)) {
            surface.begin_layer(Layer::Ground);
            let band = view.height - ground_top;
            let tile_w = tile
                .natural_size()
                .filter(|s| s.y > 0.0)
                .map_or(band, |s| s.x * band / s.y)
                .max(1.0);
            for x in tile_positions(0.0, tile_w, view.width) {
                surface.draw_media(tile, &Quad::axis(x, ground_top, tile_w, band), 1.0)?;
            }
            return Ok(());
        }
        let key = SceneryKey::new(
            self.env,
            view.width,
            view.height,
            ground_top,
            GRASS_BAND,
            self.settings.quality,
        )
        .ground_only();
        let layers = self.scenery.get(key);
        draw_ground(surface, &layers.ground, 0.0, ground_top, v)?;
        Ok(())
    }

    fn draw_shields<S: Surface>(&self, surface: &mut S, view: Viewport) -> Result<(), FrameError> {
        surface.begin_layer(Layer::Pickups);
        for shield in self.shields.iter().filter(|s| s.is_valid()) {
            let fresh = shield.durability_ratio() > SHIELD_FRESH_RATIO;
            let (body, core) = if fresh {
                (palette::SHIELD_FRESH, palette::SHIELD_CORE_FRESH)
            } else {
                (palette::SHIELD_WORN, palette::SHIELD_CORE_WORN)
            };
            surface.stroke_polyline(&shield.points, shield.thickness + 4.0, palette::SHADOW)?;
            surface.stroke_polyline(&shield.points, shield.thickness, body)?;
            surface.stroke_polyline(&shield.points, (shield.thickness * 0.3).max(1.0), core)?;
        }

        let preview = self.stroke.preview();
        if preview.len() >= 2 {
            surface.stroke_polyline(preview, PREVIEW_WIDTH, palette::STROKE_PREVIEW)?;
        }

        let zone = Self::zone(view);
        surface.fill_ellipse(zone.center, zone.radius, zone.radius, palette::HERO_ZONE)?;
        Ok(())
    }

    fn draw_hero<S: Surface>(
        &self,
        surface: &mut S,
        assets: &AssetCatalog<S::Media>,
        ground_top: f32,
        view: Viewport,
    ) -> Result<(), FrameError> {
        surface.begin_layer(Layer::Hero);
        let size = SketchHero::draw_size(view.width);
        let quad = Quad::rotated(SketchHero::anchor(view.width, ground_top), size, 0.0);

        match self.hero.anim {
            HeroAnim::Hurt if assets.ready("hero_hurt").is_some() => {
                draw_media_or_placeholder(surface, assets, &["hero_hurt"], &quad, Placeholder::None)?;
                surface.fill_quad(&quad, palette::HURT_TINT)?;
                return Ok(());
            }
            HeroAnim::Fall if assets.ready("hero_fall").is_some() => {
                draw_media_or_placeholder(surface, assets, &["hero_fall"], &quad, Placeholder::None)?;
                return Ok(());
            }
            _ => {}
        }

        let idle = if SketchHero::idle_frame(self.elapsed) == 0 { "hero_idle" } else { "hero_idle2" };
        let keys = ["hero_video", "hero_gif", idle, "hero_idle"];
        if !draw_media_or_placeholder(surface, assets, &keys, &quad, Placeholder::None)? {
            let r = size.min_element() / 4.0;
            surface.fill_ellipse(quad.center, r, r, Rgba::BLACK)?;
        }
        Ok(())
    }
}

impl Game for SketchGame {
    fn start(&mut self, now_ms: f64, view: Viewport) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.ids.reset();
        self.dangers.clear();
        self.shields.clear();
        self.particles.clear();
        self.shards.clear();
        self.stroke.cancel();
        self.hero = SketchHero::default();
        self.spawn = SpawnTimer::sketch(now_ms);
        self.start_ms = now_ms;
        self.elapsed = 0.0;
        self.terminal = false;

        let profile = self.scenery.registry().get(self.env).weather;
        let kind = profile.ambient.filter(|_| self.settings.weather);
        self.ambient = AmbientWeather::new(kind, Vec2::new(view.width, view.height), &mut self.rng);
        log::info!(
            "Sketch round started in '{}' ({:?}, ambient {:?})",
            self.env.key(),
            self.settings.quality,
            kind
        );
    }

    fn handle_input(&mut self, event: InputEvent, view: Viewport) {
        if self.terminal {
            return;
        }
        let zone = Self::zone(view);
        let completed = match event {
            InputEvent::Tap(p) => {
                self.tap(p);
                None
            }
            InputEvent::PointerDown(p) => {
                if let StrokeEvent::Rejected(at) = self.stroke.press(p, &zone) {
                    self.burst(at, ZONE_FEEDBACK_PARTICLES);
                }
                None
            }
            InputEvent::PointerMove(p) => match self.stroke.move_to(p, &zone) {
                StrokeEvent::Completed { path, blocked } => Some((path, blocked)),
                _ => None,
            },
            InputEvent::PointerUp => match self.stroke.release() {
                StrokeEvent::Completed { path, blocked } => Some((path, blocked)),
                _ => None,
            },
            InputEvent::Jump => None,
        };
        if let Some((path, blocked)) = completed {
            self.finish_stroke(path, blocked, view);
        }
    }

    fn update(&mut self, now_ms: f64, dt: f32, view: Viewport) -> Result<(), FrameError> {
        if !now_ms.is_finite() || !dt.is_finite() {
            return Err(FrameError::Simulation {
                context: "sketch update",
                detail: format!("non-finite clock (now {}, dt {})", now_ms, dt),
            });
        }
        if self.terminal {
            return Ok(());
        }
        self.elapsed = ((now_ms - self.start_ms) / 1000.0).max(0.0) as f32;
        let ground_top = ground_top_for(view.height);

        if self.spawn.due(now_ms) {
            self.spawn_batch(now_ms, view.width);
        }

        for d in &mut self.dangers {
            integrate_danger(d, dt);
        }
        resolve_danger_contacts(&mut self.dangers);
        self.resolve_hazards(ground_top, view);
        self.break_shields();

        update_particles(&mut self.particles, dt, SKETCH_PARTICLE_GRAVITY);
        update_particles(&mut self.shards, dt, SKETCH_PARTICLE_GRAVITY);
        self.ambient.update(dt, Vec2::new(view.width, view.height), &mut self.rng);
        self.hero.update(dt);
        Ok(())
    }

    fn render<S: Surface>(
        &mut self,
        surface: &mut S,
        assets: &AssetCatalog<S::Media>,
        view: Viewport,
    ) -> Result<(), FrameError> {
        let v = Vec2::new(view.width, view.height);
        let ground_top = ground_top_for(view.height);

        draw_background(
            surface,
            assets,
            &BackgroundInput {
                env: self.env,
                sky: None,
                scroll: 0.0,
                view: v,
            },
        )?;

        surface.begin_layer(Layer::WeatherTint);
        draw_weather(surface, &self.ambient.particles)?;

        self.draw_ground(surface, assets, ground_top, view)?;

        surface.begin_layer(Layer::Hazards);
        for d in &self.dangers {
            let quad = Quad::rotated(d.center(), Vec2::new(d.width, d.height), d.rotation);
            draw_media_or_placeholder(
                surface,
                assets,
                &[d.kind.key()],
                &quad,
                Placeholder::Rect(palette::DANGER_PLACEHOLDER),
            )?;
            let ratio = d.damage_ratio();
            if ratio > DAMAGE_SHADE_THRESHOLD {
                surface.fill_quad(&quad, Rgba::BLACK.alpha(0.06 + ratio * 0.16))?;
            }
        }

        self.draw_shields(surface, view)?;

        surface.begin_layer(Layer::Particles);
        draw_particles(surface, &self.shards)?;
        draw_particles(surface, &self.particles)?;

        self.draw_hero(surface, assets, ground_top, view)?;

        if self.settings.show_hud {
            draw_hud(
                surface,
                &[
                    format!("Score: {}", self.score()),
                    format!("Hits: {}/{}", self.hero.hits, MAX_HITS),
                ],
            )?;
        }
        Ok(())
    }

    fn enforce_caps(&mut self) -> usize {
        let quality = self.settings.quality;
        enforce_cap(&mut self.particles, quality.scale_cap(PARTICLE_CAP))
            + enforce_cap(&mut self.shards, quality.scale_cap(SHARD_CAP))
            + enforce_cap(&mut self.dangers, HAZARD_CAP)
    }

    fn elapsed_secs(&self) -> f32 {
        self.elapsed
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }

    fn summary(&self) -> RoundSummary {
        RoundSummary {
            score: self.score(),
            tally: RoundTally::Hits(self.hero.hits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{RecordingSurface, StaticMedia};
    use crate::renderer::surface::DrawCommand;
    use crate::settings::QualityPreset;
    use crate::sim::entities::DangerKind;

    fn view() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn game() -> SketchGame {
        let mut g = SketchGame::new(Environment::Meadow, Settings::default(), 7);
        g.start(0.0, view());
        g
    }

    fn danger(id: u32, pos: Vec2, hp: f32) -> Danger {
        Danger {
            id,
            kind: DangerKind::Rock,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            angular_vel: 0.0,
            mass: 1.0,
            hp,
            max_hp: hp,
            base_damage: 3.0,
            width: 20.0,
            height: 20.0,
            clicked_times: 0,
        }
    }

    #[test]
    fn test_ground_top() {
        assert!((ground_top_for(600.0) - 528.0).abs() < 0.001);
        assert!((ground_top_for(300.0) - 240.0).abs() < 0.001);
        assert!((ground_top_for(2000.0) - 1860.0).abs() < 0.001);
    }

    #[test]
    fn test_tap_hits_topmost_only() {
        let mut g = game();
        g.dangers.push(danger(1, Vec2::new(100.0, 100.0), 60.0));
        g.dangers.push(danger(2, Vec2::new(105.0, 105.0), 60.0));
        assert_eq!(g.tap(Vec2::new(110.0, 110.0)), Some(2));
        assert!((g.dangers[1].hp - 50.0).abs() < 0.001);
        assert!((g.dangers[0].hp - 60.0).abs() < 0.001);
        assert_eq!(g.dangers[1].clicked_times, 1);
        assert!(g.dangers[1].vel.y < 0.0);
        assert_eq!(g.tap(Vec2::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_tap_destroys_once() {
        // hp 10 takes taps of max(1, round(10/6)) = 2
        let mut g = game();
        g.dangers.push(danger(1, Vec2::new(100.0, 100.0), 10.0));
        for _ in 0..4 {
            g.tap(Vec2::new(110.0, 110.0));
        }
        assert!((g.dangers[0].hp - 2.0).abs() < 0.001);
        let shards_before = g.shards.len();
        g.tap(Vec2::new(110.0, 110.0));
        assert!(g.dangers.is_empty());
        assert_eq!(g.shards.len() - shards_before, TAP_KILL_SHARDS as usize);
        assert_eq!(g.tap(Vec2::new(110.0, 110.0)), None);
    }

    #[test]
    fn test_hazard_destroyed_after_two_shield_hits() {
        // hp 10, two hits of 6: 4 left, then removed with effects once
        let mut d = danger(1, Vec2::ZERO, 10.0);
        assert!(!d.apply_damage(6.0));
        assert!((d.hp - 4.0).abs() < 0.001);
        assert!(d.apply_damage(6.0));
        assert_eq!(d.hp, 0.0);
        assert!(!d.apply_damage(6.0));
    }

    #[test]
    fn test_horizontal_stroke_becomes_shield() {
        let mut g = game();
        let gt = ground_top_for(600.0);
        g.handle_input(InputEvent::PointerDown(Vec2::new(50.0, gt)), view());
        for x in [100.0, 150.0, 200.0, 250.0] {
            g.handle_input(InputEvent::PointerMove(Vec2::new(x, gt)), view());
        }
        assert_eq!(g.stroke_preview().len(), 5);
        g.handle_input(InputEvent::PointerUp, view());
        assert_eq!(g.shields.len(), 1);
        let s = &g.shields[0];
        assert!((s.thickness - (4.0 + 200.0 / 28.0)).abs() < 0.01);
        assert_eq!(s.durability, 520.0);
        assert!(g.stroke_preview().is_empty());
    }

    #[test]
    fn test_press_in_zone_is_refused() {
        let mut g = game();
        let hero = SketchHero::anchor(800.0, ground_top_for(600.0));
        g.handle_input(InputEvent::PointerDown(hero), view());
        g.handle_input(InputEvent::PointerMove(hero + Vec2::new(100.0, 0.0)), view());
        g.handle_input(InputEvent::PointerUp, view());
        assert!(g.shields.is_empty());
        assert!(!g.particles.is_empty());
    }

    #[test]
    fn test_anchored_stroke_cut_by_zone_shatters() {
        let mut g = game();
        let gt = ground_top_for(600.0);
        let hero = SketchHero::anchor(800.0, gt);
        g.handle_input(InputEvent::PointerDown(Vec2::new(200.0, gt)), view());
        g.handle_input(InputEvent::PointerMove(Vec2::new(260.0, gt)), view());
        g.handle_input(InputEvent::PointerMove(hero), view());
        assert!(g.shields.is_empty());
        assert!(!g.shards.is_empty());
        assert!(g.stroke_preview().is_empty());
        // Nothing left to complete on release
        g.handle_input(InputEvent::PointerUp, view());
        assert!(g.shields.is_empty());
    }

    #[test]
    fn test_three_hero_hits_end_round() {
        let mut g = game();
        let gt = ground_top_for(600.0);
        for i in 0..3 {
            g.dangers.push(danger(10 + i, Vec2::new(390.0, gt - 19.0), 50.0));
            g.update(16.0 * (i as f64 + 1.0), 0.016, view()).unwrap();
        }
        assert_eq!(g.hero.hits, 3);
        assert_eq!(g.hero.anim, HeroAnim::Fall);
        assert!(g.is_terminal());
        assert_eq!(g.summary().tally, RoundTally::Hits(3));
    }

    #[test]
    fn test_ground_impact_away_from_hero() {
        let mut g = game();
        let gt = ground_top_for(600.0);
        g.dangers.push(danger(1, Vec2::new(40.0, gt - 19.0), 50.0));
        g.update(16.0, 0.016, view()).unwrap();
        assert!(g.dangers.is_empty());
        assert_eq!(g.hero.hits, 0);
        assert_eq!(g.shards.len(), GROUND_SHARDS as usize);
    }

    #[test]
    fn test_shield_blocks_falling_hazard() {
        let mut g = game();
        let gt = ground_top_for(600.0);
        g.shields.push(Shield {
            id: 99,
            points: vec![Vec2::new(0.0, gt - 60.0), Vec2::new(300.0, gt)],
            thickness: 12.0,
            durability: 500.0,
            max_durability: 500.0,
            anchored: true,
            created_at: 0.0,
        });
        let mut d = danger(1, Vec2::new(140.0, gt - 45.0), 50.0);
        d.vel.y = 2.0;
        g.dangers.push(d);
        g.update(16.0, 0.016, view()).unwrap();
        assert!(g.shields[0].durability < 500.0);
        assert!(g.dangers[0].vel.y < 0.0);
    }

    #[test]
    fn test_broken_shield_turns_to_shards() {
        let mut g = game();
        g.shields.push(Shield {
            id: 5,
            points: vec![Vec2::new(0.0, 500.0), Vec2::new(120.0, 500.0)],
            thickness: 9.0,
            durability: 0.0,
            max_durability: 100.0,
            anchored: true,
            created_at: 0.0,
        });
        g.update(16.0, 0.016, view()).unwrap();
        assert!(g.shields.is_empty());
        assert_eq!(g.shards.len(), 10);
    }

    #[test]
    fn test_spawn_respects_timer() {
        let mut g = game();
        g.update(1000.0, 0.016, view()).unwrap();
        assert!(g.dangers.is_empty());
        g.update(2001.0, 0.016, view()).unwrap();
        assert_eq!(g.dangers.len(), 1);
        assert!((g.spawn_timer().interval - 2000.0 * 0.9935).abs() < 0.001);
    }

    #[test]
    fn test_caps_scaled_by_quality() {
        let settings = Settings::from_preset(QualityPreset::Low);
        let mut g = SketchGame::new(Environment::Desert, settings, 1);
        g.start(0.0, view());
        let p = Particle::new(Vec2::ZERO, Vec2::ZERO, 1.0, 2.0, Rgba::BLACK);
        g.particles = vec![p.clone(); 2000];
        g.shards = vec![p; 2000];
        g.dangers = (0..40).map(|i| danger(i, Vec2::ZERO, 5.0)).collect();
        let evicted = g.enforce_caps();
        assert_eq!(g.particles.len(), 750);
        assert_eq!(g.shards.len(), 600);
        assert_eq!(g.dangers.len(), 30);
        assert_eq!(g.dangers[0].id, 0);
        assert_eq!(evicted, 1250 + 1400 + 10);
    }

    #[test]
    fn test_non_finite_clock_is_an_error() {
        let mut g = game();
        assert!(g.update(f64::NAN, 0.016, view()).is_err());
    }

    #[test]
    fn test_render_layer_order_and_placeholders() {
        let mut g = game();
        g.dangers.push(danger(1, Vec2::new(100.0, 100.0), 50.0));
        let assets = AssetCatalog::<StaticMedia>::new();
        let mut s = RecordingSurface::new();
        g.render(&mut s, &assets, view()).unwrap();
        let layers = s.layers();
        let ranks: Vec<usize> = layers.iter().map(|l| l.rank()).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(layers.first(), Some(&Layer::Background));
        assert_eq!(layers.last(), Some(&Layer::Hud));
        assert!(s.in_layer(Layer::Hazards).iter().any(|c| matches!(
            c,
            DrawCommand::Quad { color, .. } if *color == palette::DANGER_PLACEHOLDER
        )));
        // No hero media: circle placeholder
        assert!(s.in_layer(Layer::Hero).iter().any(|c| matches!(c, DrawCommand::Ellipse { .. })));
    }

    #[test]
    fn test_hero_uses_hurt_sprite() {
        let mut g = game();
        g.hero.hurt();
        let mut assets = AssetCatalog::new();
        assets.insert(StaticMedia::image("hero_hurt", 64.0, 64.0));
        assets.insert(StaticMedia::image("hero_idle", 64.0, 64.0));
        let mut s = RecordingSurface::new();
        g.render(&mut s, &assets, view()).unwrap();
        assert_eq!(s.media_keys(), vec!["hero_hurt"]);
    }

    #[test]
    fn test_ground_tile_cached_between_frames() {
        let mut g = game();
        let assets = AssetCatalog::<StaticMedia>::new();
        let mut s = RecordingSurface::new();
        g.render(&mut s, &assets, view()).unwrap();
        g.render(&mut s, &assets, view()).unwrap();
        assert_eq!(g.scenery.builds(), 1);
    }
}
