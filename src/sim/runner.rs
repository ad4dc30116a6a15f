//! Runner session
//!
//! The hero runs in place while the world scrolls left at a ramping speed.
//! Obstacles cost health, coins in the gaps between them add to the tally,
//! and the round ends when health reaches zero.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::aabb_overlap_shrunk;
use super::entities::{Coin, Obstacle, apply_damage};
use super::environment::Environment;
use super::hero::{HeroAnim, RunnerHero};
use super::ids::IdAllocator;
use super::input::InputEvent;
use super::particles::{Particle, enforce_cap, spawn_debris, spawn_sparkles, update_particles};
use super::physics::consts::RUNNER_PARTICLE_GRAVITY;
use super::spawn::{
    SpawnTimer, coins_in_gap, consts::{MAX_OBSTACLES, RUN_SPEED, RUNNER_SPAWN_BACKDATE},
    spawn_obstacle,
};
use super::weather::{WeatherSystem, WeatherTransition};
use crate::consts::OFFSCREEN_MARGIN;
use crate::error::FrameError;
use crate::frame::{Game, RoundSummary, RoundTally};
use crate::renderer::color::palette;
use crate::renderer::compositor::{
    BackgroundInput, Placeholder, draw_background, draw_ground, draw_hud, draw_media_or_placeholder,
    draw_parallax, draw_particles, draw_tint, draw_weather,
};
use crate::renderer::{AssetCatalog, Layer, Quad, Rgba, Surface};
use crate::scenery::{SceneryCache, SceneryKey};
use crate::settings::Settings;
use crate::Viewport;

pub mod consts {
    pub const START_HEALTH: f32 = 100.0;

    pub const PARTICLE_CAP: usize = 1500;
    pub const OBSTACLE_CAP: usize = 14;
    pub const COIN_CAP: usize = 64;

    /// Ground band height: `clamp(H * 0.2, 72, 220)`
    pub const GROUND_FRACTION: f32 = 0.20;
    pub const GROUND_MIN: f32 = 72.0;
    pub const GROUND_MAX: f32 = 220.0;
    pub const GRASS_BAND: f32 = 28.0;

    /// Speed ramps from 0.7x to 2.0x of the run speed over a minute
    pub const SPEED_MIN_MULT: f32 = 0.7;
    pub const SPEED_MAX_MULT: f32 = 2.0;
    pub const SPEED_RAMP_SECS: f32 = 60.0;

    pub const BIG_HIT_PARTICLES: u32 = 24;
    pub const SMALL_HIT_PARTICLES: u32 = 12;
    pub const COIN_SPARKLES: u32 = 8;
    /// Hit boxes are shrunk by this much on each side
    pub const HIT_SHRINK: f32 = 6.0;

    pub const COIN_POP_SECS: f32 = 0.45;
    pub const COIN_BOB_RATE: f32 = 2.1;
    pub const COIN_BOB_AMP: f32 = 0.2;
    pub const COIN_RISE: f32 = 28.0;

    pub const HEALTH_BAR_WIDTH: f32 = 100.0;
    pub const HEALTH_BAR_HEIGHT: f32 = 8.0;
}

use consts::*;

/// Top of the ground band, floored to whole pixels
pub fn ground_top_for(height: f32) -> f32 {
    (height - (height * GROUND_FRACTION).clamp(GROUND_MIN, GROUND_MAX)).floor()
}

/// World speed (px/s) at a round age
pub fn speed_at(elapsed_secs: f32) -> f32 {
    let t = (elapsed_secs.max(0.0) / SPEED_RAMP_SECS).min(1.0);
    RUN_SPEED * (SPEED_MIN_MULT + (SPEED_MAX_MULT - SPEED_MIN_MULT) * t)
}

/// One Runner round
pub struct RunnerGame {
    env: Environment,
    settings: Settings,
    seed: u64,
    rng: Pcg32,
    ids: IdAllocator,
    pub obstacles: Vec<Obstacle>,
    pub coins: Vec<Coin>,
    pub particles: Vec<Particle>,
    pub weather: WeatherSystem,
    pub hero: RunnerHero,
    pub health: f32,
    pub coins_collected: u32,
    spawn: SpawnTimer,
    /// Cumulative world scroll (px)
    scroll: f32,
    speed: f32,
    walk_frames: usize,
    start_ms: f64,
    elapsed: f32,
    terminal: bool,
    scenery: SceneryCache,
}

impl RunnerGame {
    pub fn new(env: Environment, settings: Settings, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let scenery = SceneryCache::default();
        let weather = WeatherSystem::new(scenery.registry().get(env).weather, 0.0, &mut rng);
        Self {
            env,
            settings,
            seed,
            rng,
            ids: IdAllocator::new(),
            obstacles: Vec::new(),
            coins: Vec::new(),
            particles: Vec::new(),
            weather,
            hero: RunnerHero::default(),
            health: START_HEALTH,
            coins_collected: 0,
            spawn: SpawnTimer::runner(0.0),
            scroll: 0.0,
            speed: speed_at(0.0),
            walk_frames: 2,
            start_ms: 0.0,
            elapsed: 0.0,
            terminal: false,
            scenery,
        }
    }

    pub fn env(&self) -> Environment {
        self.env
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    fn spawn_next(&mut self, floor_y: f32, view_width: f32) {
        if self.obstacles.len() >= MAX_OBSTACLES {
            return;
        }
        let gap = self.scenery.registry().get(self.env).gap;
        let jitter = gap.sample_jitter(&mut self.rng);
        let min_gap = gap.min_gap(self.elapsed, self.env.gap_phase(), self.speed, jitter);
        let next = spawn_obstacle(
            &mut self.rng,
            &mut self.ids,
            self.env,
            view_width,
            floor_y,
            self.obstacles.last(),
            min_gap,
            self.speed,
        );
        if let Some(prev) = self.obstacles.last() {
            let coins = coins_in_gap(&mut self.rng, &mut self.ids, prev, &next, floor_y, self.speed);
            self.coins.extend(coins);
        }
        log::debug!(
            "Spawned '{}' at x={:.0} (min gap {:.0}, big={})",
            next.kind,
            next.pos.x,
            min_gap,
            next.big
        );
        self.obstacles.push(next);
    }

    /// Move obstacles and resolve hero hits
    fn update_obstacles(&mut self, dt: f32, floor_y: f32) {
        let hero = self.hero.bounds();
        let mut i = self.obstacles.len();
        while i > 0 {
            i -= 1;
            let ob = &mut self.obstacles[i];
            ob.vx = -self.speed;
            ob.pos.x += ob.vx * dt;
            ob.pos.y = floor_y - ob.height;

            if aabb_overlap_shrunk(&hero, &ob.bounds(), HIT_SHRINK) {
                let ob = self.obstacles.remove(i);
                let count = if ob.big { BIG_HIT_PARTICLES } else { SMALL_HIT_PARTICLES };
                let scale = self.settings.particle_scale();
                spawn_debris(&mut self.particles, &mut self.rng, ob.bounds().center(), count, scale);
                self.hero.hurt();
                if apply_damage(&mut self.health, ob.damage()) {
                    self.terminal = true;
                    log::info!(
                        "Runner down at {:.1}s with {} coins",
                        self.elapsed,
                        self.coins_collected
                    );
                }
                continue;
            }
            if ob.right() < -OFFSCREEN_MARGIN {
                self.obstacles.remove(i);
            }
        }
    }

    /// Scroll, bob and collect coins
    fn update_coins(&mut self, dt: f32) {
        let hero = self.hero.bounds();
        let scale = self.settings.particle_scale();
        let vx = -self.speed.round();
        let mut i = self.coins.len();
        while i > 0 {
            i -= 1;
            let c = &mut self.coins[i];
            c.vx = vx;
            c.pos.x += c.vx * dt;
            c.anim_time += dt;
            if c.collected {
                if c.anim_time > COIN_POP_SECS {
                    self.coins.remove(i);
                }
                continue;
            }
            c.pos.y += (c.anim_time * COIN_BOB_RATE).sin() * COIN_BOB_AMP;

            if aabb_overlap_shrunk(&hero, &c.bounds(), HIT_SHRINK) {
                c.collected = true;
                c.anim_time = 0.0;
                let center = c.bounds().center();
                self.coins_collected += 1;
                spawn_sparkles(&mut self.particles, &mut self.rng, center, COIN_SPARKLES, scale);
                continue;
            }
            if c.pos.x + c.width < -OFFSCREEN_MARGIN {
                self.coins.remove(i);
            }
        }
    }

    fn draw_hazards<S: Surface>(
        &self,
        surface: &mut S,
        assets: &AssetCatalog<S::Media>,
    ) -> Result<(), FrameError> {
        surface.begin_layer(Layer::Hazards);
        for ob in &self.obstacles {
            let b = ob.bounds();
            surface.fill_ellipse(
                Vec2::new(b.center().x, b.max().y + 6.0),
                ob.width * 0.55,
                6.0,
                palette::SHADOW,
            )?;
            let quad = Quad::axis(ob.pos.x, ob.pos.y, ob.width, ob.height);
            draw_media_or_placeholder(
                surface,
                assets,
                &[ob.kind.as_str()],
                &quad,
                Placeholder::Rect(palette::OBSTACLE_PLACEHOLDER),
            )?;
        }
        Ok(())
    }

    fn draw_coins<S: Surface>(&self, surface: &mut S, assets: &AssetCatalog<S::Media>) -> Result<(), FrameError> {
        surface.begin_layer(Layer::Pickups);
        let sprite = assets.ready("coin");
        for c in &self.coins {
            let (scale, alpha, rise) = if c.collected {
                let t = (c.anim_time / COIN_POP_SECS).min(1.0);
                (1.0 + 0.6 * (t * std::f32::consts::PI).sin(), 1.0 - t, (t * COIN_RISE).round())
            } else {
                (1.0 + (c.anim_time * 3.1).sin() * 0.04, 1.0, 0.0)
            };
            let size = Vec2::new(c.width, c.height) * scale;
            let center = c.bounds().center() - Vec2::new(0.0, rise);
            match sprite {
                Some(media) => surface.draw_media(media, &Quad::rotated(center, size, 0.0), alpha)?,
                None => surface.fill_ellipse(center, size.x / 2.0, size.y / 2.0, palette::COIN.fade(alpha))?,
            }
        }
        Ok(())
    }

    fn draw_hero<S: Surface>(&self, surface: &mut S, assets: &AssetCatalog<S::Media>, view: Viewport) -> Result<(), FrameError> {
        surface.begin_layer(Layer::Hero);
        let size = RunnerHero::sprite_size(view.width);
        let quad = Quad::axis(self.hero.pos.x, self.hero.pos.y, size, size);

        let walk = match self.hero.frame {
            0 => "hero_walk1",
            1 => "hero_walk2",
            _ => "hero_walk3",
        };
        let mut keys: Vec<&str> = Vec::with_capacity(5);
        match self.hero.anim {
            HeroAnim::Hurt => keys.push("hero_hurt"),
            HeroAnim::Jump => keys.push("hero_jump"),
            _ => {}
        }
        keys.extend(["hero_video", "hero_gif", walk]);
        draw_media_or_placeholder(surface, assets, &keys, &quad, Placeholder::Rect(Rgba::BLACK))?;
        Ok(())
    }

    fn hud_lines(&self) -> Vec<String> {
        vec![
            format!("Score: {}", self.score()),
            format!("Coins: {}", self.coins_collected),
            format!("Health: {}", self.health.round()),
        ]
    }
}

impl Game for RunnerGame {
    fn start(&mut self, now_ms: f64, view: Viewport) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.ids.reset();
        self.obstacles.clear();
        self.coins.clear();
        self.particles.clear();
        self.health = START_HEALTH;
        self.coins_collected = 0;
        self.spawn = SpawnTimer::runner(now_ms);
        self.scroll = 0.0;
        self.speed = speed_at(0.0);
        self.start_ms = now_ms;
        self.elapsed = 0.0;
        self.terminal = false;

        self.hero = RunnerHero::default();
        self.hero.resize(view.width);
        self.hero.pos.y = ground_top_for(view.height) + GRASS_BAND - self.hero.height;

        let entry = self.scenery.registry().get(self.env);
        self.weather = WeatherSystem::new(entry.weather, now_ms, &mut self.rng);
        self.weather.cap_scale = self.settings.quality.cap_scale();
        log::info!(
            "Runner round started in '{}' ({:?}, weather {:?})",
            self.env.key(),
            self.settings.quality,
            entry.weather.kind
        );
    }

    fn handle_input(&mut self, event: InputEvent, _view: Viewport) {
        if self.terminal {
            return;
        }
        match event {
            InputEvent::Jump | InputEvent::Tap(_) => {
                self.hero.jump();
            }
            _ => {}
        }
    }

    fn update(&mut self, now_ms: f64, dt: f32, view: Viewport) -> Result<(), FrameError> {
        if !now_ms.is_finite() || !dt.is_finite() {
            return Err(FrameError::Simulation {
                context: "runner update",
                detail: format!("non-finite clock (now {}, dt {})", now_ms, dt),
            });
        }
        if self.terminal {
            return Ok(());
        }
        self.elapsed = ((now_ms - self.start_ms) / 1000.0).max(0.0) as f32;
        self.speed = speed_at(self.elapsed);
        self.scroll += self.speed * dt;

        let ground_top = ground_top_for(view.height);
        let floor_y = ground_top + GRASS_BAND;

        if self.spawn.due(now_ms) {
            self.spawn_next(floor_y, view.width);
            let backdate = self.rng.random::<f64>() * RUNNER_SPAWN_BACKDATE;
            self.spawn.fire(now_ms - backdate);
        }

        self.hero.resize(view.width);
        self.hero.integrate(dt, floor_y - self.hero.height);
        self.hero.animate(self.walk_frames);

        self.update_obstacles(dt, floor_y);
        self.update_coins(dt);

        update_particles(&mut self.particles, dt, RUNNER_PARTICLE_GRAVITY);
        if self.settings.weather {
            let transition = self.weather.step(
                now_ms,
                dt,
                Vec2::new(view.width, view.height),
                ground_top,
                &mut self.rng,
                &mut self.particles,
            );
            if transition != WeatherTransition::None {
                log::debug!("Weather: {:?}", transition);
            }
        }
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
        self.walk_frames = if assets.ready("hero_walk3").is_some() { 3 } else { 2 };

        let key = SceneryKey::new(
            self.env,
            view.width,
            view.height,
            ground_top,
            GRASS_BAND,
            self.settings.quality,
        );
        let layers = self.scenery.get(key);

        draw_background(
            surface,
            assets,
            &BackgroundInput {
                env: self.env,
                sky: layers.strips.as_ref().map(|s| &s.sky),
                scroll: self.scroll,
                view: v,
            },
        )?;
        draw_tint(surface, self.weather.tint(), v)?;
        if let Some(strips) = layers.strips.as_ref() {
            draw_parallax(surface, strips, self.scroll)?;
        }
        draw_ground(surface, &layers.ground, self.scroll, ground_top, v)?;
        surface.fill_rect(0.0, ground_top + GRASS_BAND - 2.0, view.width, 6.0, Rgba::BLACK.alpha(0.02))?;

        self.draw_hazards(surface, assets)?;
        self.draw_coins(surface, assets)?;

        surface.begin_layer(Layer::Particles);
        draw_particles(surface, &self.particles)?;
        draw_weather(surface, &self.weather.particles)?;

        self.draw_hero(surface, assets, view)?;

        if self.settings.show_hud {
            draw_hud(surface, &self.hud_lines())?;
            let y = 24.0 + 3.0 * 20.0 - 8.0;
            surface.fill_rect(16.0, y, HEALTH_BAR_WIDTH, HEALTH_BAR_HEIGHT, palette::HEALTH_BAR_BACK)?;
            let fill = HEALTH_BAR_WIDTH * (self.health / START_HEALTH).clamp(0.0, 1.0);
            surface.fill_rect(16.0, y, fill, HEALTH_BAR_HEIGHT, palette::HEALTH_BAR)?;
        }
        Ok(())
    }

    fn enforce_caps(&mut self) -> usize {
        enforce_cap(&mut self.particles, self.settings.quality.scale_cap(PARTICLE_CAP))
            + enforce_cap(&mut self.obstacles, OBSTACLE_CAP)
            + enforce_cap(&mut self.coins, COIN_CAP)
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
            tally: RoundTally::Coins(self.coins_collected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::StaticMedia;
    use crate::renderer::surface::{DrawCommand, RecordingSurface};
    use crate::settings::QualityPreset;

    fn view() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn game() -> RunnerGame {
        let settings = Settings {
            weather: false,
            ..Settings::default()
        };
        let mut g = RunnerGame::new(Environment::Meadow, settings, 11);
        g.start(0.0, view());
        g
    }

    fn obstacle(x: f32, big: bool) -> Obstacle {
        Obstacle {
            id: 1,
            kind: "rock".into(),
            pos: Vec2::new(x, 0.0),
            width: 30.0,
            height: 30.0,
            big,
            vx: 0.0,
        }
    }

    fn coin(x: f32, y: f32) -> Coin {
        Coin {
            id: 2,
            pos: Vec2::new(x, y),
            width: 32.0,
            height: 32.0,
            vx: 0.0,
            collected: false,
            anim_time: 0.0,
        }
    }

    #[test]
    fn test_ground_and_speed() {
        assert!((ground_top_for(600.0) - 480.0).abs() < 0.001);
        assert!((ground_top_for(300.0) - 228.0).abs() < 0.001);
        assert!((speed_at(0.0) - 182.0).abs() < 0.01);
        assert!((speed_at(30.0) - 351.0).abs() < 0.01);
        assert!((speed_at(600.0) - 520.0).abs() < 0.01);
    }

    #[test]
    fn test_jump_and_land() {
        let mut g = game();
        let baseline = 480.0 + GRASS_BAND - g.hero.height;
        g.update(16.0, 0.016, view()).unwrap();
        assert!(g.hero.on_ground);

        g.handle_input(InputEvent::Jump, view());
        assert_eq!(g.hero.vy, -600.0);
        assert!(!g.hero.on_ground);
        // No double jump
        g.handle_input(InputEvent::Jump, view());
        assert_eq!(g.hero.vy, -600.0);

        let mut t = 16.0;
        for _ in 0..200 {
            t += 16.0;
            g.update(t, 0.016, view()).unwrap();
            if g.hero.on_ground {
                break;
            }
        }
        assert!(g.hero.on_ground);
        assert!((g.hero.pos.y - baseline).abs() < 0.001);
    }

    #[test]
    fn test_obstacle_hit_costs_health() {
        let mut g = game();
        g.obstacles.push(obstacle(g.hero.pos.x, true));
        g.update(16.0, 0.016, view()).unwrap();
        assert!(g.obstacles.is_empty());
        assert!((g.health - 66.0).abs() < 0.001);
        assert_eq!(g.hero.anim, HeroAnim::Hurt);
        assert_eq!(g.particles.len(), BIG_HIT_PARTICLES as usize);

        g.obstacles.push(obstacle(g.hero.pos.x, false));
        g.update(32.0, 0.016, view()).unwrap();
        assert!((g.health - 46.0).abs() < 0.001);
        assert!(!g.is_terminal());
    }

    #[test]
    fn test_hit_bursts_follow_quality() {
        let burst = |quality: QualityPreset| {
            let settings = Settings {
                weather: false,
                ..Settings::from_preset(quality)
            };
            let mut g = RunnerGame::new(Environment::Meadow, settings, 11);
            g.start(0.0, view());
            g.obstacles.push(obstacle(g.hero.pos.x, true));
            g.update(16.0, 0.016, view()).unwrap();
            g.particles.len()
        };
        let low = burst(QualityPreset::Low);
        let high = burst(QualityPreset::High);
        assert_eq!(high, BIG_HIT_PARTICLES as usize);
        assert_eq!(low, (BIG_HIT_PARTICLES as f32 * 0.6).floor() as usize);
        assert!(low < high);
    }

    #[test]
    fn test_particles_toggle_silences_sparkles() {
        let settings = Settings {
            weather: false,
            particles: false,
            ..Settings::default()
        };
        let mut g = RunnerGame::new(Environment::Meadow, settings, 11);
        g.start(0.0, view());
        let hero = g.hero.bounds().center();
        g.coins.push(coin(hero.x - 16.0, hero.y - 16.0));
        g.update(16.0, 0.016, view()).unwrap();
        assert_eq!(g.coins_collected, 1);
        assert!(g.particles.is_empty());
    }

    #[test]
    fn test_health_saturates_and_ends_round() {
        let mut g = game();
        g.health = 10.0;
        g.coins_collected = 4;
        g.obstacles.push(obstacle(g.hero.pos.x, false));
        g.update(16.0, 0.016, view()).unwrap();
        assert_eq!(g.health, 0.0);
        assert!(g.is_terminal());
        assert_eq!(g.summary().tally, RoundTally::Coins(4));
    }

    #[test]
    fn test_coin_counted_once_then_removed() {
        let mut g = game();
        let hero = g.hero.bounds().center();
        g.coins.push(coin(hero.x - 16.0, hero.y - 16.0));
        g.update(16.0, 0.016, view()).unwrap();
        assert_eq!(g.coins_collected, 1);
        assert!(g.coins[0].collected);
        assert_eq!(g.particles.len(), COIN_SPARKLES as usize);

        let mut t = 16.0;
        for _ in 0..40 {
            t += 16.0;
            g.update(t, 0.016, view()).unwrap();
        }
        assert_eq!(g.coins_collected, 1);
        assert!(g.coins.is_empty());
    }

    #[test]
    fn test_offscreen_entities_dropped() {
        let mut g = game();
        g.obstacles.push(obstacle(-200.0, false));
        g.coins.push(coin(-200.0, 100.0));
        g.update(16.0, 0.016, view()).unwrap();
        assert!(g.obstacles.is_empty());
        assert!(g.coins.is_empty());
    }

    #[test]
    fn test_spawn_places_coins_in_gap() {
        let mut g = game();
        let mut t = 0.0;
        while g.obstacles.len() < 3 && t < 20_000.0 {
            t += 16.0;
            g.update(t, 0.016, view()).unwrap();
        }
        assert!(g.obstacles.len() >= 2);
        for pair in g.obstacles.windows(2) {
            assert!(pair[1].pos.x - pair[0].right() >= 120.0 - 30.0);
        }
        assert!(g.obstacles.iter().all(|o| (o.pos.y + o.height - 508.0).abs() < 0.001));
        assert!(!g.coins.is_empty());
    }

    #[test]
    fn test_scroll_advances_with_speed() {
        let mut g = game();
        g.update(1000.0, 0.04, view()).unwrap();
        assert!((g.scroll() - speed_at(1.0) * 0.04).abs() < 0.01);
    }

    #[test]
    fn test_caps() {
        let mut g = game();
        g.obstacles = (0..20).map(|i| obstacle(i as f32 * 50.0, false)).collect();
        g.coins = (0..70).map(|i| coin(i as f32, 0.0)).collect();
        let evicted = g.enforce_caps();
        assert_eq!(g.obstacles.len(), 14);
        assert_eq!(g.coins.len(), 64);
        assert_eq!(evicted, 12);
    }

    #[test]
    fn test_render_layers_with_parallax() {
        let mut g = game();
        g.obstacles.push(obstacle(400.0, false));
        let assets = AssetCatalog::<StaticMedia>::new();
        let mut s = RecordingSurface::new();
        g.render(&mut s, &assets, view()).unwrap();
        let layers = s.layers();
        assert_eq!(
            layers,
            vec![
                Layer::Background,
                Layer::WeatherTint,
                Layer::Parallax,
                Layer::Ground,
                Layer::Hazards,
                Layer::Pickups,
                Layer::Particles,
                Layer::Hero,
                Layer::Hud,
            ]
        );
        // No hero media: black rect
        assert!(s.in_layer(Layer::Hero).iter().any(|c| matches!(
            c,
            DrawCommand::Quad { color, .. } if *color == Rgba::BLACK
        )));
        assert!(s.texts().contains(&"Health: 100"));
    }

    #[test]
    fn test_jump_sprite_precedence() {
        let mut g = game();
        g.hero.jump();
        let mut assets = AssetCatalog::new();
        assets.insert(StaticMedia::image("hero_jump", 64.0, 64.0));
        assets.insert(StaticMedia::image("hero_walk1", 64.0, 64.0));
        let mut s = RecordingSurface::new();
        g.render(&mut s, &assets, view()).unwrap();
        assert_eq!(s.media_keys(), vec!["hero_jump"]);
    }
}
