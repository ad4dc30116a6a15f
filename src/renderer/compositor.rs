//! Fixed-order frame composition
//!
//! Layers are always drawn back to front in [`Layer::ORDER`]. Each media draw
//! goes through the readiness gate and falls back to a flat placeholder.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::asset::{AssetCatalog, MediaSource};
use super::color::{Rgba, palette};
use super::parallax::{ParallaxLayer, tile_positions};
use super::surface::{Quad, Surface};
use crate::error::RenderError;
use crate::scenery::{Raster, StripLayers};
use crate::sim::environment::Environment;
use crate::sim::particles::Particle;
use crate::sim::weather::{WeatherKind, WeatherParticle};

pub mod consts {
    pub const ERROR_OVERLAY_RECT: (f32, f32, f32, f32) = (8.0, 8.0, 360.0, 36.0);
    pub const ERROR_OVERLAY_TEXT: &str = "Recoverable game error, see console for details.";
    pub const ERROR_OVERLAY_TEXT_POS: (f32, f32) = (16.0, 32.0);
    pub const HUD_FONT_SIZE: f32 = 16.0;
    pub const HUD_LINE_HEIGHT: f32 = 20.0;
}

use consts::*;

/// Compositor layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Background,
    WeatherTint,
    Parallax,
    Ground,
    Hazards,
    /// Shields and coins
    Pickups,
    Particles,
    Hero,
    Hud,
    /// Error overlay, outside the normal order
    Overlay,
}

impl Layer {
    /// Draw order for a normal frame
    pub const ORDER: [Layer; 9] = [
        Layer::Background,
        Layer::WeatherTint,
        Layer::Parallax,
        Layer::Ground,
        Layer::Hazards,
        Layer::Pickups,
        Layer::Particles,
        Layer::Hero,
        Layer::Hud,
    ];

    /// Position in [`Layer::ORDER`]; the overlay sorts last
    pub fn rank(self) -> usize {
        Self::ORDER.iter().position(|l| *l == self).unwrap_or(Self::ORDER.len())
    }
}

/// What the background pass ended up drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundSource {
    Video,
    Poster,
    SkyStrip,
    Image,
    Gradient,
}

/// Fallback when a media handle is not ready
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placeholder {
    Rect(Rgba),
    Circle(Rgba),
    None,
}

/// Everything the background pass needs
pub struct BackgroundInput<'a> {
    pub env: Environment,
    /// Procedural sky strip, runner only
    pub sky: Option<&'a Raster>,
    pub scroll: f32,
    pub view: Vec2,
}

/// Media key for an environment's background video or poster
pub fn env_media_key(prefix: &str, env: Environment) -> String {
    format!("{}_{}", prefix, env.key())
}

/// Video, then poster, then sky strip, then the `bg` image, then a gradient
pub fn draw_background<S: Surface>(
    s: &mut S,
    assets: &AssetCatalog<S::Media>,
    input: &BackgroundInput<'_>,
) -> Result<BackgroundSource, RenderError> {
    s.begin_layer(Layer::Background);
    let full = Quad::axis(0.0, 0.0, input.view.x, input.view.y);

    if let Some(video) = assets.ready(&env_media_key("video", input.env)) {
        s.draw_media(video, &cover_quad(video, input.view), 1.0)?;
        return Ok(BackgroundSource::Video);
    }
    if let Some(poster) = assets.ready(&env_media_key("poster", input.env)) {
        s.draw_media(poster, &cover_quad(poster, input.view), 1.0)?;
        return Ok(BackgroundSource::Poster);
    }
    if let Some(sky) = input.sky {
        draw_strip(s, sky, ParallaxLayer::Background.offset(input.scroll, sky.width() as f32), 0.0)?;
        return Ok(BackgroundSource::SkyStrip);
    }
    if let Some(image) = assets.ready("bg") {
        s.draw_media(image, &full, 1.0)?;
        return Ok(BackgroundSource::Image);
    }
    s.fill_vertical_gradient(0.0, 0.0, input.view.x, input.view.y, palette::SKY_TOP, palette::PAPER)?;
    Ok(BackgroundSource::Gradient)
}

/// Scale media to cover the view, centred
pub fn cover_quad<M: MediaSource>(media: &M, view: Vec2) -> Quad {
    let Some(size) = media.natural_size().filter(|s| s.x > 0.0 && s.y > 0.0) else {
        return Quad::axis(0.0, 0.0, view.x, view.y);
    };
    let scale = (view.x / size.x).max(view.y / size.y);
    Quad::rotated(view / 2.0, size * scale, 0.0)
}

/// Full-screen weather tint, if any
pub fn draw_tint<S: Surface>(s: &mut S, tint: Option<Rgba>, view: Vec2) -> Result<(), RenderError> {
    s.begin_layer(Layer::WeatherTint);
    if let Some(c) = tint.filter(|c| c.a > 0) {
        s.fill_rect(0.0, 0.0, view.x, view.y, c)?;
    }
    Ok(())
}

/// Draw a doubled strip at `-offset` and once more to its right
pub fn draw_strip<S: Surface>(s: &mut S, strip: &Raster, offset: f32, y: f32) -> Result<(), RenderError> {
    let w = strip.width() as f32;
    s.draw_raster(strip, -offset, y)?;
    s.draw_raster(strip, -offset + w, y)
}

/// Hills and trees strips
pub fn draw_parallax<S: Surface>(s: &mut S, layers: &StripLayers, scroll: f32) -> Result<(), RenderError> {
    s.begin_layer(Layer::Parallax);
    let w = layers.hills.width() as f32;
    draw_strip(s, &layers.hills, ParallaxLayer::Hills.offset(scroll, w), 0.0)?;
    draw_strip(s, &layers.trees, ParallaxLayer::Trees.offset(scroll, w), 0.0)
}

/// Repeat the ground tile across the view from `ground_top` down
pub fn draw_ground<S: Surface>(
    s: &mut S,
    tile: &Raster,
    scroll: f32,
    ground_top: f32,
    view: Vec2,
) -> Result<(), RenderError> {
    s.begin_layer(Layer::Ground);
    let tw = tile.width() as f32;
    let offset = ParallaxLayer::Ground.offset(scroll, tw);
    for x in tile_positions(offset, tw, view.x) {
        s.draw_raster(tile, x, ground_top)?;
    }
    Ok(())
}

/// Draw a ready media handle or its placeholder; returns whether media was drawn
pub fn draw_media_or_placeholder<S: Surface>(
    s: &mut S,
    assets: &AssetCatalog<S::Media>,
    keys: &[&str],
    quad: &Quad,
    placeholder: Placeholder,
) -> Result<bool, RenderError> {
    if let Some(media) = assets.first_ready(keys) {
        s.draw_media(media, quad, 1.0)?;
        return Ok(true);
    }
    match placeholder {
        Placeholder::Rect(c) => s.fill_quad(quad, c)?,
        Placeholder::Circle(c) => {
            let r = quad.size.min_element() / 2.0;
            s.fill_ellipse(quad.center, r, r, c)?
        }
        Placeholder::None => {}
    }
    Ok(false)
}

/// Rain streaks, snow flakes and sand grains; the caller opens the layer
pub fn draw_weather<S: Surface>(s: &mut S, particles: &[WeatherParticle]) -> Result<(), RenderError> {
    for p in particles {
        match p.kind {
            WeatherKind::Rain => {
                let tail = p.pos - p.vel.normalize_or_zero() * p.size;
                s.stroke_polyline(&[tail, p.pos], 1.0, palette::RAIN_STREAK.alpha(p.alpha * 0.6))?
            }
            WeatherKind::Snow => s.fill_ellipse(p.pos, p.size, p.size, palette::SNOW_FLAKE.alpha(p.alpha))?,
            WeatherKind::Sand => s.fill_rect(p.pos.x, p.pos.y, p.size, p.size, palette::SAND_GRAIN.alpha(p.alpha))?,
        }
    }
    Ok(())
}

/// Particles and shards as small rotated squares fading out over their last second
pub fn draw_particles<S: Surface>(s: &mut S, particles: &[Particle]) -> Result<(), RenderError> {
    for p in particles {
        let quad = Quad::rotated(p.pos, Vec2::splat(p.size), p.rotation);
        s.fill_quad(&quad, p.color.fade(p.life))?;
    }
    Ok(())
}

/// Top-left text lines
pub fn draw_hud<S: Surface>(s: &mut S, lines: &[String]) -> Result<(), RenderError> {
    s.begin_layer(Layer::Hud);
    for (i, line) in lines.iter().enumerate() {
        let y = 24.0 + i as f32 * HUD_LINE_HEIGHT;
        s.fill_text(line, 16.0, y, HUD_FONT_SIZE, palette::HUD_TEXT)?;
    }
    Ok(())
}

/// Non-fatal diagnostic shown after a failed frame
pub fn draw_error_overlay<S: Surface>(s: &mut S) -> Result<(), RenderError> {
    s.begin_layer(Layer::Overlay);
    let (x, y, w, h) = ERROR_OVERLAY_RECT;
    s.fill_rect(x, y, w, h, palette::OVERLAY)?;
    let (tx, ty) = ERROR_OVERLAY_TEXT_POS;
    s.fill_text(ERROR_OVERLAY_TEXT, tx, ty, 14.0, Rgba::WHITE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::asset::StaticMedia;
    use crate::renderer::surface::{DrawCommand, RecordingSurface};

    fn input(sky: Option<&Raster>) -> BackgroundInput<'_> {
        BackgroundInput {
            env: Environment::Desert,
            sky,
            scroll: 0.0,
            view: Vec2::new(800.0, 600.0),
        }
    }

    #[test]
    fn test_layer_order_rank() {
        assert!(Layer::Background.rank() < Layer::WeatherTint.rank());
        assert!(Layer::Pickups.rank() < Layer::Particles.rank());
        assert_eq!(Layer::Overlay.rank(), Layer::ORDER.len());
    }

    #[test]
    fn test_background_precedence() {
        let mut assets = AssetCatalog::new();
        let sky = Raster::new(4, 4);
        let mut s = RecordingSurface::new();
        assert_eq!(draw_background(&mut s, &assets, &input(None)).unwrap(), BackgroundSource::Gradient);

        assets.insert(StaticMedia::image("bg", 100.0, 100.0));
        assert_eq!(draw_background(&mut s, &assets, &input(None)).unwrap(), BackgroundSource::Image);
        assert_eq!(draw_background(&mut s, &assets, &input(Some(&sky))).unwrap(), BackgroundSource::SkyStrip);

        assets.insert(StaticMedia::image("poster_desert", 1280.0, 720.0));
        assert_eq!(draw_background(&mut s, &assets, &input(Some(&sky))).unwrap(), BackgroundSource::Poster);

        // Paused video is not ready
        let video = StaticMedia::video("video_desert", 1280.0, 720.0);
        assets.insert(video);
        assert_eq!(draw_background(&mut s, &assets, &input(None)).unwrap(), BackgroundSource::Poster);
        if let Some(v) = assets.get("video_desert") {
            v.set_playing(true);
        }
        assert_eq!(draw_background(&mut s, &assets, &input(None)).unwrap(), BackgroundSource::Video);
    }

    #[test]
    fn test_placeholder_when_not_ready() {
        let mut assets = AssetCatalog::new();
        assets.insert(StaticMedia::pending("rock"));
        let mut s = RecordingSurface::new();
        let q = Quad::axis(0.0, 0.0, 20.0, 20.0);
        let drawn = draw_media_or_placeholder(&mut s, &assets, &["rock"], &q, Placeholder::Rect(palette::DANGER_PLACEHOLDER)).unwrap();
        assert!(!drawn);
        assert_eq!(s.commands, vec![DrawCommand::Quad { quad: q, color: palette::DANGER_PLACEHOLDER }]);
    }

    #[test]
    fn test_cover_quad() {
        let m = StaticMedia::image("v", 1600.0, 900.0);
        let q = cover_quad(&m, Vec2::new(800.0, 800.0));
        assert!((q.size.y - 800.0).abs() < 0.01);
        assert!(q.size.x >= 800.0);
        assert_eq!(q.center, Vec2::new(400.0, 400.0));
    }

    #[test]
    fn test_error_overlay() {
        let mut s = RecordingSurface::new();
        draw_error_overlay(&mut s).unwrap();
        assert_eq!(
            s.commands[1],
            DrawCommand::Quad {
                quad: Quad::axis(8.0, 8.0, 360.0, 36.0),
                color: palette::OVERLAY
            }
        );
        assert_eq!(s.texts(), vec![ERROR_OVERLAY_TEXT]);
    }

    #[test]
    fn test_weather_draws_one_shape_per_particle() {
        let mk = |kind| WeatherParticle {
            kind,
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::new(0.0, 300.0),
            size: 12.0,
            alpha: 1.0,
        };
        let mut s = RecordingSurface::new();
        draw_weather(&mut s, &[mk(WeatherKind::Rain), mk(WeatherKind::Snow), mk(WeatherKind::Sand)]).unwrap();
        assert!(matches!(s.commands[0], DrawCommand::Polyline { points: 2, .. }));
        assert!(matches!(s.commands[1], DrawCommand::Ellipse { .. }));
        assert!(matches!(s.commands[2], DrawCommand::Quad { .. }));
    }

    #[test]
    fn test_ground_tiles_cover_view() {
        let tile = Raster::new(260, 140);
        let mut s = RecordingSurface::new();
        draw_ground(&mut s, &tile, 1000.0, 480.0, Vec2::new(800.0, 600.0)).unwrap();
        let rasters: Vec<_> = s.in_layer(Layer::Ground);
        assert_eq!(rasters.len(), 4);
        assert_eq!(rasters[0], &DrawCommand::Raster { id: tile.id(), x: -140.0, y: 480.0 });
    }
}
