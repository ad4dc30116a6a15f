//! Draw surface abstraction
//!
//! The compositor talks to a [`Surface`]; the browser binds a 2D canvas,
//! headless runs and tests use [`RecordingSurface`].

use glam::Vec2;

use super::asset::{MediaSource, StaticMedia};
use super::color::Rgba;
use super::compositor::Layer;
use crate::error::RenderError;
use crate::scenery::Raster;

/// Oriented rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub center: Vec2,
    pub size: Vec2,
    /// Radians, clockwise on screen
    pub rotation: f32,
}

impl Quad {
    /// Axis-aligned rect from its top-left corner
    pub fn axis(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            center: Vec2::new(x + w / 2.0, y + h / 2.0),
            size: Vec2::new(w, h),
            rotation: 0.0,
        }
    }

    pub fn rotated(center: Vec2, size: Vec2, rotation: f32) -> Self {
        Self { center, size, rotation }
    }

    pub fn top_left(&self) -> Vec2 {
        self.center - self.size / 2.0
    }
}

/// Immediate-mode 2D drawing target
pub trait Surface {
    type Media: MediaSource;

    /// Marks the start of a compositor layer
    fn begin_layer(&mut self, _layer: Layer) {}

    fn fill_quad(&mut self, quad: &Quad, color: Rgba) -> Result<(), RenderError>;

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) -> Result<(), RenderError> {
        self.fill_quad(&Quad::axis(x, y, w, h), color)
    }

    /// Vertical gradient; the default paints horizontal bands
    fn fill_vertical_gradient(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        top: Rgba,
        bottom: Rgba,
    ) -> Result<(), RenderError> {
        const BANDS: u32 = 16;
        let band = h / BANDS as f32;
        for i in 0..BANDS {
            let t = i as f32 / (BANDS - 1) as f32;
            self.fill_rect(x, y + band * i as f32, w, band + 0.5, top.lerp(bottom, t))?;
        }
        Ok(())
    }

    fn fill_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, color: Rgba) -> Result<(), RenderError>;

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Rgba) -> Result<(), RenderError>;

    /// Blit a cached raster with its top-left at `(x, y)`
    fn draw_raster(&mut self, raster: &Raster, x: f32, y: f32) -> Result<(), RenderError>;

    fn draw_media(&mut self, media: &Self::Media, quad: &Quad, alpha: f32) -> Result<(), RenderError>;

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba) -> Result<(), RenderError>;
}

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Layer(Layer),
    Quad { quad: Quad, color: Rgba },
    Ellipse { center: Vec2, rx: f32, ry: f32, color: Rgba },
    Polyline { points: usize, width: f32, color: Rgba },
    Raster { id: u64, x: f32, y: f32 },
    Media { key: String, quad: Quad },
    Text { text: String, x: f32, y: f32 },
}

/// Surface that records calls instead of drawing
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
    current: Option<Layer>,
    /// Draws inside this layer fail with a backend error
    fail_in: Option<Layer>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every draw in `layer` fail
    pub fn failing_in(layer: Layer) -> Self {
        Self {
            fail_in: Some(layer),
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.current = None;
    }

    /// Layer markers in the order they were begun
    pub fn layers(&self) -> Vec<Layer> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Layer(l) => Some(*l),
                _ => None,
            })
            .collect()
    }

    /// Commands recorded inside `layer`
    pub fn in_layer(&self, layer: Layer) -> Vec<&DrawCommand> {
        let mut current = None;
        let mut out = Vec::new();
        for c in &self.commands {
            match c {
                DrawCommand::Layer(l) => current = Some(*l),
                other if current == Some(layer) => out.push(other),
                _ => {}
            }
        }
        out
    }

    pub fn media_keys(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Media { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, cmd: DrawCommand) -> Result<(), RenderError> {
        if self.fail_in.is_some() && self.fail_in == self.current {
            return Err(RenderError::Backend(format!("injected failure in {:?}", self.current)));
        }
        self.commands.push(cmd);
        Ok(())
    }
}

impl Surface for RecordingSurface {
    type Media = StaticMedia;

    fn begin_layer(&mut self, layer: Layer) {
        self.current = Some(layer);
        self.commands.push(DrawCommand::Layer(layer));
    }

    fn fill_quad(&mut self, quad: &Quad, color: Rgba) -> Result<(), RenderError> {
        self.record(DrawCommand::Quad { quad: *quad, color })
    }

    fn fill_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, color: Rgba) -> Result<(), RenderError> {
        self.record(DrawCommand::Ellipse { center, rx, ry, color })
    }

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Rgba) -> Result<(), RenderError> {
        self.record(DrawCommand::Polyline {
            points: points.len(),
            width,
            color,
        })
    }

    fn draw_raster(&mut self, raster: &Raster, x: f32, y: f32) -> Result<(), RenderError> {
        self.record(DrawCommand::Raster { id: raster.id(), x, y })
    }

    fn draw_media(&mut self, media: &StaticMedia, quad: &Quad, _alpha: f32) -> Result<(), RenderError> {
        self.record(DrawCommand::Media {
            key: media.key().to_string(),
            quad: *quad,
        })
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, _size: f32, _color: Rgba) -> Result<(), RenderError> {
        self.record(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_axis() {
        let q = Quad::axis(10.0, 20.0, 30.0, 40.0);
        assert_eq!(q.center, Vec2::new(25.0, 40.0));
        assert_eq!(q.top_left(), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_records_by_layer() {
        let mut s = RecordingSurface::new();
        s.begin_layer(Layer::Background);
        s.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::BLACK).unwrap();
        s.begin_layer(Layer::Hud);
        s.fill_text("12", 0.0, 0.0, 16.0, Rgba::WHITE).unwrap();
        assert_eq!(s.layers(), vec![Layer::Background, Layer::Hud]);
        assert_eq!(s.in_layer(Layer::Background).len(), 1);
        assert_eq!(s.texts(), vec!["12"]);
    }

    #[test]
    fn test_failure_injection() {
        let mut s = RecordingSurface::failing_in(Layer::Hazards);
        s.begin_layer(Layer::Ground);
        assert!(s.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::BLACK).is_ok());
        s.begin_layer(Layer::Hazards);
        assert!(matches!(
            s.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::BLACK),
            Err(RenderError::Backend(_))
        ));
        s.begin_layer(Layer::Overlay);
        assert!(s.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba::BLACK).is_ok());
    }

    #[test]
    fn test_default_gradient_bands() {
        let mut s = RecordingSurface::new();
        s.fill_vertical_gradient(0.0, 0.0, 10.0, 160.0, Rgba::BLACK, Rgba::WHITE).unwrap();
        assert_eq!(s.commands.len(), 16);
        assert_eq!(s.commands[0], DrawCommand::Quad { quad: Quad::axis(0.0, 0.0, 10.0, 10.5), color: Rgba::BLACK });
    }
}
