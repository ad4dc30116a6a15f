//! Software RGBA raster used for cached scenery layers
//!
//! A minimal scanline rasterizer: spans, polygons (even-odd), ellipses,
//! thick strokes and vertical gradients, all composited source-over.
//! Rasters are immutable once handed to the cache.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;

use crate::renderer::Rgba;

static NEXT_RASTER_ID: AtomicU64 = AtomicU64::new(1);

/// Offscreen pixel buffer
#[derive(Debug, Clone)]
pub struct Raster {
    id: u64,
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Raster {
    /// Transparent raster
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: NEXT_RASTER_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Unique per built raster; backends key their upload caches on it
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Count of pixels with any coverage
    pub fn coverage(&self) -> usize {
        self.pixels.iter().filter(|p| p.a > 0).count()
    }

    /// Source-over one pixel; out-of-bounds writes are ignored
    #[inline]
    pub fn blend(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        self.pixels[idx] = blend_over(self.pixels[idx], color);
    }

    /// Fill pixels whose centres lie in `[x0, x1)` on one row
    fn fill_span(&mut self, row: i64, x0: f32, x1: f32, color: Rgba) {
        if row < 0 || row >= self.height as i64 || x1 <= x0 {
            return;
        }
        let start = ((x0 - 0.5).ceil() as i64).max(0);
        let end = ((x1 - 0.5).ceil() as i64).min(self.width as i64);
        for x in start..end {
            self.blend(x, row, color);
        }
    }

    /// Row range touched by `[y0, y1)`, clipped to the raster
    fn rows(&self, y0: f32, y1: f32) -> std::ops::Range<i64> {
        let start = ((y0 - 0.5).ceil() as i64).max(0);
        let end = ((y1 - 0.5).ceil() as i64).min(self.height as i64);
        start..end.max(start)
    }

    pub fn fill(&mut self, color: Rgba) {
        self.fill_rect(0.0, 0.0, self.width as f32, self.height as f32, color);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        if w <= 0.0 || h <= 0.0 || color.a == 0 {
            return;
        }
        for row in self.rows(y, y + h) {
            self.fill_span(row, x, x + w, color);
        }
    }

    /// Vertical gradient over a rect; `stops` are `(offset 0..1, colour)` ascending
    pub fn fill_vertical_gradient(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        stops: &[(f32, Rgba)],
    ) {
        if stops.is_empty() || h <= 0.0 {
            return;
        }
        for row in self.rows(y, y + h) {
            let t = ((row as f32 + 0.5 - y) / h).clamp(0.0, 1.0);
            let color = sample_stops(stops, t);
            self.fill_span(row, x, x + w, color);
        }
    }

    pub fn fill_ellipse(&mut self, center: Vec2, rx: f32, ry: f32, color: Rgba) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        for row in self.rows(center.y - ry, center.y + ry) {
            let dy = (row as f32 + 0.5 - center.y) / ry;
            let k = 1.0 - dy * dy;
            if k <= 0.0 {
                continue;
            }
            let half = rx * k.sqrt();
            self.fill_span(row, center.x - half, center.x + half, color);
        }
    }

    pub fn fill_circle(&mut self, center: Vec2, r: f32, color: Rgba) {
        self.fill_ellipse(center, r, r, color);
    }

    /// Even-odd scanline fill of a closed polygon
    pub fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        if points.len() < 3 || color.a == 0 {
            return;
        }
        let (min_y, max_y) = points
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));

        let n = points.len();
        let mut xs: Vec<f32> = Vec::with_capacity(8);
        for row in self.rows(min_y, max_y) {
            let sy = row as f32 + 0.5;
            xs.clear();
            for i in 0..n {
                let a = points[i];
                let b = points[(i + 1) % n];
                if (a.y <= sy && b.y > sy) || (b.y <= sy && a.y > sy) {
                    let t = (sy - a.y) / (b.y - a.y);
                    xs.push(a.x + t * (b.x - a.x));
                }
            }
            xs.sort_by(|a, b| a.total_cmp(b));
            for pair in xs.chunks_exact(2) {
                self.fill_span(row, pair[0], pair[1], color);
            }
        }
    }

    /// Fill the region between a curve and a horizontal baseline
    pub fn fill_under(&mut self, curve: &[Vec2], base_y: f32, color: Rgba) {
        if curve.len() < 2 {
            return;
        }
        let mut poly = Vec::with_capacity(curve.len() + 2);
        poly.extend_from_slice(curve);
        poly.push(Vec2::new(curve[curve.len() - 1].x, base_y));
        poly.push(Vec2::new(curve[0].x, base_y));
        self.fill_polygon(&poly, color);
    }

    pub fn fill_round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32, color: Rgba) {
        let r = r.clamp(0.0, w.min(h) / 2.0);
        if r < 0.5 {
            self.fill_rect(x, y, w, h, color);
            return;
        }
        let corners = [
            (Vec2::new(x + w - r, y + r), -std::f32::consts::FRAC_PI_2),
            (Vec2::new(x + w - r, y + h - r), 0.0),
            (Vec2::new(x + r, y + h - r), std::f32::consts::FRAC_PI_2),
            (Vec2::new(x + r, y + r), std::f32::consts::PI),
        ];
        let mut poly = Vec::with_capacity(20);
        for (c, start) in corners {
            for k in 0..=4 {
                let a = start + k as f32 * std::f32::consts::FRAC_PI_8;
                poly.push(c + Vec2::new(a.cos(), a.sin()) * r);
            }
        }
        self.fill_polygon(&poly, color);
    }

    /// Thick line segment with flat caps
    pub fn stroke_segment(&mut self, a: Vec2, b: Vec2, width: f32, color: Rgba) {
        let d = b - a;
        if d.length_squared() < 1e-6 {
            self.fill_circle(a, width / 2.0, color);
            return;
        }
        let n = d.perp().normalize() * (width / 2.0).max(0.5);
        self.fill_polygon(&[a + n, b + n, b - n, a - n], color);
    }

    /// Polyline with round joins
    pub fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Rgba) {
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], width, color);
        }
        if width > 2.0 {
            for p in points.iter().skip(1).take(points.len().saturating_sub(2)) {
                self.fill_circle(*p, width / 2.0, color);
            }
        }
    }

    /// Composite another raster at an integer offset
    pub fn blit(&mut self, src: &Raster, dx: i64, dy: i64) {
        for sy in 0..src.height as i64 {
            for sx in 0..src.width as i64 {
                let px = src.pixels[(sy * src.width as i64 + sx) as usize];
                if px.a > 0 {
                    self.blend(dx + sx, dy + sy, px);
                }
            }
        }
    }
}

/// Straight-alpha source-over
#[inline]
pub fn blend_over(dst: Rgba, src: Rgba) -> Rgba {
    match src.a {
        255 => src,
        0 => dst,
        _ => {
            let sa = src.a as f32 / 255.0;
            let da = dst.a as f32 / 255.0;
            let oa = sa + da * (1.0 - sa);
            if oa <= 0.0 {
                return Rgba::TRANSPARENT;
            }
            let ch = |s: u8, d: u8| {
                ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / oa).round() as u8
            };
            Rgba::new(
                ch(src.r, dst.r),
                ch(src.g, dst.g),
                ch(src.b, dst.b),
                (oa * 255.0).round() as u8,
            )
        }
    }
}

fn sample_stops(stops: &[(f32, Rgba)], t: f32) -> Rgba {
    let first = stops[0];
    if t <= first.0 {
        return first.1;
    }
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let span = (t1 - t0).max(1e-6);
            return c0.lerp(c1, (t - t0) / span);
        }
    }
    stops[stops.len() - 1].1
}

/// Sample a quadratic Bezier (excluding the start point)
pub fn quadratic(p0: Vec2, ctrl: Vec2, p1: Vec2, steps: usize, out: &mut Vec<Vec2>) {
    let steps = steps.max(1);
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let u = 1.0 - t;
        out.push(p0 * (u * u) + ctrl * (2.0 * u * t) + p1 * (t * t));
    }
}

/// Sample a cubic Bezier (excluding the start point)
pub fn cubic(p0: Vec2, c0: Vec2, c1: Vec2, p1: Vec2, steps: usize, out: &mut Vec<Vec2>) {
    let steps = steps.max(1);
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let u = 1.0 - t;
        out.push(
            p0 * (u * u * u) + c0 * (3.0 * u * u * t) + c1 * (3.0 * u * t * t) + p1 * (t * t * t),
        );
    }
}

/// Join control points with midpoint quadratics: each interior point is a
/// control point, the curve passes through the midpoints between them.
pub fn smooth_path(points: &[Vec2], steps: usize) -> Vec<Vec2> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = vec![points[0]];
    let mut cursor = points[0];
    for i in 1..points.len() - 1 {
        let mid = (points[i] + points[i + 1]) * 0.5;
        quadratic(cursor, points[i], mid, steps, &mut out);
        cursor = mid;
    }
    out.push(points[points.len() - 1]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_coverage() {
        let mut r = Raster::new(10, 10);
        r.fill_rect(2.0, 3.0, 4.0, 2.0, Rgba::WHITE);
        assert_eq!(r.coverage(), 8);
        assert_eq!(r.get(2, 3), Some(Rgba::WHITE));
        assert_eq!(r.get(6, 3), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_clipping() {
        let mut r = Raster::new(4, 4);
        r.fill_rect(-10.0, -10.0, 100.0, 100.0, Rgba::BLACK);
        assert_eq!(r.coverage(), 16);
    }

    #[test]
    fn test_polygon_triangle() {
        let mut r = Raster::new(20, 20);
        r.fill_polygon(
            &[Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), Vec2::new(0.0, 20.0)],
            Rgba::WHITE,
        );
        // Roughly half the area
        let c = r.coverage() as i32;
        assert!((c - 200).abs() < 25, "coverage {c}");
        assert_eq!(r.get(1, 1), Some(Rgba::WHITE));
        assert_eq!(r.get(18, 18), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_blend_half_over_opaque() {
        let out = blend_over(Rgba::rgb(0, 0, 0), Rgba::new(255, 255, 255, 128));
        assert_eq!(out.a, 255);
        assert!((out.r as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_gradient_endpoints() {
        let mut r = Raster::new(1, 100);
        r.fill_vertical_gradient(
            0.0,
            0.0,
            1.0,
            100.0,
            &[(0.0, Rgba::BLACK), (1.0, Rgba::WHITE)],
        );
        assert!(r.get(0, 0).unwrap().r < 5);
        assert!(r.get(0, 99).unwrap().r > 250);
    }

    #[test]
    fn test_smooth_path_endpoints() {
        let pts = [
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(30.0, 0.0),
        ];
        let path = smooth_path(&pts, 6);
        assert_eq!(path[0], pts[0]);
        assert_eq!(*path.last().unwrap(), pts[3]);
        assert!(path.len() > pts.len());
    }

    #[test]
    fn test_ids_unique() {
        assert_ne!(Raster::new(1, 1).id(), Raster::new(1, 1).id());
    }
}
