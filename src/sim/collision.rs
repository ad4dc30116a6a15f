//! Collision geometry
//!
//! Narrow-phase tests only; every caller iterates stores in order and takes
//! the first positive result.
//! - Circle-circle contacts for hazard pairs
//! - Point-to-segment distance for shield polylines
//! - Shrunk AABB overlap for hero contacts
//! - Protected-zone containment for the sketch hero

use glam::Vec2;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point (if hit)
    pub point: Vec2,
    /// Contact normal, pointing from the first shape toward the second
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Centres closer than this are treated as coincident and skipped
pub const COINCIDENT_DIST_SQ: f32 = 0.0001;

/// Overlap test between two circles
///
/// Coincident centres report a miss: there is no usable normal.
pub fn circle_contact(a: Vec2, ra: f32, b: Vec2, rb: f32) -> CollisionResult {
    let delta = b - a;
    let dist_sq = delta.length_squared();
    let min_dist = ra + rb;
    if dist_sq >= min_dist * min_dist || dist_sq <= COINCIDENT_DIST_SQ {
        return CollisionResult::miss();
    }
    let dist = dist_sq.sqrt();
    let normal = delta / dist;
    CollisionResult {
        hit: true,
        point: a + normal * ra,
        normal,
        penetration: min_dist - dist,
    }
}

/// Closest point on segment `v..w` to `p`
pub fn closest_point_on_segment(p: Vec2, v: Vec2, w: Vec2) -> Vec2 {
    let seg = w - v;
    let l2 = seg.length_squared();
    if l2 == 0.0 {
        return v;
    }
    let t = ((p - v).dot(seg) / l2).clamp(0.0, 1.0);
    v + seg * t
}

/// Distance from `p` to segment `v..w` (degenerate segments measure to `v`)
pub fn point_segment_distance(p: Vec2, v: Vec2, w: Vec2) -> f32 {
    p.distance(closest_point_on_segment(p, v, w))
}

/// First segment of `path` within `threshold` of `p`
///
/// Returns the segment index and contact. Paths with fewer than two points
/// never collide.
pub fn polyline_first_hit(p: Vec2, path: &[Vec2], threshold: f32) -> Option<(usize, CollisionResult)> {
    path.windows(2).enumerate().find_map(|(i, seg)| {
        let closest = closest_point_on_segment(p, seg[0], seg[1]);
        let d = p.distance(closest);
        (d <= threshold).then(|| {
            (
                i,
                CollisionResult {
                    hit: true,
                    point: closest,
                    normal: (p - closest).normalize_or_zero(),
                    penetration: threshold - d,
                },
            )
        })
    })
}

/// Axis-aligned box (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max().x && p.y >= self.min.y && p.y <= self.max().y
    }
}

/// Centre-distance overlap with each half-extent sum shrunk by `shrink`
///
/// Near misses inside the margin do not count as hits.
pub fn aabb_overlap_shrunk(a: &Aabb, b: &Aabb, shrink: f32) -> bool {
    let d = (a.center() - b.center()).abs();
    let reach = (a.size + b.size) * 0.5 - Vec2::splat(shrink);
    d.x < reach.x && d.y < reach.y
}

/// Sketch hero contact: hazard box against a square of half-extent `half`
/// around `hero`, open above (only left/right/bottom-above-top matter)
pub fn hero_box_hit(hazard: &Aabb, hero: Vec2, half: f32) -> bool {
    let right = hazard.max().x;
    let left = hazard.min.x;
    let bottom = hazard.max().y;
    !(right < hero.x - half || left > hero.x + half || bottom < hero.y - half)
}

/// Inside (or on) the circular protected zone
#[inline]
pub fn in_protected_zone(p: Vec2, center: Vec2, radius: f32) -> bool {
    p.distance(center) <= radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_contact_overlap() {
        let r = circle_contact(Vec2::ZERO, 10.0, Vec2::new(15.0, 0.0), 10.0);
        assert!(r.hit);
        assert!((r.normal - Vec2::X).length() < 0.001);
        assert!((r.penetration - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_circle_contact_coincident_skipped() {
        let r = circle_contact(Vec2::ONE, 10.0, Vec2::ONE, 10.0);
        assert!(!r.hit);
    }

    #[test]
    fn test_circle_contact_separated() {
        assert!(!circle_contact(Vec2::ZERO, 5.0, Vec2::new(20.0, 0.0), 5.0).hit);
    }

    #[test]
    fn test_point_segment_distance() {
        let v = Vec2::new(0.0, 0.0);
        let w = Vec2::new(10.0, 0.0);
        assert!((point_segment_distance(Vec2::new(5.0, 3.0), v, w) - 3.0).abs() < 0.001);
        // Beyond the end clamps to the endpoint
        assert!((point_segment_distance(Vec2::new(13.0, 4.0), v, w) - 5.0).abs() < 0.001);
        // Degenerate segment
        assert!((point_segment_distance(Vec2::new(3.0, 4.0), v, v) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_polyline_first_match_wins() {
        // Point sits within reach of both segments; the first one reports
        let path = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        let (idx, hit) = polyline_first_hit(Vec2::new(9.0, 1.0), &path, 5.0).unwrap();
        assert_eq!(idx, 0);
        assert!(hit.hit);
    }

    #[test]
    fn test_polyline_needs_two_points() {
        assert!(polyline_first_hit(Vec2::ZERO, &[Vec2::ZERO], 100.0).is_none());
        assert!(polyline_first_hit(Vec2::ZERO, &[], 100.0).is_none());
    }

    #[test]
    fn test_aabb_shrink_margin() {
        let a = Aabb::new(0.0, 0.0, 20.0, 20.0);
        // Overlap of 4 px is inside the 6 px margin
        let b = Aabb::new(16.0, 0.0, 20.0, 20.0);
        assert!(!aabb_overlap_shrunk(&a, &b, 6.0));
        let c = Aabb::new(10.0, 0.0, 20.0, 20.0);
        assert!(aabb_overlap_shrunk(&a, &c, 6.0));
    }

    #[test]
    fn test_hero_box_hit() {
        let hero = Vec2::new(100.0, 200.0);
        assert!(hero_box_hit(&Aabb::new(90.0, 170.0, 20.0, 20.0), hero, 24.0));
        assert!(!hero_box_hit(&Aabb::new(200.0, 170.0, 20.0, 20.0), hero, 24.0));
        // Still above the box
        assert!(!hero_box_hit(&Aabb::new(90.0, 100.0, 20.0, 20.0), hero, 24.0));
    }

    #[test]
    fn test_protected_zone() {
        let c = Vec2::new(50.0, 50.0);
        assert!(in_protected_zone(Vec2::new(50.0, 80.0), c, 30.0));
        assert!(!in_protected_zone(Vec2::new(50.0, 80.1), c, 30.0));
    }
}
