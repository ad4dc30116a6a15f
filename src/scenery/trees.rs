//! Tree strips: hashed slot layout plus one painter per environment

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hash::{coord_hash, hash_range};
use super::raster::Raster;
use crate::renderer::Rgba;

pub mod consts {
    pub const MIN_TREE_SLOTS: u32 = 6;
    /// Width per slot for most environments
    pub const SLOT_WIDTH: f32 = 240.0;
    /// Street lamps sit closer together
    pub const STREET_SLOT_WIDTH: f32 = 220.0;
    pub const TREE_BASE_HEIGHT: f32 = 120.0;
}

use consts::*;

/// One placed tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeSlot {
    pub x: f32,
    pub scale: f32,
    /// Hash in `[0, 1)` painters use to pick a variant
    pub variant: f32,
}

/// Layout knobs from the environment registry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeLayout {
    pub slot_width: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Minimum distance between kept trees
    pub min_distance: f32,
    pub seed: f32,
}

/// `max(6, round(w / slot_width))` hashed slots, thinned to `min_distance`
///
/// The last slot is also dropped when it crowds the first across the wrap.
pub fn tree_slots(layout: &TreeLayout, width: f32) -> Vec<TreeSlot> {
    let count = ((width / layout.slot_width).round() as u32).max(MIN_TREE_SLOTS);
    let mut slots: Vec<TreeSlot> = (0..count)
        .map(|i| {
            let fi = i as f32;
            TreeSlot {
                x: hash_range(fi, 0.0, layout.seed, 0.0, width),
                scale: hash_range(fi, 1.0, layout.seed, layout.min_scale, layout.max_scale),
                variant: coord_hash(fi, 2.0, layout.seed),
            }
        })
        .collect();
    slots.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut kept: Vec<TreeSlot> = Vec::with_capacity(slots.len());
    for s in slots {
        if kept.last().is_none_or(|l| s.x - l.x >= layout.min_distance) {
            kept.push(s);
        }
    }
    if kept.len() > 1 {
        let wrap = kept[0].x + width - kept[kept.len() - 1].x;
        if wrap < layout.min_distance {
            kept.pop();
        }
    }
    kept
}

/// Paints one tree standing on `ground_y`
pub type TreePainter = fn(&mut Raster, &TreeSlot, f32);

/// Paint every slot, twice when a tree straddles the right edge
pub fn paint_trees(r: &mut Raster, slots: &[TreeSlot], ground_y: f32, painter: TreePainter) {
    let w = r.width() as f32;
    for slot in slots {
        painter(r, slot, ground_y);
        if slot.x + TREE_BASE_HEIGHT * slot.scale > w {
            let wrapped = TreeSlot { x: slot.x - w, ..*slot };
            painter(r, &wrapped, ground_y);
        }
    }
}

pub fn cactus(r: &mut Raster, slot: &TreeSlot, ground_y: f32) {
    let s = slot.scale;
    let h = 70.0 * s;
    let trunk = 14.0 * s;
    let green = Rgba::hex(0x5d8a3c);
    r.fill_round_rect(slot.x - trunk / 2.0, ground_y - h, trunk, h, trunk / 2.0, green);
    // Arms
    let arm = 9.0 * s;
    let left_y = ground_y - h * (0.45 + slot.variant * 0.2);
    r.fill_round_rect(slot.x - trunk / 2.0 - 14.0 * s, left_y, 14.0 * s, arm, arm / 2.0, green);
    r.fill_round_rect(slot.x - trunk / 2.0 - 14.0 * s, left_y - 20.0 * s, arm, 24.0 * s, arm / 2.0, green);
    if slot.variant > 0.4 {
        let right_y = ground_y - h * 0.6;
        r.fill_round_rect(slot.x + trunk / 2.0, right_y, 12.0 * s, arm, arm / 2.0, green);
        r.fill_round_rect(slot.x + trunk / 2.0 + 3.0 * s, right_y - 16.0 * s, arm, 20.0 * s, arm / 2.0, green);
    }
    r.fill_rect(slot.x - trunk / 6.0, ground_y - h + 4.0, trunk / 8.0, h - 8.0, Rgba::hex(0x7aa85a).alpha(0.6));
}

pub fn spruce(r: &mut Raster, slot: &TreeSlot, ground_y: f32) {
    let s = slot.scale;
    r.fill_rect(slot.x - 3.0 * s, ground_y - 16.0 * s, 6.0 * s, 16.0 * s, Rgba::hex(0x4a3626));
    for tier in 0..3 {
        let t = tier as f32;
        let base = ground_y - 12.0 * s - t * 24.0 * s;
        let half = (34.0 - t * 8.0) * s;
        let apex = base - 36.0 * s;
        r.fill_polygon(
            &[Vec2::new(slot.x - half, base), Vec2::new(slot.x + half, base), Vec2::new(slot.x, apex)],
            Rgba::hex(0x2f5d50),
        );
        // Snow on the tier
        r.fill_polygon(
            &[
                Vec2::new(slot.x - half * 0.35, apex + 14.0 * s),
                Vec2::new(slot.x + half * 0.35, apex + 14.0 * s),
                Vec2::new(slot.x, apex),
            ],
            Rgba::WHITE,
        );
    }
}

pub fn street_lamp(r: &mut Raster, slot: &TreeSlot, ground_y: f32) {
    let s = slot.scale;
    let h = 110.0 * s;
    let pole = Rgba::hex(0x2b2b2e);
    r.fill_rect(slot.x - 2.0 * s, ground_y - h, 4.0 * s, h, pole);
    r.fill_rect(slot.x - 6.0 * s, ground_y - 6.0 * s, 12.0 * s, 6.0 * s, pole);
    r.fill_rect(slot.x, ground_y - h, 18.0 * s, 3.0 * s, pole);
    r.fill_ellipse(Vec2::new(slot.x + 18.0 * s, ground_y - h + 6.0 * s), 6.0 * s, 4.0 * s, Rgba::hex(0xffe6a6));
    r.fill_circle(Vec2::new(slot.x + 18.0 * s, ground_y - h + 10.0 * s), 16.0 * s, Rgba::hex(0xffe6a6).alpha(0.12));
}

pub fn dead_tree(r: &mut Raster, slot: &TreeSlot, ground_y: f32) {
    let s = slot.scale;
    let bark = Rgba::hex(0x1b1d20);
    let top = Vec2::new(slot.x + (slot.variant - 0.5) * 16.0 * s, ground_y - 90.0 * s);
    r.stroke_segment(Vec2::new(slot.x, ground_y), top, 9.0 * s, bark);
    for k in 0..4 {
        let fk = k as f32;
        let t = 0.35 + fk * 0.15;
        let from = Vec2::new(slot.x, ground_y).lerp(top, t);
        let dir = if k % 2 == 0 { -1.0 } else { 1.0 };
        let to = from + Vec2::new(dir * (22.0 - fk * 3.0) * s, -(14.0 + fk * 4.0) * s);
        r.stroke_segment(from, to, (4.0 - fk * 0.6) * s, bark);
        r.stroke_segment(to, to + Vec2::new(dir * 6.0 * s, -8.0 * s), 1.5 * s, bark);
    }
}

pub fn pine(r: &mut Raster, slot: &TreeSlot, ground_y: f32) {
    let s = slot.scale;
    r.fill_rect(slot.x - 3.5 * s, ground_y - 20.0 * s, 7.0 * s, 20.0 * s, Rgba::hex(0x3b2a1a));
    let shades = [Rgba::hex(0x1f4a2a), Rgba::hex(0x24562f), Rgba::hex(0x2b6236)];
    for tier in 0..4 {
        let t = tier as f32;
        let base = ground_y - 16.0 * s - t * 22.0 * s;
        let half = (28.0 - t * 6.0) * s;
        r.fill_polygon(
            &[Vec2::new(slot.x - half, base), Vec2::new(slot.x + half, base), Vec2::new(slot.x, base - 34.0 * s)],
            shades[tier % shades.len()],
        );
    }
}

pub fn palm(r: &mut Raster, slot: &TreeSlot, ground_y: f32) {
    let s = slot.scale;
    let lean = if slot.variant < 0.5 { -1.0 } else { 1.0 };
    let trunk: Vec<Vec2> = (0..=8)
        .map(|k| {
            let t = k as f32 / 8.0;
            Vec2::new(slot.x + lean * 18.0 * s * t * t, ground_y - 100.0 * s * t)
        })
        .collect();
    r.stroke_polyline(&trunk, 7.0 * s, Rgba::hex(0x8a6a45));
    let crown = trunk[trunk.len() - 1];
    for k in 0..6 {
        let a = std::f32::consts::PI * (1.05 + k as f32 * 0.18);
        let tip = crown + Vec2::new(a.cos() * 38.0 * s, a.sin() * 18.0 * s + 14.0 * s);
        let mid = crown.lerp(tip, 0.5) - Vec2::new(0.0, 8.0 * s);
        r.stroke_polyline(&[crown, mid, tip], 5.0 * s, Rgba::hex(0x3f8f4a));
    }
    r.fill_circle(crown + Vec2::new(0.0, 4.0 * s), 4.0 * s, Rgba::hex(0x6b4a2a));
}

pub fn canopy_tree(r: &mut Raster, slot: &TreeSlot, ground_y: f32) {
    let s = slot.scale;
    r.fill_rect(slot.x - 4.0 * s, ground_y - 40.0 * s, 8.0 * s, 40.0 * s, Rgba::hex(0x5b3f2a));
    let c = Vec2::new(slot.x, ground_y - 58.0 * s);
    r.fill_circle(c + Vec2::new(-14.0 * s, 6.0 * s), 18.0 * s, Rgba::hex(0x3e7a36));
    r.fill_circle(c + Vec2::new(14.0 * s, 6.0 * s), 18.0 * s, Rgba::hex(0x3e7a36));
    r.fill_circle(c, 24.0 * s, Rgba::hex(0x6aa75a));
    r.fill_circle(c + Vec2::new(-6.0 * s, -8.0 * s), 9.0 * s, Rgba::hex(0x8ecb79).alpha(0.7));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(min_distance: f32) -> TreeLayout {
        TreeLayout {
            slot_width: SLOT_WIDTH,
            min_scale: 0.6,
            max_scale: 1.6,
            min_distance,
            seed: 12.5,
        }
    }

    #[test]
    fn test_slot_count_floor() {
        // 800 / 240 rounds to 3, floor is 6
        let slots = tree_slots(&layout(0.0), 800.0);
        assert_eq!(slots.len(), 6);
        let slots = tree_slots(&layout(0.0), 4800.0);
        assert_eq!(slots.len(), 20);
    }

    #[test]
    fn test_thinning_respects_distance() {
        let slots = tree_slots(&layout(400.0), 2400.0);
        for pair in slots.windows(2) {
            assert!(pair[1].x - pair[0].x >= 400.0);
        }
        assert!(slots.len() <= 6);
        for s in &slots {
            assert!((0.6..1.6).contains(&s.scale));
        }
    }

    #[test]
    fn test_layout_deterministic() {
        assert_eq!(tree_slots(&layout(100.0), 1600.0), tree_slots(&layout(100.0), 1600.0));
    }

    #[test]
    fn test_painters_draw_above_ground() {
        let painters: [TreePainter; 7] = [cactus, spruce, street_lamp, dead_tree, pine, palm, canopy_tree];
        for p in painters {
            let mut r = Raster::new(200, 200);
            p(&mut r, &TreeSlot { x: 100.0, scale: 1.0, variant: 0.7 }, 190.0);
            assert!(r.coverage() > 50);
            assert_eq!(r.get(100, 195), Some(Rgba::TRANSPARENT));
        }
    }
}
