//! Parallax scroll offsets
//!
//! Strips are twice the view width (at least 1024) and drawn twice side by
//! side, so any offset in `[0, strip)` covers the screen.

use serde::{Deserialize, Serialize};

/// Scrolling layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParallaxLayer {
    Background,
    Hills,
    Trees,
    Ground,
}

impl ParallaxLayer {
    /// Fraction of the world scroll this layer moves by
    pub fn factor(self) -> f32 {
        match self {
            ParallaxLayer::Background | ParallaxLayer::Hills => 0.1,
            ParallaxLayer::Trees => 0.13,
            ParallaxLayer::Ground => 0.4,
        }
    }

    /// `floor(scroll * factor) mod width`
    pub fn offset(self, scroll: f32, width: f32) -> f32 {
        strip_offset(scroll, self.factor(), width)
    }
}

/// `floor(scroll * factor)` wrapped into `[0, width)`
pub fn strip_offset(scroll: f32, factor: f32, width: f32) -> f32 {
    if width <= 0.0 {
        return 0.0;
    }
    (scroll * factor).floor().rem_euclid(width)
}

/// X positions at which to draw a tile of `tile_w` to cover `[0, view_w)`
pub fn tile_positions(offset: f32, tile_w: f32, view_w: f32) -> impl Iterator<Item = f32> {
    let start = -offset.rem_euclid(tile_w.max(1.0));
    let step = tile_w.max(1.0);
    let count = ((view_w - start) / step).ceil().max(0.0) as usize;
    (0..count).map(move |i| start + i as f32 * step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_factors() {
        assert_eq!(ParallaxLayer::Background.factor(), 0.1);
        assert_eq!(ParallaxLayer::Trees.factor(), 0.13);
        assert_eq!(ParallaxLayer::Ground.factor(), 0.4);
    }

    #[test]
    fn test_offset_wraps() {
        assert_eq!(strip_offset(1000.0, 0.4, 260.0), 140.0);
        assert_eq!(strip_offset(19.9, 0.1, 1024.0), 1.0);
        assert_eq!(ParallaxLayer::Hills.offset(0.0, 1024.0), 0.0);
    }

    #[test]
    fn test_tiles_cover_view() {
        let xs: Vec<f32> = tile_positions(100.0, 260.0, 800.0).collect();
        assert_eq!(xs[0], -100.0);
        assert!(xs.last().is_some_and(|x| x + 260.0 >= 800.0));
        assert_eq!(xs.len(), 4);
    }

    proptest! {
        #[test]
        fn prop_offset_in_range(scroll in 0.0f32..1.0e6, width in 1.0f32..4096.0) {
            let o = strip_offset(scroll, 0.13, width);
            prop_assert!(o >= 0.0 && o < width);
        }
    }
}
