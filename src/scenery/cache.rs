//! Memoized scenery layers
//!
//! Layers are a pure function of [`SceneryKey`]. The cache holds the last
//! built set and hands out shared handles; a key change replaces the whole
//! set, nothing is patched in place.

use std::rc::Rc;

use super::ground::{GroundSpec, consts::{TILE_MIN_HEIGHT, TILE_WIDTH}};
use super::hills::HillsSpec;
use super::raster::Raster;
use super::registry::SceneryRegistry;
use super::trees::{TreeSlot, paint_trees, tree_slots};
use crate::renderer::color::palette;
use crate::settings::QualityPreset;
use crate::sim::environment::Environment;

/// Everything the layers depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneryKey {
    pub env: Environment,
    pub strip_width: u32,
    pub height: u32,
    /// Ground line in strip coordinates
    pub ground_top: u32,
    pub grass_band: u32,
    pub quality: QualityPreset,
    /// Build sky/hills/trees strips too (runner); sketch mode only needs ground
    pub strips: bool,
}

impl SceneryKey {
    pub fn new(env: Environment, view_width: f32, view_height: f32, ground_top: f32, grass_band: f32, quality: QualityPreset) -> Self {
        Self {
            env,
            strip_width: crate::strip_width_for(view_width),
            height: view_height.max(1.0).ceil() as u32,
            ground_top: ground_top.max(0.0).floor() as u32,
            grass_band: grass_band.max(0.0).round() as u32,
            quality,
            strips: true,
        }
    }

    /// Key for a ground tile alone
    pub fn ground_only(mut self) -> Self {
        self.strips = false;
        self
    }

    /// Ground tile size: fixed width, tall enough for the ground band
    pub fn ground_tile_size(&self) -> (u32, u32) {
        let band = self.height.saturating_sub(self.ground_top);
        (TILE_WIDTH, band.max(TILE_MIN_HEIGHT))
    }
}

/// Scrolling strips, each `strip_width` wide
#[derive(Debug)]
pub struct StripLayers {
    /// Fallback sky when no background media is ready
    pub sky: Raster,
    pub hills: Raster,
    pub trees: Raster,
    pub tree_slots: Vec<TreeSlot>,
}

/// One built set of scenery rasters
#[derive(Debug)]
pub struct SceneryLayers {
    pub key: SceneryKey,
    pub strips: Option<StripLayers>,
    pub ground: Raster,
}

/// Sky gradient strip
pub fn sky_strip(width: u32, height: u32) -> Raster {
    let mut r = Raster::new(width, height);
    r.fill_vertical_gradient(
        0.0,
        0.0,
        width as f32,
        height as f32,
        &[(0.0, palette::SKY_TOP), (0.6, palette::SKY_MID.alpha(0.6)), (1.0, palette::SKY_BOTTOM)],
    );
    r
}

/// Build every layer for `key`
pub fn build_layers(registry: &SceneryRegistry, key: SceneryKey) -> SceneryLayers {
    let entry = registry.get(key.env);
    let (tile_w, tile_h) = key.ground_tile_size();
    let ground = (entry.ground)(&GroundSpec::new(tile_w, tile_h, key.grass_band as f32, key.quality));
    let strips = key.strips.then(|| {
        let hills = (entry.hills)(&HillsSpec {
            width: key.strip_width,
            height: key.height,
            quality: key.quality,
        });
        let slots = tree_slots(&entry.tree_layout, key.strip_width as f32);
        let mut trees = Raster::new(key.strip_width, key.height);
        paint_trees(&mut trees, &slots, key.ground_top as f32, entry.trees);
        StripLayers {
            sky: sky_strip(key.strip_width, key.height),
            hills,
            trees,
            tree_slots: slots,
        }
    });

    SceneryLayers { key, strips, ground }
}

/// Single-entry cache over [`build_layers`]
#[derive(Debug, Default)]
pub struct SceneryCache {
    registry: SceneryRegistry,
    current: Option<Rc<SceneryLayers>>,
    builds: u32,
}

impl SceneryCache {
    pub fn new(registry: SceneryRegistry) -> Self {
        Self {
            registry,
            current: None,
            builds: 0,
        }
    }

    pub fn registry(&self) -> &SceneryRegistry {
        &self.registry
    }

    /// Layers for `key`, rebuilding only when the key changed
    pub fn get(&mut self, key: SceneryKey) -> Rc<SceneryLayers> {
        if let Some(layers) = self.current.as_ref().filter(|l| l.key == key) {
            return Rc::clone(layers);
        }
        log::info!(
            "Building scenery for '{}' ({}x{}, {:?})",
            key.env.key(),
            key.strip_width,
            key.height,
            key.quality
        );
        let layers = Rc::new(build_layers(&self.registry, key));
        self.builds += 1;
        self.current = Some(Rc::clone(&layers));
        layers
    }

    /// Drop the cached set (context loss, registry change)
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Number of rebuilds so far
    pub fn builds(&self) -> u32 {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(env: Environment, width: f32) -> SceneryKey {
        SceneryKey::new(env, width, 360.0, 288.0, 28.0, QualityPreset::Low)
    }

    #[test]
    fn test_same_key_returns_same_layers() {
        let mut cache = SceneryCache::default();
        let a = cache.get(key(Environment::Desert, 400.0));
        let b = cache.get(key(Environment::Desert, 400.0));
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.ground.id(), b.ground.id());
        assert_eq!(cache.builds(), 1);
    }

    #[test]
    fn test_key_change_rebuilds() {
        let mut cache = SceneryCache::default();
        let a = cache.get(key(Environment::Desert, 400.0));
        let b = cache.get(key(Environment::Arctic, 400.0));
        assert!(!Rc::ptr_eq(&a, &b));
        // Widths that round to the same strip share layers
        let c = cache.get(key(Environment::Arctic, 300.0));
        assert!(Rc::ptr_eq(&b, &c));
        assert_eq!(cache.builds(), 2);
        cache.invalidate();
        cache.get(key(Environment::Arctic, 300.0));
        assert_eq!(cache.builds(), 3);
    }

    #[test]
    fn test_layer_dimensions() {
        let layers = build_layers(&SceneryRegistry::builtin(), key(Environment::Meadow, 300.0));
        let strips = layers.strips.as_ref().expect("strips");
        assert_eq!(strips.sky.width(), 1024);
        assert_eq!(strips.hills.width(), 1024);
        assert_eq!(strips.trees.height(), 360);
        assert!(!strips.tree_slots.is_empty());
        assert_eq!((layers.ground.width(), layers.ground.height()), (260, 140));
    }

    #[test]
    fn test_ground_only_skips_strips() {
        let layers = build_layers(&SceneryRegistry::builtin(), key(Environment::Haunted, 300.0).ground_only());
        assert!(layers.strips.is_none());
        assert_eq!(layers.ground.width(), 260);
    }
}
