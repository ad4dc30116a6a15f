//! Per-environment strategy table
//!
//! Each entry bundles the scenery routines with the gameplay profiles that
//! vary by environment (weather, obstacle spacing, tree density). Hosts may
//! register replacements; unknown environments fall back to the meadow entry.

use std::collections::HashMap;

use super::ground::{self, GroundSpec};
use super::hills::{self, HillsSpec};
use super::raster::Raster;
use super::trees::{self, TreeLayout, TreePainter, consts::{SLOT_WIDTH, STREET_SLOT_WIDTH}};
use crate::sim::environment::Environment;
use crate::sim::spawn::GapProfile;
use crate::sim::weather::WeatherProfile;

pub type GroundBuilder = fn(&GroundSpec) -> Raster;
pub type HillsBuilder = fn(&HillsSpec) -> Raster;

/// Everything that differs between environments
#[derive(Clone)]
pub struct EnvironmentEntry {
    pub env: Environment,
    pub ground: GroundBuilder,
    pub hills: HillsBuilder,
    pub trees: TreePainter,
    pub tree_layout: TreeLayout,
    pub weather: WeatherProfile,
    pub gap: GapProfile,
}

impl std::fmt::Debug for EnvironmentEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentEntry")
            .field("env", &self.env)
            .field("tree_layout", &self.tree_layout)
            .field("weather", &self.weather)
            .field("gap", &self.gap)
            .finish_non_exhaustive()
    }
}

/// Tree thinning distance per environment
pub fn tree_spacing(env: Environment) -> f32 {
    match env {
        Environment::Desert => 400.0,
        Environment::Arctic | Environment::Forest => 100.0,
        Environment::Beach | Environment::Bangu | Environment::City => 120.0,
        Environment::Haunted => 50.0,
        Environment::Meadow => 140.0,
    }
}

impl EnvironmentEntry {
    /// Built-in entry for an environment
    pub fn builtin(env: Environment) -> Self {
        let (ground, hills, trees): (GroundBuilder, HillsBuilder, TreePainter) = match env {
            Environment::Meadow => (ground::meadow_ground, hills::meadow_hills, trees::canopy_tree),
            Environment::Desert => (ground::desert_ground, hills::desert_hills, trees::cactus),
            Environment::Arctic => (ground::arctic_ground, hills::arctic_hills, trees::spruce),
            Environment::Bangu | Environment::City => (ground::street_ground, hills::street_hills, trees::street_lamp),
            Environment::Haunted => (ground::haunted_ground, hills::haunted_hills, trees::dead_tree),
            Environment::Forest => (ground::forest_ground, hills::forest_hills, trees::pine),
            Environment::Beach => (ground::beach_ground, hills::beach_hills, trees::palm),
        };
        let (slot_width, min_scale, max_scale) = match env {
            Environment::Bangu => (STREET_SLOT_WIDTH, 0.8, 1.4),
            _ => (SLOT_WIDTH, 0.6, 1.6),
        };
        Self {
            env,
            ground,
            hills,
            trees,
            tree_layout: TreeLayout {
                slot_width,
                min_scale,
                max_scale,
                min_distance: tree_spacing(env),
                seed: super::hash::key_seed(env.key()),
            },
            weather: WeatherProfile::for_env(env),
            gap: GapProfile::for_env(env),
        }
    }
}

/// Lookup table from environment to its strategies
#[derive(Debug, Clone)]
pub struct SceneryRegistry {
    entries: HashMap<Environment, EnvironmentEntry>,
    fallback: EnvironmentEntry,
}

impl Default for SceneryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SceneryRegistry {
    /// Registry with every built-in environment
    pub fn builtin() -> Self {
        let entries = Environment::ALL
            .iter()
            .map(|env| (*env, EnvironmentEntry::builtin(*env)))
            .collect();
        Self {
            entries,
            fallback: EnvironmentEntry::builtin(Environment::Meadow),
        }
    }

    /// Replace or add an entry
    pub fn register(&mut self, entry: EnvironmentEntry) {
        log::info!("Registered scenery for '{}'", entry.env.key());
        if entry.env == Environment::Meadow {
            self.fallback = entry.clone();
        }
        self.entries.insert(entry.env, entry);
    }

    /// Entry for `env`, or the default entry
    pub fn get(&self, env: Environment) -> &EnvironmentEntry {
        self.entries.get(&env).unwrap_or(&self.fallback)
    }

    /// Resolve a host key; unknown keys use the default entry
    pub fn get_by_key(&self, key: &str) -> &EnvironmentEntry {
        self.get(Environment::from_key_or_default(key))
    }

    pub fn remove(&mut self, env: Environment) -> Option<EnvironmentEntry> {
        self.entries.remove(&env)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::weather::WeatherKind;

    #[test]
    fn test_builtin_covers_all() {
        let reg = SceneryRegistry::builtin();
        for env in Environment::ALL {
            assert_eq!(reg.get(env).env, env);
        }
    }

    #[test]
    fn test_unknown_key_falls_back() {
        let reg = SceneryRegistry::builtin();
        assert_eq!(reg.get_by_key("volcano").env, Environment::Meadow);
        assert_eq!(reg.get_by_key("desert").env, Environment::Desert);
    }

    #[test]
    fn test_removed_entry_falls_back() {
        let mut reg = SceneryRegistry::builtin();
        reg.remove(Environment::Beach);
        assert_eq!(reg.get(Environment::Beach).env, Environment::Meadow);
    }

    #[test]
    fn test_register_overrides() {
        let mut reg = SceneryRegistry::builtin();
        let mut entry = EnvironmentEntry::builtin(Environment::Desert);
        entry.tree_layout.min_distance = 10.0;
        reg.register(entry);
        assert_eq!(reg.get(Environment::Desert).tree_layout.min_distance, 10.0);
    }

    #[test]
    fn test_profiles_per_env() {
        let reg = SceneryRegistry::builtin();
        assert_eq!(reg.get(Environment::Arctic).weather.kind, WeatherKind::Snow);
        assert_eq!(reg.get(Environment::Desert).tree_layout.min_distance, 400.0);
        assert_eq!(reg.get(Environment::Bangu).tree_layout.slot_width, STREET_SLOT_WIDTH);
        assert_eq!(reg.get(Environment::Haunted).tree_layout.min_distance, 50.0);
    }
}
