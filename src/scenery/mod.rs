//! Procedural scenery
//!
//! Pure generators for the sky, hills, tree and ground rasters. Results are
//! cached per (size, environment, quality) and redrawn only on key change.

pub mod cache;
pub mod ground;
pub mod hash;
pub mod hills;
pub mod raster;
pub mod registry;
pub mod trees;

pub use cache::{SceneryCache, SceneryKey, SceneryLayers, StripLayers};
pub use raster::Raster;
pub use registry::{EnvironmentEntry, SceneryRegistry};
