//! Rendering
//!
//! Draw calls go through the [`Surface`] trait so the same compositor code
//! drives the browser canvas and the headless recorder.
//! - `color`: RGBA colour and palette
//! - `asset`: media handles, readiness gate, playback throttling
//! - `surface`: draw target trait and the recording implementation
//! - `parallax`: scroll offsets for strips and tiles
//! - `compositor`: fixed layer order, background precedence, overlays

pub mod asset;
pub mod color;
pub mod compositor;
pub mod parallax;
pub mod surface;

pub use asset::{AssetCatalog, MediaSource, PlaybackGate, PlaybackResult, StaticMedia};
pub use color::Rgba;
pub use compositor::{Layer, Placeholder};
pub use surface::{DrawCommand, Quad, RecordingSurface, Surface};
