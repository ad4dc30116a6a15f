//! Simulation
//!
//! Entity stores, physics, spawning and weather for both game modes. Every
//! session owns its RNG and id allocator, so two sessions never share state.
//! - `sketch`: hazards, shields and tap-to-damage
//! - `runner`: obstacles, coins and the jumping hero
//!
//! Nothing here touches the platform; drawing goes through
//! [`crate::renderer::Surface`].

pub mod collision;
pub mod entities;
pub mod environment;
pub mod gesture;
pub mod hero;
pub mod ids;
pub mod input;
pub mod particles;
pub mod physics;
pub mod runner;
pub mod sketch;
pub mod spawn;
pub mod weather;

pub use entities::{Coin, Danger, DangerKind, Obstacle, Shield};
pub use environment::Environment;
pub use ids::IdAllocator;
pub use input::{InputEvent, InputQueue};
pub use particles::Particle;
pub use runner::RunnerGame;
pub use sketch::SketchGame;
pub use weather::{WeatherKind, WeatherProfile, WeatherSystem};
