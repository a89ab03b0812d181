//! Procedural zone maps with a wandering agent, plus the small decorative
//! effects that share its frame-driven host model.

pub mod animator;
pub mod config;
pub mod drift;
pub mod geometry;
pub mod grid;
pub mod host;
pub mod path;
pub mod random;
pub mod scenes;
pub mod stage;
pub mod surface;
pub mod survey;
pub mod zone;

pub use animator::{GridAnimator, MapScene, Phase};
pub use config::{AnimatorConfig, ConfigError, DriftConfig, EffectsConfig};
pub use geometry::{CellPos, Point, Viewport};
pub use grid::ZoneGrid;
pub use path::{AgentPath, Walker};
pub use zone::ZoneType;
