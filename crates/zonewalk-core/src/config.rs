use crate::grid::SeedingRules;
use crate::path::DEFAULT_PATH_LEN;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Tunables for the zone-map animator. Defaults reproduce the landing page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    pub cell_size: f64,
    pub path_len: usize,
    /// Clock advance per frame callback. Not scaled by elapsed wall time.
    pub time_step: f64,
    pub agent_speed: f64,
    pub arrive_radius: f64,
    pub seeding: SeedingRules,
    pub shimmer_rate: f64,
    pub shimmer_col_phase: f64,
    pub shimmer_row_phase: f64,
    pub shimmer_depth: f64,
    pub glow_radius: f64,
    pub dot_radius: f64,
    pub ring_radius: f64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            cell_size: 60.0,
            path_len: DEFAULT_PATH_LEN,
            time_step: 0.008,
            agent_speed: 0.6,
            arrive_radius: 2.0,
            seeding: SeedingRules::default(),
            shimmer_rate: 1.5,
            shimmer_col_phase: 0.3,
            shimmer_row_phase: 0.2,
            shimmer_depth: 0.015,
            glow_radius: 40.0,
            dot_radius: 4.0,
            ring_radius: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositive { field: &'static str, value: f64 },
    EmptyPath,
    ZeroSeedDensity,
    InvertedRange { field: &'static str, min: usize, max: usize },
    ZeroBlock { field: &'static str },
    EmptyGlyphSet,
    ZeroSpawnPeriod,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive { field, value } => {
                write!(f, "{field} must be positive and finite (got {value})")
            }
            ConfigError::EmptyPath => write!(f, "path_len must be at least 1"),
            ConfigError::ZeroSeedDensity => write!(f, "seeding.cells_per_seed must be positive"),
            ConfigError::InvertedRange { field, min, max } => {
                write!(f, "{field}: min ({min}) exceeds max ({max})")
            }
            ConfigError::ZeroBlock { field } => write!(f, "{field} must be at least 1"),
            ConfigError::EmptyGlyphSet => write!(f, "glyphs must not be empty"),
            ConfigError::ZeroSpawnPeriod => write!(f, "spawn_period_ms must be positive"),
        }
    }
}

impl Error for ConfigError {}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

impl AnimatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("cell_size", self.cell_size)?;
        require_positive("time_step", self.time_step)?;
        require_positive("agent_speed", self.agent_speed)?;
        require_positive("arrive_radius", self.arrive_radius)?;
        require_positive("glow_radius", self.glow_radius)?;
        require_positive("dot_radius", self.dot_radius)?;
        require_positive("ring_radius", self.ring_radius)?;
        if self.path_len == 0 {
            return Err(ConfigError::EmptyPath);
        }
        let s = &self.seeding;
        if s.cells_per_seed == 0 {
            return Err(ConfigError::ZeroSeedDensity);
        }
        if s.min_block_width == 0 {
            return Err(ConfigError::ZeroBlock {
                field: "seeding.min_block_width",
            });
        }
        if s.min_block_height == 0 {
            return Err(ConfigError::ZeroBlock {
                field: "seeding.min_block_height",
            });
        }
        if s.min_block_width > s.max_block_width {
            return Err(ConfigError::InvertedRange {
                field: "seeding.block_width",
                min: s.min_block_width,
                max: s.max_block_width,
            });
        }
        if s.min_block_height > s.max_block_height {
            return Err(ConfigError::InvertedRange {
                field: "seeding.block_height",
                min: s.min_block_height,
                max: s.max_block_height,
            });
        }
        Ok(())
    }

    /// Shimmer multiplier for the cell at `(col, row)` at clock `t`.
    pub fn shimmer(&self, t: f64, col: usize, row: usize) -> f64 {
        let phase = t * self.shimmer_rate
            + col as f64 * self.shimmer_col_phase
            + row as f64 * self.shimmer_row_phase;
        phase.sin() * self.shimmer_depth + 1.0
    }
}

/// Tunables for the floating glyph overlay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Spawning is skipped while more than this many glyphs are alive.
    pub max_alive: usize,
    pub spawn_period_ms: u32,
    pub spawn_below: f64,
    pub cull_above: f64,
    pub fade_per_tick: f64,
    pub max_drift_x: f64,
    pub min_rise: f64,
    pub rise_spread: f64,
    pub min_size: f64,
    pub size_spread: f64,
    pub min_opacity: f64,
    pub opacity_spread: f64,
    pub max_spin: f64,
    pub glyphs: Vec<char>,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            max_alive: 12,
            spawn_period_ms: 1200,
            spawn_below: 20.0,
            cull_above: -40.0,
            fade_per_tick: 0.00015,
            max_drift_x: 0.15,
            min_rise: 0.15,
            rise_spread: 0.4,
            min_size: 10.0,
            size_spread: 12.0,
            min_opacity: 0.03,
            opacity_spread: 0.12,
            max_spin: 0.0025,
            glyphs: vec!['\u{266A}', '\u{266B}', '\u{266C}', '\u{1F3B5}'],
        }
    }
}

impl DriftConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.glyphs.is_empty() {
            return Err(ConfigError::EmptyGlyphSet);
        }
        if self.spawn_period_ms == 0 {
            return Err(ConfigError::ZeroSpawnPeriod);
        }
        require_positive("fade_per_tick", self.fade_per_tick)?;
        require_positive("min_size", self.min_size)?;
        Ok(())
    }
}

/// Both effect sections, as loaded from a JSON file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub map: AnimatorConfig,
    pub drift: DriftConfig,
}

impl EffectsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.map.validate()?;
        self.drift.validate()
    }
}
