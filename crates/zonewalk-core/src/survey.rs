use crate::animator::MapScene;
use crate::config::{AnimatorConfig, ConfigError};
use crate::geometry::{CellPos, Viewport};
use crate::zone::ZoneType;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;
use std::{error::Error, fmt};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedReport {
    pub seed: u64,
    pub cols: usize,
    pub rows: usize,
    pub coverage: f64,
    pub zone_cells: [usize; ZoneType::COUNT],
    pub distinct_path_cells: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurveySummary {
    pub schema_version: u32,
    pub viewport: Viewport,
    pub runs: Vec<SeedReport>,
    pub mean_coverage: f64,
    pub mean_distinct_path_cells: f64,
    /// Share of zoned cells per zone type across all runs.
    pub zone_share: [f64; ZoneType::COUNT],
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurveyError {
    Config(ConfigError),
    NoSeeds,
    TooManySeeds { max: u64, actual: u64 },
    DegenerateViewport,
}

impl fmt::Display for SurveyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurveyError::Config(e) => write!(f, "{e}"),
            SurveyError::NoSeeds => write!(f, "seed range is empty"),
            SurveyError::TooManySeeds { max, actual } => {
                write!(f, "seed count ({actual}) exceeds supported maximum ({max})")
            }
            SurveyError::DegenerateViewport => write!(f, "viewport does not map to a usable grid"),
        }
    }
}

impl From<ConfigError> for SurveyError {
    fn from(err: ConfigError) -> Self {
        SurveyError::Config(err)
    }
}

impl Error for SurveyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SurveyError::Config(e) => Some(e),
            _ => None,
        }
    }
}

pub const MAX_SURVEY_SEEDS: u64 = 100_000;

fn survey_one(seed: u64, viewport: Viewport, config: &AnimatorConfig) -> SeedReport {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    let scene = MapScene::build(viewport, config, &mut rng);
    let distinct: HashSet<CellPos> = scene.path().waypoints().iter().map(|w| w.cell).collect();
    SeedReport {
        seed,
        cols: scene.grid().cols(),
        rows: scene.grid().rows(),
        coverage: scene.grid().coverage(),
        zone_cells: scene.grid().histogram(),
        distinct_path_cells: distinct.len(),
    }
}

/// Build a map scene for every seed in parallel and summarise layout
/// statistics. Each seed uses its own `ChaCha12Rng`, so results do not depend
/// on thread scheduling.
pub fn survey(
    config: &AnimatorConfig,
    viewport: Viewport,
    seeds: Range<u64>,
) -> Result<SurveySummary, SurveyError> {
    config.validate()?;
    if viewport.grid_dims(config.cell_size) == (0, 0) {
        return Err(SurveyError::DegenerateViewport);
    }
    let count = seeds.end.saturating_sub(seeds.start);
    if count == 0 {
        return Err(SurveyError::NoSeeds);
    }
    if count > MAX_SURVEY_SEEDS {
        return Err(SurveyError::TooManySeeds {
            max: MAX_SURVEY_SEEDS,
            actual: count,
        });
    }

    let runs: Vec<SeedReport> = seeds
        .into_par_iter()
        .map(|seed| survey_one(seed, viewport, config))
        .collect();

    let n = runs.len() as f64;
    let mean_coverage = runs.iter().map(|r| r.coverage).sum::<f64>() / n;
    let mean_distinct_path_cells =
        runs.iter().map(|r| r.distinct_path_cells as f64).sum::<f64>() / n;
    let mut totals = [0usize; ZoneType::COUNT];
    for run in &runs {
        for (t, c) in totals.iter_mut().zip(run.zone_cells.iter()) {
            *t += c;
        }
    }
    let zoned: usize = totals.iter().sum();
    let mut zone_share = [0.0f64; ZoneType::COUNT];
    if zoned > 0 {
        for (share, &t) in zone_share.iter_mut().zip(totals.iter()) {
            *share = t as f64 / zoned as f64;
        }
    }

    Ok(SurveySummary {
        schema_version: 1,
        viewport,
        runs,
        mean_coverage,
        mean_distinct_path_cells,
        zone_share,
    })
}
