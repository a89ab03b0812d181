use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use zonewalk_core::survey::survey;
use zonewalk_core::{AnimatorConfig, CellPos, MapScene, Viewport};

/// PyO3 bindings for zonewalk-core: seeded grids, paths and surveys as JSON.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

fn build_scene(width: f64, height: f64, seed: u64) -> PyResult<MapScene> {
    let viewport = Viewport::new(width, height);
    let config = AnimatorConfig::default();
    if viewport.grid_dims(config.cell_size) == (0, 0) {
        return Err(PyValueError::new_err(
            "width and height must be positive and within the grid size limit",
        ));
    }
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    Ok(MapScene::build(viewport, &config, &mut rng))
}

/// Zone grid as rows of zone names (or null for background cells).
#[pyfunction]
fn grid_json(width: f64, height: f64, seed: u64) -> PyResult<String> {
    let scene = build_scene(width, height, seed)?;
    let grid = scene.grid();
    let rows: Vec<Vec<Option<&'static str>>> = (0..grid.rows())
        .map(|row| {
            (0..grid.cols())
                .map(|col| grid.zone_at(CellPos::new(col, row)).map(|z| z.name()))
                .collect()
        })
        .collect();
    serde_json::to_string(&rows).map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pyfunction]
fn path_json(width: f64, height: f64, seed: u64) -> PyResult<String> {
    let scene = build_scene(width, height, seed)?;
    serde_json::to_string(scene.path()).map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pyfunction]
fn survey_json(width: f64, height: f64, first_seed: u64, count: u64) -> PyResult<String> {
    let seeds = first_seed..first_seed.saturating_add(count);
    let summary = survey(&AnimatorConfig::default(), Viewport::new(width, height), seeds)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    serde_json::to_string(&summary).map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(grid_json, m)?)?;
    m.add_function(wrap_pyfunction!(path_json, m)?)?;
    m.add_function(wrap_pyfunction!(survey_json, m)?)?;
    Ok(())
}
