//! Shared fixtures for the integration tests.
//!
//! Fields are built in memory with [`Grid::from_fn`]; the workspace helpers
//! write the same fixtures to disk in the layout a [`Session`] expects.

use std::fs;
use std::path::Path;

use hydrosite_lib::{
    write_river_layer, Config, Grid, LayerKind, PlantParameters, Point, RiverLine, Session,
};
use tempfile::TempDir;

/// Columns of the valley fixtures; wider than the river so the last station
/// still falls on a sloping cell.
pub const VALLEY_COLS: usize = 1010;

/// One-row valley whose floor drops one unit per cell from 1000.
#[allow(dead_code)]
pub fn sloping_valley() -> Grid {
    Grid::from_fn(VALLEY_COLS, 1, 0.0, 0.0, 1.0, |col, _| {
        Some(1000.0 - col as f64)
    })
}

/// Uniform discharge over the valley.
#[allow(dead_code)]
pub fn uniform_discharge(value: f64) -> Grid {
    Grid::from_fn(VALLEY_COLS, 1, 0.0, 0.0, 1.0, |_, _| Some(value))
}

/// Straight river along the valley axis from `from` to `to` (x coordinates).
#[allow(dead_code)]
pub fn straight_river(category: u32, from: f64, to: f64) -> RiverLine {
    RiverLine::new(category, vec![Point::new(from, 0.5), Point::new(to, 0.5)])
}

/// Parameters of the reference scenario: plants 50..=200 long, 10 apart.
#[allow(dead_code)]
pub fn scenario_config() -> Config {
    Config::new(PlantParameters {
        len_plant: 200.0,
        len_min: 50.0,
        distance: 10.0,
        ..PlantParameters::default()
    })
    .expect("valid scenario parameters")
}

/// Render a grid as ESRI ASCII text.
#[allow(dead_code)]
pub fn ascii_grid(ncols: usize, nrows: usize, cell_size: f64, value: impl Fn(usize, usize) -> f64) -> String {
    let mut text = format!(
        "ncols {ncols}\nnrows {nrows}\nxllcorner 0\nyllcorner 0\ncellsize {cell_size}\nNODATA_value -9999\n"
    );
    for row in 0..nrows {
        let cells: Vec<String> = (0..ncols).map(|col| value(col, row).to_string()).collect();
        text.push_str(&cells.join(" "));
        text.push('\n');
    }
    text
}

/// Temporary workspace holding the valley fixtures as `dem`, `flow` and
/// `rivers`.
#[allow(dead_code)]
pub fn valley_workspace() -> (TempDir, Session) {
    let dir = TempDir::new().expect("create temp workspace");
    let session = Session::open(Some(dir.path()), false).expect("open workspace");

    write_layer(
        &session.layer_path(LayerKind::Raster, "dem").expect("valid name"),
        &ascii_grid(VALLEY_COLS, 1, 1.0, |col, _| 1000.0 - col as f64),
    );
    write_layer(
        &session.layer_path(LayerKind::Raster, "flow").expect("valid name"),
        &ascii_grid(VALLEY_COLS, 1, 1.0, |_, _| 0.5),
    );
    write_river_layer(
        &session.layer_path(LayerKind::Vector, "rivers").expect("valid name"),
        &[straight_river(1, 0.0, 1000.0)],
    )
    .expect("write river fixture");

    (dir, session)
}

#[allow(dead_code)]
pub fn write_layer(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("layer has a parent")).expect("create layer dir");
    fs::write(path, contents).expect("write layer");
}
