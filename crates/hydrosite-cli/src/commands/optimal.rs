//! Optimal plant placement command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::info;

use hydrosite_lib::{
    clean_lines, find_plants, read_river_layer, write_plant_layer, write_point_layer,
    write_river_layer, write_station_layer, Config, Grid, InvalidLinePolicy, LayerKind,
    PlanSummary, PlantParameters, PowerCapPolicy, Session, TempLayerGuard, CLEAN_RIVER_LAYER,
    TEMPORARY_VECTORS,
};

use crate::output::OutputFormat;

/// What to do with candidates whose power exceeds `--p-max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CapPolicyArg {
    /// Keep the candidate, ranked at the cap.
    #[default]
    Clamp,
    /// Drop the candidate.
    Reject,
}

impl From<CapPolicyArg> for PowerCapPolicy {
    fn from(value: CapPolicyArg) -> Self {
        match value {
            CapPolicyArg::Clamp => PowerCapPolicy::Clamp,
            CapPolicyArg::Reject => PowerCapPolicy::Reject,
        }
    }
}

/// What to do with a river line that cannot be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LinePolicyArg {
    /// Log the line and continue with the others.
    #[default]
    Skip,
    /// Stop the run.
    Abort,
}

impl From<LinePolicyArg> for InvalidLinePolicy {
    fn from(value: LinePolicyArg) -> Self {
        match value {
            LinePolicyArg::Skip => InvalidLinePolicy::Skip,
            LinePolicyArg::Abort => InvalidLinePolicy::Abort,
        }
    }
}

/// Arguments for the optimal placement run.
#[derive(Debug, Clone)]
pub struct OptimalArgs {
    /// Workspace directory, if one was given.
    pub workspace: Option<PathBuf>,
    /// Discharge raster name.
    pub discharge: String,
    /// River vector name.
    pub river: String,
    /// Elevation raster name.
    pub elevation: String,
    /// Point layer receiving intakes and restitutions.
    pub output_point: String,
    /// Optional layer receiving the plant stretches.
    pub output_plant: Option<String>,
    pub len_plant: f64,
    pub len_min: f64,
    pub distance: f64,
    pub efficiency: f64,
    pub p_max: Option<f64>,
    pub p_max_policy: CapPolicyArg,
    pub on_invalid_line: LinePolicyArg,
    /// Also write every sampled station.
    pub debug: bool,
    /// Dissolve the river lines before sampling.
    pub clean: bool,
    pub overwrite: bool,
}

impl OptimalArgs {
    /// Library parameters for this run.
    pub fn to_parameters(&self) -> PlantParameters {
        PlantParameters {
            len_plant: self.len_plant,
            len_min: self.len_min,
            distance: self.distance,
            efficiency: self.efficiency,
            p_max: self.p_max,
            power_cap: self.p_max_policy.into(),
            invalid_lines: self.on_invalid_line.into(),
        }
    }

    /// Name of the debug station layer.
    pub fn stations_layer(&self) -> String {
        format!("{}_stations", self.output_point)
    }
}

/// Handle the optimal placement run.
///
/// Preconditions (workspace, parameters, temporary and output layer names) are
/// checked before any layer is read or written.
pub fn handle_optimal(args: &OptimalArgs, format: OutputFormat) -> Result<()> {
    let session = Session::open(args.workspace.as_deref(), args.overwrite)?;
    let config = Config::new(args.to_parameters()).context("invalid plant parameters")?;
    session.check_temporary_vectors(TEMPORARY_VECTORS)?;

    let discharge_path = session.find_layer(LayerKind::Raster, &args.discharge)?;
    let elevation_path = session.find_layer(LayerKind::Raster, &args.elevation)?;
    let river_path = session.find_layer(LayerKind::Vector, &args.river)?;

    let point_path = session.output_layer(LayerKind::Vector, &args.output_point)?;
    let plant_path = args
        .output_plant
        .as_deref()
        .map(|name| session.output_layer(LayerKind::Vector, name))
        .transpose()?;
    let stations_path = if args.debug {
        Some(session.output_layer(LayerKind::Vector, &args.stations_layer())?)
    } else {
        None
    };

    let discharge = Grid::from_path(&discharge_path)
        .with_context(|| format!("failed to load discharge raster {}", args.discharge))?;
    let elevation = Grid::from_path(&elevation_path)
        .with_context(|| format!("failed to load elevation raster {}", args.elevation))?;
    let mut lines = read_river_layer(&river_path)
        .with_context(|| format!("failed to load river layer {}", args.river))?;

    let mut guard = TempLayerGuard::new(&session);
    if args.clean {
        let cleaned = clean_lines(&lines);
        lines = guard.create(LayerKind::Vector, CLEAN_RIVER_LAYER, |path| {
            write_river_layer(path, &cleaned)?;
            read_river_layer(path)
        })?;
        info!(lines = lines.len(), "using dissolved river lines");
    }

    let report = find_plants(&lines, &elevation, &discharge, &config)?;
    let plants = report.plants();

    write_point_layer(&point_path, &plants)
        .with_context(|| format!("failed to write point layer {}", args.output_point))?;
    if let Some(path) = &plant_path {
        write_plant_layer(path, &plants).context("failed to write plant layer")?;
    }
    if let Some(path) = &stations_path {
        write_station_layer(path, &report.lines).context("failed to write station layer")?;
    }
    guard
        .release()
        .context("failed to remove temporary layers")?;

    info!(
        plants = plants.len(),
        total_power = report.total_power(),
        rejected = report.rejected.len(),
        "run complete"
    );
    format.render_summary(&PlanSummary::from_report(&config, &report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> OptimalArgs {
        OptimalArgs {
            workspace: None,
            discharge: "flow".to_string(),
            river: "rivers".to_string(),
            elevation: "dem".to_string(),
            output_point: "intakes".to_string(),
            output_plant: None,
            len_plant: 100.0,
            len_min: 10.0,
            distance: 0.5,
            efficiency: 0.9,
            p_max: Some(50.0),
            p_max_policy: CapPolicyArg::Reject,
            on_invalid_line: LinePolicyArg::Abort,
            debug: false,
            clean: false,
            overwrite: false,
        }
    }

    #[test]
    fn parameters_carry_policies() {
        let params = args().to_parameters();
        assert_eq!(params.len_plant, 100.0);
        assert_eq!(params.efficiency, 0.9);
        assert_eq!(params.p_max, Some(50.0));
        assert_eq!(params.power_cap, PowerCapPolicy::Reject);
        assert_eq!(params.invalid_lines, InvalidLinePolicy::Abort);
    }

    #[test]
    fn stations_layer_is_derived_from_the_point_layer() {
        assert_eq!(args().stations_layer(), "intakes_stations");
    }

    #[test]
    fn missing_workspace_fails_before_anything_else() {
        let err = handle_optimal(&args(), OutputFormat::Text).expect_err("no workspace");
        assert!(matches!(
            err.downcast_ref::<hydrosite_lib::Error>(),
            Some(hydrosite_lib::Error::SessionUnavailable { .. })
        ));
    }
}
