//! Per-line build → evaluate → select pipeline.
//!
//! Lines are processed independently and in input order. Errors that only
//! concern one line are handled according to [`InvalidLinePolicy`]; anything
//! else aborts the run.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Config, InvalidLinePolicy};
use crate::error::{Error, Result};
use crate::geometry::{Point, RiverLine};
use crate::grid::FieldSampler;
use crate::profile::{Profile, ProfileBuilder, Station};
use crate::segment::SegmentEvaluator;
use crate::selection::{PlantSelection, PlantSelector};

/// Result of processing one river line.
#[derive(Debug, Clone)]
pub struct LinePlan {
    pub category: u32,
    pub profile: Profile,
    pub candidate_count: usize,
    pub selection: PlantSelection,
}

/// A line skipped under [`InvalidLinePolicy::Skip`].
#[derive(Debug)]
pub struct RejectedLine {
    pub category: u32,
    pub error: Error,
}

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct PlantReport {
    pub lines: Vec<LinePlan>,
    pub rejected: Vec<RejectedLine>,
}

/// A selected plant resolved against its profile, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plant {
    /// 1-based id, unique across the run.
    pub id: usize,
    pub line_category: u32,
    pub intake: Station,
    pub restitution: Station,
    pub head_drop: f64,
    /// Discharge at the intake.
    pub discharge: f64,
    /// Power before any `p_max` clamp.
    pub potential_power: f64,
    /// Ranking power, i.e. the power the plant is rated for.
    pub power: f64,
    /// Length along the river in map units.
    pub length: f64,
    #[serde(skip)]
    pub path: Vec<Point>,
}

impl PlantReport {
    /// Selected plants of every line, numbered in line then station order.
    pub fn plants(&self) -> Vec<Plant> {
        let mut plants = Vec::new();
        for line in &self.lines {
            for segment in &line.selection.plants {
                let intake = line.profile.stations[segment.intake];
                let restitution = line.profile.stations[segment.restitution];
                plants.push(Plant {
                    id: plants.len() + 1,
                    line_category: line.category,
                    intake,
                    restitution,
                    head_drop: segment.head_drop,
                    discharge: segment.discharge,
                    potential_power: segment.power,
                    power: segment.ranking_power,
                    length: restitution.distance - intake.distance,
                    path: line.profile.path(segment.intake, segment.restitution),
                });
            }
        }
        plants
    }

    /// Sum of the ranking power over all lines.
    pub fn total_power(&self) -> f64 {
        self.lines.iter().fold(0.0, |total, line| total + line.selection.total_power())
    }

    /// Number of plants over all lines.
    pub fn plant_count(&self) -> usize {
        self.lines.iter().map(|line| line.selection.len()).sum()
    }
}

/// Find the optimal plants on every line, sampling at the finer field
/// resolution.
pub fn find_plants<E, Q>(
    lines: &[RiverLine],
    elevation: &E,
    discharge: &Q,
    config: &Config,
) -> Result<PlantReport>
where
    E: FieldSampler,
    Q: FieldSampler,
{
    let builder = ProfileBuilder::new(elevation, discharge);
    find_plants_with(&builder, lines, config)
}

/// Same as [`find_plants`] with a caller-configured [`ProfileBuilder`].
pub fn find_plants_with<E, Q>(
    builder: &ProfileBuilder<'_, E, Q>,
    lines: &[RiverLine],
    config: &Config,
) -> Result<PlantReport>
where
    E: FieldSampler,
    Q: FieldSampler,
{
    let mut report = PlantReport::default();

    for line in lines {
        match plan_line(builder, line, config) {
            Ok(plan) => {
                info!(
                    category = plan.category,
                    stations = plan.profile.len(),
                    candidates = plan.candidate_count,
                    plants = plan.selection.len(),
                    power = plan.selection.total_power(),
                    "planned river line"
                );
                report.lines.push(plan);
            }
            Err(error) if error.is_line_local() => match config.invalid_lines() {
                InvalidLinePolicy::Skip => {
                    warn!(category = line.category, %error, "skipping river line");
                    report.rejected.push(RejectedLine {
                        category: line.category,
                        error,
                    });
                }
                InvalidLinePolicy::Abort => {
                    return Err(Error::LineRejected {
                        category: line.category,
                        source: Box::new(error),
                    });
                }
            },
            Err(error) => return Err(error),
        }
    }

    Ok(report)
}

/// Build, evaluate and select a single line.
pub fn plan_line<E, Q>(
    builder: &ProfileBuilder<'_, E, Q>,
    line: &RiverLine,
    config: &Config,
) -> Result<LinePlan>
where
    E: FieldSampler,
    Q: FieldSampler,
{
    let profile = builder.build(line, config.len_min())?;
    let candidates = SegmentEvaluator::new(config).evaluate(&profile);
    let selection = PlantSelector::for_profile(config, &profile).select(line.category, &candidates);

    Ok(LinePlan {
        category: line.category,
        candidate_count: candidates.len(),
        profile,
        selection,
    })
}
