//! hydrosite library entry points.
//!
//! This crate locates the optimal positions of run-of-river hydropower plants:
//! it samples river lines into station profiles, enumerates intake/restitution
//! candidates within the plant length bounds, and selects the non-overlapping,
//! spaced subset with maximum total power. Workspace, grid and GeoJSON helpers
//! let the CLI run the whole pipeline; other consumers should depend on the
//! functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod clean;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod layers;
pub mod output;
pub mod pipeline;
pub mod profile;
pub mod segment;
pub mod selection;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use clean::clean_lines;
pub use config::{Config, Discretization, InvalidLinePolicy, PlantParameters, PowerCapPolicy};
pub use error::{Error, Result};
pub use geometry::{Point, RiverLine};
pub use grid::{FieldSampler, Grid};
pub use layers::{
    read_river_layer, write_plant_layer, write_point_layer, write_river_layer,
    write_station_layer,
};
pub use output::{LineSummary, PlanSummary, PlantRow, RejectedSummary, SummaryRenderMode};
pub use pipeline::{
    find_plants, find_plants_with, plan_line, LinePlan, Plant, PlantReport, RejectedLine,
};
pub use profile::{Profile, ProfileBuilder, Station};
pub use segment::{CandidateSegment, SegmentEvaluator};
pub use selection::{PlantSelection, PlantSelector};
pub use session::{
    LayerKind, Session, TempLayerGuard, CLEAN_RIVER_LAYER, TEMPORARY_VECTORS, WORKSPACE_ENV,
};
