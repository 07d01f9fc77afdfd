//! Discretized longitudinal river profiles.
//!
//! A [`Profile`] is the ordered list of [`Station`]s sampled every
//! `resolution` map units along a [`RiverLine`]. Station indices are the unit
//! every later length comparison works in.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{Point, RiverLine};
use crate::grid::FieldSampler;

/// Sample point along a river line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Station {
    /// Position in the profile; `distance = index * resolution`.
    pub index: usize,
    /// Cumulative distance from the upstream end of the line.
    pub distance: f64,
    pub elevation: f64,
    pub discharge: f64,
    pub position: Point,
}

/// Ordered stations of a single river line, upstream first.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub category: u32,
    pub resolution: f64,
    pub stations: Vec<Station>,
}

impl Profile {
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Positions of the stations `from..=to`.
    pub fn path(&self, from: usize, to: usize) -> Vec<Point> {
        self.stations[from..=to]
            .iter()
            .map(|station| station.position)
            .collect()
    }
}

/// Builds profiles from an elevation field and a discharge field.
pub struct ProfileBuilder<'a, E, Q> {
    elevation: &'a E,
    discharge: &'a Q,
    resolution: f64,
}

impl<'a, E, Q> ProfileBuilder<'a, E, Q>
where
    E: FieldSampler,
    Q: FieldSampler,
{
    /// Sample at the finer of the two field resolutions.
    pub fn new(elevation: &'a E, discharge: &'a Q) -> Self {
        let resolution = elevation.cell_size().min(discharge.cell_size());
        Self {
            elevation,
            discharge,
            resolution,
        }
    }

    /// Override the sampling step.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Sample `line` into a profile.
    ///
    /// The line is validated first; lines shorter than `len_min` fail with
    /// [`Error::GeometryTooShort`]. A line digitized from downstream to
    /// upstream is flipped so that the first station is the highest end.
    pub fn build(&self, line: &RiverLine, len_min: f64) -> Result<Profile> {
        line.validate()?;
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(Error::InvalidConfig {
                message: format!("sampling resolution must be positive, got {}", self.resolution),
            });
        }

        let length = line.length();
        if length < len_min {
            return Err(Error::GeometryTooShort {
                category: line.category,
                length,
                min: len_min,
            });
        }

        let profile = self.sample(line, length)?;
        match (profile.stations.first(), profile.stations.last()) {
            (Some(first), Some(last)) if first.elevation < last.elevation => {
                debug!(
                    category = line.category,
                    "line digitized upstream; sampling reversed direction"
                );
                self.sample(&line.reversed(), length)
            }
            _ => Ok(profile),
        }
    }

    fn sample(&self, line: &RiverLine, length: f64) -> Result<Profile> {
        // Nudge up so an exact multiple of the resolution keeps its last station.
        let steps = (length / self.resolution * (1.0 + 1e-12)).floor() as usize;
        let points = line.points_every(self.resolution, steps + 1);

        let mut stations = Vec::with_capacity(points.len());
        let mut discharge_in_force = 0.0;
        for (index, position) in points.into_iter().enumerate() {
            let distance = index as f64 * self.resolution;
            let elevation =
                self.elevation
                    .sample(position)
                    .ok_or(Error::SampleOutsideGrid {
                        category: line.category,
                        distance,
                    })?;
            if let Some(discharge) = self.discharge.sample(position) {
                discharge_in_force = discharge;
            }
            stations.push(Station {
                index,
                distance,
                elevation,
                discharge: discharge_in_force,
                position,
            });
        }

        debug!(
            category = line.category,
            stations = stations.len(),
            resolution = self.resolution,
            "sampled river profile"
        );

        Ok(Profile {
            category: line.category,
            resolution: self.resolution,
            stations,
        })
    }
}
