//! Run parameters for plant siting.
//!
//! [`PlantParameters`] is the raw, user-facing bag of values; [`Config`] is the
//! validated, immutable form shared read-only by the profile builder, the
//! segment evaluator and the selector. Lengths are in map units (metres for a
//! projected workspace) and power in the unit of `head * discharge`.

use serde::Serialize;

use crate::error::{Error, Result};

/// Relative slack used when converting lengths to station counts so that an
/// exact multiple of the resolution never lands on the wrong side of a bound.
const DISCRETIZATION_SLACK: f64 = 1e-9;

/// What to do with candidates whose power exceeds `p_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerCapPolicy {
    /// Keep the candidate but rank it at `p_max`.
    #[default]
    Clamp,
    /// Drop the candidate entirely.
    Reject,
}

/// What to do with a river line that cannot be profiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidLinePolicy {
    /// Log a warning, record the rejection and continue with the other lines.
    #[default]
    Skip,
    /// Stop the whole run with [`Error::LineRejected`].
    Abort,
}

/// Unvalidated plant siting parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantParameters {
    /// Maximum plant length (intake to restitution).
    pub len_plant: f64,
    /// Minimum plant length.
    pub len_min: f64,
    /// Minimum distance between the restitution of a plant and the next intake.
    pub distance: f64,
    /// Conversion factor from hydraulic to usable power, in (0, 1].
    pub efficiency: f64,
    /// Optional per-plant power cap.
    pub p_max: Option<f64>,
    pub power_cap: PowerCapPolicy,
    pub invalid_lines: InvalidLinePolicy,
}

impl Default for PlantParameters {
    fn default() -> Self {
        Self {
            len_plant: 10_000.0,
            len_min: 10.0,
            distance: 0.5,
            efficiency: 1.0,
            p_max: None,
            power_cap: PowerCapPolicy::default(),
            invalid_lines: InvalidLinePolicy::default(),
        }
    }
}

impl PlantParameters {
    /// Validate the parameters.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("len_plant", self.len_plant),
            ("len_min", self.len_min),
            ("distance", self.distance),
            ("efficiency", self.efficiency),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {value}")));
            }
        }

        if self.len_min <= 0.0 {
            return Err(invalid(format!(
                "len_min must be positive, got {}",
                self.len_min
            )));
        }
        if self.len_plant < self.len_min {
            return Err(invalid(format!(
                "len_plant ({}) must not be smaller than len_min ({})",
                self.len_plant, self.len_min
            )));
        }
        if self.distance < 0.0 {
            return Err(invalid(format!(
                "distance must not be negative, got {}",
                self.distance
            )));
        }
        if !(self.efficiency > 0.0 && self.efficiency <= 1.0) {
            return Err(invalid(format!(
                "efficiency must be in (0, 1], got {}",
                self.efficiency
            )));
        }
        if let Some(p_max) = self.p_max {
            if !p_max.is_finite() || p_max <= 0.0 {
                return Err(invalid(format!(
                    "p_max must be a positive finite number, got {p_max}"
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidConfig { message }
}

/// Validated, immutable run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Config {
    len_plant: f64,
    len_min: f64,
    distance: f64,
    efficiency: f64,
    p_max: Option<f64>,
    power_cap: PowerCapPolicy,
    invalid_lines: InvalidLinePolicy,
}

impl Config {
    /// Validate `params` and freeze them.
    pub fn new(params: PlantParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self::freeze(params))
    }

    fn freeze(params: PlantParameters) -> Self {
        Self {
            len_plant: params.len_plant,
            len_min: params.len_min,
            distance: params.distance,
            efficiency: params.efficiency,
            p_max: params.p_max,
            power_cap: params.power_cap,
            invalid_lines: params.invalid_lines,
        }
    }

    pub fn len_plant(&self) -> f64 {
        self.len_plant
    }

    pub fn len_min(&self) -> f64 {
        self.len_min
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn p_max(&self) -> Option<f64> {
        self.p_max
    }

    pub fn power_cap(&self) -> PowerCapPolicy {
        self.power_cap
    }

    pub fn invalid_lines(&self) -> InvalidLinePolicy {
        self.invalid_lines
    }

    /// Express the length constraints as station counts for a profile sampled
    /// every `resolution` map units.
    pub fn discretize(&self, resolution: f64) -> Discretization {
        let steps_up = |length: f64| {
            let ratio = length / resolution;
            (ratio - ratio.abs() * DISCRETIZATION_SLACK).ceil().max(0.0) as usize
        };
        let steps_down = |length: f64| {
            let ratio = length / resolution;
            (ratio + ratio.abs() * DISCRETIZATION_SLACK).floor().max(0.0) as usize
        };

        Discretization {
            min_steps: steps_up(self.len_min).max(1),
            max_steps: steps_down(self.len_plant),
            spacing_steps: steps_up(self.distance),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::freeze(PlantParameters::default())
    }
}

/// Length constraints in whole stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discretization {
    /// Shortest admissible plant, in stations.
    pub min_steps: usize,
    /// Longest admissible plant, in stations.
    pub max_steps: usize,
    /// Minimum gap between consecutive plants, in stations.
    pub spacing_steps: usize,
}
