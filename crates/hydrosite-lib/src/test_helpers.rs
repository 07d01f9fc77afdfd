// Test-only helpers for `hydrosite-lib` unit tests
#![allow(dead_code)]
use crate::geometry::Point;
use crate::profile::{Profile, Station};

/// Builder to create synthetic `Profile` instances along the x axis.
pub struct ProfileFixture {
    category: u32,
    resolution: f64,
    elevations: Vec<f64>,
    discharges: Vec<f64>,
}

impl ProfileFixture {
    /// `stations` stations falling `slope` per map unit from elevation 1000,
    /// with a constant `discharge`.
    #[must_use]
    pub fn linear(stations: usize, resolution: f64, slope: f64, discharge: f64) -> Self {
        let elevations = (0..stations)
            .map(|k| 1000.0 - slope * k as f64 * resolution)
            .collect();
        Self {
            category: 1,
            resolution,
            elevations,
            discharges: vec![discharge; stations],
        }
    }

    /// Explicit elevations with a constant `discharge`.
    #[must_use]
    pub fn from_elevations(resolution: f64, elevations: &[f64], discharge: f64) -> Self {
        Self {
            category: 1,
            resolution,
            elevations: elevations.to_vec(),
            discharges: vec![discharge; elevations.len()],
        }
    }

    pub fn category(mut self, category: u32) -> Self {
        self.category = category;
        self
    }

    pub fn discharges(mut self, discharges: &[f64]) -> Self {
        self.discharges = discharges.to_vec();
        self
    }

    pub fn build(self) -> Profile {
        let stations = self
            .elevations
            .iter()
            .zip(&self.discharges)
            .enumerate()
            .map(|(index, (&elevation, &discharge))| {
                let distance = index as f64 * self.resolution;
                Station {
                    index,
                    distance,
                    elevation,
                    discharge,
                    position: Point::new(distance, 0.0),
                }
            })
            .collect();
        Profile {
            category: self.category,
            resolution: self.resolution,
            stations,
        }
    }
}
