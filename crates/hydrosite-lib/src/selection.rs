//! Optimal plant selection along a single river line.
//!
//! Selection is weighted interval scheduling solved by dynamic programming
//! over station indices:
//!
//! ```text
//! best(k) = max(best(k - 1), ranking_power(c) + best(intake(c) - spacing))
//! ```
//!
//! for every candidate `c` whose restitution is station `k`, with `best` of a
//! negative index equal to zero. The chosen set is recovered by walking the
//! recorded choices back from the last station. Picking the strongest
//! candidate first is not equivalent: two adjacent medium plants can outweigh
//! the single long plant that overlaps both.
//!
//! # Ties
//!
//! Candidates ending at the same station are scanned by ascending intake and
//! replace the incumbent only on a strict improvement (beyond a relative
//! tolerance of `1e-9`), and skipping station `k` is the initial incumbent.
//! Among equally good selections the one whose plants end, then start,
//! earliest wins, which makes the output reproducible bit for bit.

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::profile::Profile;
use crate::segment::CandidateSegment;

const TIE_TOLERANCE: f64 = 1e-9;

/// Plants chosen on one river line, in station order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantSelection {
    pub category: u32,
    pub plants: Vec<CandidateSegment>,
}

impl PlantSelection {
    pub fn empty(category: u32) -> Self {
        Self {
            category,
            plants: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    /// Sum of the ranking power of the selected plants.
    pub fn total_power(&self) -> f64 {
        self.plants
            .iter()
            .fold(0.0, |total, plant| total + plant.ranking_power)
    }
}

/// Dynamic-programming selector for non-overlapping, spaced plants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlantSelector {
    spacing_steps: usize,
}

impl PlantSelector {
    /// Selector requiring `spacing_steps` stations between the restitution of a
    /// plant and the intake of the next one.
    pub fn new(spacing_steps: usize) -> Self {
        Self { spacing_steps }
    }

    /// Selector using the plant spacing of `config` at the profile resolution.
    pub fn for_profile(config: &Config, profile: &Profile) -> Self {
        Self::new(config.discretize(profile.resolution).spacing_steps)
    }

    pub fn spacing_steps(&self) -> usize {
        self.spacing_steps
    }

    /// Maximum total ranking power subset of `candidates`.
    pub fn select(&self, category: u32, candidates: &[CandidateSegment]) -> PlantSelection {
        let Some(last_station) = candidates.iter().map(|c| c.restitution).max() else {
            return PlantSelection::empty(category);
        };

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by_key(|&idx| (candidates[idx].restitution, candidates[idx].intake));

        let mut best = vec![0.0_f64; last_station + 1];
        let mut choice: Vec<Option<usize>> = vec![None; last_station + 1];
        let mut next = order.iter().peekable();

        for k in 0..=last_station {
            let mut incumbent = if k > 0 { best[k - 1] } else { 0.0 };
            let mut chosen = None;

            while let Some(&&idx) = next.peek() {
                let candidate = &candidates[idx];
                if candidate.restitution != k {
                    break;
                }
                next.next();
                debug_assert!(candidate.intake < candidate.restitution);

                let value = candidate.ranking_power + self.best_before(&best, candidate.intake);
                if improves(value, incumbent) {
                    incumbent = value;
                    chosen = Some(idx);
                }
            }

            best[k] = incumbent;
            choice[k] = chosen;
        }

        let plants = self.backtrack(candidates, &choice, last_station);
        let selection = PlantSelection { category, plants };
        debug!(
            category,
            candidates = candidates.len(),
            plants = selection.len(),
            total_power = selection.total_power(),
            "selected plants"
        );
        selection
    }

    /// `best(intake - spacing)`, zero before the first station.
    fn best_before(&self, best: &[f64], intake: usize) -> f64 {
        intake
            .checked_sub(self.spacing_steps)
            .map_or(0.0, |station| best[station])
    }

    fn backtrack(
        &self,
        candidates: &[CandidateSegment],
        choice: &[Option<usize>],
        last_station: usize,
    ) -> Vec<CandidateSegment> {
        let mut plants = Vec::new();
        let mut cursor = Some(last_station);

        while let Some(k) = cursor {
            cursor = match choice[k] {
                Some(idx) => {
                    let plant = candidates[idx];
                    plants.push(plant);
                    plant.intake.checked_sub(self.spacing_steps)
                }
                None => k.checked_sub(1),
            };
        }

        plants.reverse();
        plants
    }
}

fn improves(value: f64, incumbent: f64) -> bool {
    value > incumbent + TIE_TOLERANCE * incumbent.abs().max(value.abs())
}
