//! Candidate plant enumeration.
//!
//! Every pair of stations `(i, j)` whose distance lies within the plant length
//! bounds becomes a [`CandidateSegment`] unless water would have to flow
//! uphill. Bounds are compared in whole stations (see
//! [`Config::discretize`]), never in floating-point distances.

use serde::Serialize;
use tracing::debug;

use crate::config::{Config, Discretization, PowerCapPolicy};
use crate::profile::Profile;

/// Intake/restitution pair on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateSegment {
    /// Station index of the intake (upstream end).
    pub intake: usize,
    /// Station index of the restitution (downstream end).
    pub restitution: usize,
    /// `z(intake) - z(restitution)`, never negative.
    pub head_drop: f64,
    /// Discharge at the intake.
    pub discharge: f64,
    /// `head_drop * discharge * efficiency`.
    pub power: f64,
    /// Value maximized by the selector; `power` capped by `p_max` when the
    /// clamp policy is active.
    pub ranking_power: f64,
}

impl CandidateSegment {
    /// Length in stations.
    pub fn length(&self) -> usize {
        self.restitution - self.intake
    }
}

/// Enumerates candidate segments for a profile.
#[derive(Debug, Clone, Copy)]
pub struct SegmentEvaluator<'a> {
    config: &'a Config,
}

impl<'a> SegmentEvaluator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// All admissible candidates of `profile`, ordered by intake then
    /// restitution.
    pub fn evaluate(&self, profile: &Profile) -> Vec<CandidateSegment> {
        let steps = self.config.discretize(profile.resolution);
        let candidates = self.evaluate_steps(profile, steps);
        debug!(
            category = profile.category,
            stations = profile.len(),
            candidates = candidates.len(),
            "evaluated candidate segments"
        );
        candidates
    }

    /// Same as [`SegmentEvaluator::evaluate`] with explicit station bounds.
    pub fn evaluate_steps(
        &self,
        profile: &Profile,
        steps: Discretization,
    ) -> Vec<CandidateSegment> {
        let stations = &profile.stations;
        let n = stations.len();
        let mut candidates = Vec::new();
        if steps.max_steps < steps.min_steps {
            return candidates;
        }

        let efficiency = self.config.efficiency();
        for (i, intake) in stations.iter().enumerate() {
            let first = i.saturating_add(steps.min_steps);
            if first >= n {
                break;
            }
            let last = i.saturating_add(steps.max_steps).min(n - 1);
            for restitution in &stations[first..=last] {
                let head_drop = intake.elevation - restitution.elevation;
                if head_drop < 0.0 {
                    continue;
                }
                let power = head_drop * intake.discharge * efficiency;
                let ranking_power = match (self.config.p_max(), self.config.power_cap()) {
                    (Some(cap), PowerCapPolicy::Clamp) => power.min(cap),
                    (Some(cap), PowerCapPolicy::Reject) if power > cap => continue,
                    _ => power,
                };
                candidates.push(CandidateSegment {
                    intake: intake.index,
                    restitution: restitution.index,
                    head_drop,
                    discharge: intake.discharge,
                    power,
                    ranking_power,
                });
            }
        }

        candidates
    }
}
