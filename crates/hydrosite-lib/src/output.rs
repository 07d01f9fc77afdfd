//! Run summaries for presentation layers.
//!
//! [`PlanSummary`] flattens a [`PlantReport`] into serialisable per-line and
//! per-plant records, renders them as plain or rich text, and exports the
//! plant table as CSV.

use std::fmt::Write as _;
use std::io::Write;

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::{Plant, PlantReport};

/// Presentation style for turning a [`PlanSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryRenderMode {
    PlainText,
    RichText,
}

/// Per-line counters.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineSummary {
    pub category: u32,
    pub stations: usize,
    pub candidates: usize,
    pub plants: usize,
    pub power: f64,
}

/// Line skipped during the run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RejectedSummary {
    pub category: u32,
    pub reason: String,
}

/// Flat plant record used for CSV export.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlantRow {
    pub plant_id: usize,
    pub line_cat: u32,
    pub intake_x: f64,
    pub intake_y: f64,
    pub intake_distance: f64,
    pub restitution_x: f64,
    pub restitution_y: f64,
    pub restitution_distance: f64,
    pub length: f64,
    pub head_drop: f64,
    pub discharge: f64,
    pub potential_power: f64,
    pub power: f64,
}

impl From<&Plant> for PlantRow {
    fn from(plant: &Plant) -> Self {
        Self {
            plant_id: plant.id,
            line_cat: plant.line_category,
            intake_x: plant.intake.position.x,
            intake_y: plant.intake.position.y,
            intake_distance: plant.intake.distance,
            restitution_x: plant.restitution.position.x,
            restitution_y: plant.restitution.position.y,
            restitution_distance: plant.restitution.distance,
            length: plant.length,
            head_drop: plant.head_drop,
            discharge: plant.discharge,
            potential_power: plant.potential_power,
            power: plant.power,
        }
    }
}

/// Structured representation of a run that higher-level consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanSummary {
    pub config: Config,
    pub total_power: f64,
    pub lines: Vec<LineSummary>,
    pub rejected: Vec<RejectedSummary>,
    pub plants: Vec<PlantRow>,
}

impl PlanSummary {
    /// Summarize a [`PlantReport`].
    pub fn from_report(config: &Config, report: &PlantReport) -> Self {
        let lines = report
            .lines
            .iter()
            .map(|line| LineSummary {
                category: line.category,
                stations: line.profile.len(),
                candidates: line.candidate_count,
                plants: line.selection.len(),
                power: line.selection.total_power(),
            })
            .collect();
        let rejected = report
            .rejected
            .iter()
            .map(|rejected| RejectedSummary {
                category: rejected.category,
                reason: rejected.error.to_string(),
            })
            .collect();
        let plants = report.plants().iter().map(PlantRow::from).collect();

        Self {
            config: *config,
            total_power: report.total_power(),
            lines,
            rejected,
            plants,
        }
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: SummaryRenderMode) -> String {
        match mode {
            SummaryRenderMode::PlainText => self.render_plain(),
            SummaryRenderMode::RichText => self.render_rich(),
        }
    }

    /// Write one CSV record per plant, with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in &self.plants {
            csv.serialize(row)?;
        }
        if self.plants.is_empty() {
            csv.write_record([
                "plant_id",
                "line_cat",
                "intake_x",
                "intake_y",
                "intake_distance",
                "restitution_x",
                "restitution_y",
                "restitution_distance",
                "length",
                "head_drop",
                "discharge",
                "potential_power",
                "power",
            ])?;
        }
        csv.flush()?;
        Ok(())
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Plants: {} on {} lines ({} rejected), total power {:.3}",
            self.plants.len(),
            self.lines.len(),
            self.rejected.len(),
            self.total_power
        );
        for plant in &self.plants {
            let _ = writeln!(
                buffer,
                "{:>4}: line {} [{:.1} -> {:.1}] head {:.3} discharge {:.3} power {:.3}",
                plant.plant_id,
                plant.line_cat,
                plant.intake_distance,
                plant.restitution_distance,
                plant.head_drop,
                plant.discharge,
                plant.power
            );
        }
        for rejected in &self.rejected {
            let _ = writeln!(
                buffer,
                "skipped line {}: {}",
                rejected.category, rejected.reason
            );
        }
        buffer
    }

    fn render_rich(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "**Plants**: {} selected, total power `{:.3}`",
            self.plants.len(),
            self.total_power
        );
        let _ = writeln!(buffer);
        let _ = writeln!(
            buffer,
            "| id | line | intake | restitution | head | discharge | power |"
        );
        let _ = writeln!(buffer, "|---:|---:|---:|---:|---:|---:|---:|");
        for plant in &self.plants {
            let _ = writeln!(
                buffer,
                "| {} | {} | {:.1} | {:.1} | {:.3} | {:.3} | {:.3} |",
                plant.plant_id,
                plant.line_cat,
                plant.intake_distance,
                plant.restitution_distance,
                plant.head_drop,
                plant.discharge,
                plant.power
            );
        }
        for rejected in &self.rejected {
            let _ = writeln!(buffer, "* _line {} skipped_: {}", rejected.category, rejected.reason);
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{LinePlan, RejectedLine};
    use crate::selection::PlantSelector;
    use crate::segment::SegmentEvaluator;
    use crate::test_helpers::ProfileFixture;
    use crate::Error;

    fn report() -> (Config, PlantReport) {
        let config = Config::new(crate::PlantParameters {
            len_min: 2.0,
            len_plant: 4.0,
            distance: 1.0,
            ..Default::default()
        })
        .unwrap();
        let profile = ProfileFixture::linear(10, 1.0, 1.0, 2.0).category(7).build();
        let candidates = SegmentEvaluator::new(&config).evaluate(&profile);
        let selection = PlantSelector::for_profile(&config, &profile).select(7, &candidates);
        let report = PlantReport {
            lines: vec![LinePlan {
                category: 7,
                candidate_count: candidates.len(),
                profile,
                selection,
            }],
            rejected: vec![RejectedLine {
                category: 8,
                error: Error::GeometryTooShort {
                    category: 8,
                    length: 1.0,
                    min: 2.0,
                },
            }],
        };
        (config, report)
    }

    #[test]
    fn summary_counts_plants_and_rejections() {
        let (config, report) = report();
        let summary = PlanSummary::from_report(&config, &report);
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.rejected.len(), 1);
        assert_eq!(summary.plants.len(), report.plant_count());
        assert_eq!(summary.plants[0].plant_id, 1);
        assert_eq!(summary.plants[0].line_cat, 7);
    }

    #[test]
    fn plain_text_lists_every_plant() {
        let (config, report) = report();
        let summary = PlanSummary::from_report(&config, &report);
        let text = summary.render(SummaryRenderMode::PlainText);
        assert!(text.starts_with(&format!("Plants: {} on 1 lines (1 rejected)", summary.plants.len())));
        assert!(text.contains("skipped line 8"));
        assert_eq!(text.lines().count(), summary.plants.len() + 2);
    }

    #[test]
    fn empty_run_reports_positive_zero_power() {
        let summary = PlanSummary::from_report(&Config::default(), &PlantReport::default());
        assert!(summary.total_power.is_sign_positive());
        let text = summary.render(SummaryRenderMode::PlainText);
        assert!(text.contains("total power 0.000"));
        assert!(!text.contains("-0"));
    }

    #[test]
    fn csv_has_header_and_one_row_per_plant() {
        let (config, report) = report();
        let summary = PlanSummary::from_report(&config, &report);
        let mut buffer = Vec::new();
        summary.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("plant_id,line_cat,"));
        assert_eq!(text.lines().count(), summary.plants.len() + 1);
    }
}
