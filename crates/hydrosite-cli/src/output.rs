//! Output formatting for run summaries.
//!
//! Summaries go to stdout; logs go to stderr so the two never mix.

use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;

use hydrosite_lib::{PlanSummary, SummaryRenderMode};

/// Format of the summary printed after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one line per plant.
    #[default]
    Text,
    /// Markdown table.
    Rich,
    /// Pretty-printed JSON summary, including the run configuration.
    Json,
    /// One CSV record per plant.
    Csv,
}

impl OutputFormat {
    /// Print `summary` to stdout.
    pub fn render_summary(self, summary: &PlanSummary) -> Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.write_summary(summary, &mut handle)?;
        handle.flush()?;
        Ok(())
    }

    pub fn write_summary<W: Write>(self, summary: &PlanSummary, out: &mut W) -> Result<()> {
        match self {
            OutputFormat::Text => {
                out.write_all(summary.render(SummaryRenderMode::PlainText).as_bytes())?
            }
            OutputFormat::Rich => {
                out.write_all(summary.render(SummaryRenderMode::RichText).as_bytes())?
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, summary)?;
                out.write_all(b"\n")?;
            }
            OutputFormat::Csv => summary.write_csv(&mut *out)?,
        }
        Ok(())
    }
}
