//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `mission_events.csv`
//! - `mission_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{MissionEventRow, MissionSummaryRow, OutputResult};

/// Writes mission output to two CSV files.
pub struct CsvWriter {
    events:    Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut events = Writer::from_path(dir.join("mission_events.csv"))?;
        events.write_record(["mission_id", "tick", "millisols", "kind", "detail"])?;

        let mut summaries = Writer::from_path(dir.join("mission_summaries.csv"))?;
        summaries.write_record([
            "mission_id",
            "mission_type",
            "lead",
            "members",
            "vehicle",
            "created_tick",
            "started_tick",
            "finished_tick",
            "statuses",
            "category",
            "success",
        ])?;

        Ok(Self { events, summaries, finished: false })
    }
}

/// Empty cell for a missing value.
fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_events(&mut self, rows: &[MissionEventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record(&[
                row.mission_id.to_string(),
                row.tick.to_string(),
                row.millisols.to_string(),
                row.kind.to_owned(),
                row.detail.clone(),
            ])?;
        }
        Ok(())
    }

    fn write_summary(&mut self, row: &MissionSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.mission_id.to_string(),
            row.mission_type.to_owned(),
            row.lead.to_string(),
            row.members.to_string(),
            opt(row.vehicle),
            opt(row.created_tick),
            opt(row.started_tick),
            opt(row.finished_tick),
            row.statuses.clone(),
            row.category.to_owned(),
            (row.success as u8).to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
