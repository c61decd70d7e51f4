//! The `OutputWriter` trait implemented by all backend writers.

use crate::{MissionEventRow, MissionSummaryRow, OutputResult};

/// Trait implemented by the CSV and SQLite writers.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`MissionOutputObserver::take_error`][crate::MissionOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of mission events (one tick's worth).
    fn write_events(&mut self, rows: &[MissionEventRow]) -> OutputResult<()>;

    /// Write the summary of one finished mission.
    fn write_summary(&mut self, row: &MissionSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
