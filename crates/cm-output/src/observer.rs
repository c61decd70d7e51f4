//! `MissionOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use tracing::warn;

use cm_core::{SimClock, SimConfig, Tick};
use cm_mission::{Mission, MissionEvent};
use cm_sim::SimObserver;

use crate::row::{MissionEventRow, MissionSummaryRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes mission events and summaries to any
/// [`OutputWriter`] backend (CSV, SQLite).
///
/// Events are buffered for the current tick and written as one batch when the
/// tick ends.  Errors from the writer are stored internally because
/// `SimObserver` methods have no return value.  After `sim.run()` returns,
/// check for errors with [`take_error`][Self::take_error].
pub struct MissionOutputObserver<W: OutputWriter> {
    writer:     W,
    clock:      SimClock,
    pending:    Vec<MissionEventRow>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> MissionOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for the
    /// tick-to-millisol conversion.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            clock:      config.make_clock(),
            pending:    Vec::new(),
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn flush_events(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let rows = std::mem::take(&mut self.pending);
        let result = self.writer.write_events(&rows);
        self.store_err(result);
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for MissionOutputObserver<W> {
    fn on_mission_event(&mut self, event: &MissionEvent) {
        self.pending.push(MissionEventRow::new(event, &self.clock));
    }

    fn on_mission_end(&mut self, mission: &Mission) {
        let result = self.writer.write_summary(&MissionSummaryRow::new(mission));
        self.store_err(result);
    }

    fn on_tick_end(&mut self, _tick: Tick, _steps: usize) {
        self.flush_events();
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        self.flush_events();
        let result = self.writer.finish();
        self.store_err(result);
    }
}
