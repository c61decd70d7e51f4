//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `mission_events` and `mission_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{MissionEventRow, MissionSummaryRow, OutputResult};

/// Writes mission output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS mission_events (
                 mission_id INTEGER NOT NULL,
                 tick       INTEGER NOT NULL,
                 millisols  REAL    NOT NULL,
                 kind       TEXT    NOT NULL,
                 detail     TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS mission_summaries (
                 mission_id    INTEGER PRIMARY KEY,
                 mission_type  TEXT    NOT NULL,
                 lead          INTEGER NOT NULL,
                 members       INTEGER NOT NULL,
                 vehicle       INTEGER,
                 created_tick  INTEGER,
                 started_tick  INTEGER,
                 finished_tick INTEGER,
                 statuses      TEXT    NOT NULL,
                 category      TEXT    NOT NULL,
                 success       INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_events(&mut self, rows: &[MissionEventRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO mission_events (mission_id, tick, millisols, kind, detail) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.mission_id,
                    row.tick as i64,
                    row.millisols,
                    row.kind,
                    row.detail,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_summary(&mut self, row: &MissionSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO mission_summaries \
             (mission_id, mission_type, lead, members, vehicle, created_tick, started_tick, \
              finished_tick, statuses, category, success) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                row.mission_id,
                row.mission_type,
                row.lead,
                row.members,
                row.vehicle,
                row.created_tick.map(|t| t as i64),
                row.started_tick.map(|t| t as i64),
                row.finished_tick.map(|t| t as i64),
                row.statuses,
                row.category,
                row.success as i64,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
