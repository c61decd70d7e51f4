//! `cm-output`: mission output writers for the colony mission engine.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                      |
//! |-----------|---------|----------------------------------------------------|
//! | *(none)*  | CSV     | `mission_events.csv`, `mission_summaries.csv`      |
//! | `sqlite`  | SQLite  | `output.db`                                        |
//!
//! Both backends implement [`OutputWriter`] and are driven by
//! [`MissionOutputObserver`], which implements `cm_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cm_output::{CsvWriter, MissionOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = MissionOutputObserver::new(writer, &config);
//! sim.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::MissionOutputObserver;
pub use row::{MissionEventRow, MissionSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
