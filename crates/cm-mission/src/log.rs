//! Append-only mission journal.

use cm_core::Tick;

/// One journal line.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub tick:        Tick,
    pub description: String,
}

/// Timestamped record of a mission's life.
///
/// Entries are kept in insertion order, which is also chronological since
/// simulated time never runs backward.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MissionLog {
    entries:  Vec<LogEntry>,
    created:  Option<Tick>,
    started:  Option<Tick>,
    finished: Option<Tick>,
}

impl MissionLog {
    pub fn new(created: Tick) -> Self {
        Self { created: Some(created), ..Self::default() }
    }

    pub fn add_entry(&mut self, tick: Tick, description: impl Into<String>) {
        debug_assert!(
            self.entries.last().is_none_or(|e| e.tick <= tick),
            "log entries must be chronological"
        );
        self.entries.push(LogEntry { tick, description: description.into() });
    }

    /// Stamp the first instant the mission left review.  Later calls are
    /// ignored.
    pub fn mark_started(&mut self, tick: Tick) {
        self.started.get_or_insert(tick);
    }

    pub fn mark_finished(&mut self, tick: Tick) {
        self.finished.get_or_insert(tick);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn created(&self) -> Option<Tick> {
        self.created
    }

    pub fn started(&self) -> Option<Tick> {
        self.started
    }

    pub fn finished(&self) -> Option<Tick> {
        self.finished
    }
}
