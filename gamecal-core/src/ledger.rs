//! Rejection ledger: events a human declined to add.
//!
//! Stored as JSON lines (one event per line) so the file stays readable and
//! diffable. Entries are only ever appended; lookups read the whole file and
//! compare by [`EventKey`](crate::event::EventKey), so duplicate lines are
//! harmless.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{GameCalError, GameCalResult};
use crate::event::{Event, EventKey};

pub const DEFAULT_LEDGER_FILE: &str = "rejected.jsonl";

#[derive(Debug, Clone)]
pub struct RejectionLedger {
    path: PathBuf,
}

impl RejectionLedger {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        RejectionLedger { path: path.into() }
    }

    /// Default location: `<data dir>/gamecal/rejected.jsonl`.
    pub fn default_path() -> GameCalResult<PathBuf> {
        let dir = dirs::data_dir()
            .ok_or_else(|| GameCalError::Config("Could not determine data directory".into()))?
            .join("gamecal");
        Ok(dir.join(DEFAULT_LEDGER_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every parseable entry, in file order.
    pub fn entries(&self) -> GameCalResult<Vec<Event>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(GameCalError::Ledger(format!(
                    "Could not read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let events = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(n, line)| match serde_json::from_str::<Event>(line) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        line = n + 1,
                        "Skipping unreadable ledger entry: {e}"
                    );
                    None
                }
            })
            .collect();

        Ok(events)
    }

    pub fn keys(&self) -> GameCalResult<HashSet<EventKey>> {
        Ok(self.entries()?.iter().map(Event::key).collect())
    }

    pub fn contains(&self, event: &Event) -> GameCalResult<bool> {
        Ok(self.keys()?.contains(&event.key()))
    }

    /// Append a declined event. Failing to write is an error the caller must
    /// not swallow, or the same game would be asked about on every run.
    pub fn record(&self, event: &Event) -> GameCalResult<()> {
        let line = serde_json::to_string(event)
            .map_err(|e| GameCalError::Serialization(e.to_string()))?;

        self.append_line(&line).map_err(|e| {
            GameCalError::Ledger(format!("Could not write {}: {e}", self.path.display()))
        })?;

        tracing::debug!(event = %event, "Recorded rejection");
        Ok(())
    }

    fn append_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        file.sync_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Code;
    use chrono::{FixedOffset, TimeZone};

    fn event(hour: u32, teams: &str) -> Event {
        Event::new(
            FixedOffset::east_opt(3 * 3600)
                .unwrap()
                .with_ymd_and_hms(2025, 1, 10, hour, 0, 0)
                .unwrap(),
            Some(Code::new("Park").unwrap()),
            Code::new("NHL").unwrap(),
            teams,
        )
    }

    #[test]
    fn test_missing_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = RejectionLedger::open(dir.path().join("nope.jsonl"));

        assert!(ledger.entries().unwrap().is_empty());
        assert!(!ledger.contains(&event(19, "X vs Y")).unwrap());
    }

    #[test]
    fn test_record_then_contains_by_identity() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = RejectionLedger::open(dir.path().join("state/rejected.jsonl"));

        ledger.record(&event(19, "X vs Y")).unwrap();

        let mut moved = event(19, "X vs Y");
        moved.arena = None;
        assert!(ledger.contains(&moved).unwrap());
        assert!(!ledger.contains(&event(20, "X vs Y")).unwrap());
    }

    #[test]
    fn test_duplicates_are_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = RejectionLedger::open(dir.path().join("rejected.jsonl"));

        ledger.record(&event(19, "X vs Y")).unwrap();
        ledger.record(&event(19, "X vs Y")).unwrap();

        assert_eq!(ledger.entries().unwrap().len(), 2);
        assert_eq!(ledger.keys().unwrap().len(), 1);
    }

    #[test]
    fn test_one_event_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rejected.jsonl");
        let ledger = RejectionLedger::open(&path);

        ledger.record(&event(19, "X vs Y")).unwrap();
        ledger.record(&event(21, "A vs B")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().all(|l| l.starts_with('{')));
    }

    #[test]
    fn test_unreadable_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rejected.jsonl");
        let ledger = RejectionLedger::open(&path);

        ledger.record(&event(19, "X vs Y")).unwrap();
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();

        assert_eq!(ledger.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_write_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be opened for append.
        let ledger = RejectionLedger::open(dir.path());

        let err = ledger.record(&event(19, "X vs Y")).unwrap_err();
        assert!(matches!(err, GameCalError::Ledger(_)));
    }
}
