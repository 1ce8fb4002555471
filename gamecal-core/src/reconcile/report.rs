//! Per-change outcomes and run totals.

use std::fmt;

use crate::error::GameCalResult;
use crate::event::Code;
use crate::reconcile::{Change, ChangeKind};

/// What happened to one proposed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Confirmed and written to the store.
    Applied,
    /// Declined. Additions are remembered in the ledger, removals are not.
    Declined { remembered: bool },
    /// Nobody answered in time; asked again next run.
    Unanswered,
    /// Declined on an earlier run; not asked again.
    PreviouslyRejected,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Applied => write!(f, "applied"),
            Outcome::Declined { remembered: true } => write!(f, "declined (remembered)"),
            Outcome::Declined { remembered: false } => write!(f, "declined"),
            Outcome::Unanswered => write!(f, "no answer"),
            Outcome::PreviouslyRejected => write!(f, "previously rejected"),
        }
    }
}

#[derive(Debug)]
pub struct ChangeReport {
    pub change: Change,
    pub result: GameCalResult<Outcome>,
}

impl ChangeReport {
    pub fn is_applied(&self, kind: ChangeKind) -> bool {
        self.change.kind == kind && matches!(self.result, Ok(Outcome::Applied))
    }
}

/// Counts of changes actually confirmed and applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    pub added: usize,
    pub removed: usize,
}

impl ReconcileResult {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Everything one reconciliation run did, change by change.
#[derive(Debug)]
pub struct BatchReport {
    pub league: Code,
    pub reports: Vec<ChangeReport>,
    /// Store records that could not be decoded and were left out.
    pub undecodable: usize,
}

impl BatchReport {
    pub fn result(&self) -> ReconcileResult {
        ReconcileResult {
            added: self.count_applied(ChangeKind::Add),
            removed: self.count_applied(ChangeKind::Remove),
        }
    }

    fn count_applied(&self, kind: ChangeKind) -> usize {
        self.reports.iter().filter(|r| r.is_applied(kind)).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ChangeReport> {
        self.reports.iter().filter(|r| r.result.is_err())
    }

    /// Message for the notifier, or `None` when nothing changed.
    pub fn summary(&self) -> Option<String> {
        let result = self.result();
        if result.is_empty() {
            return None;
        }

        let mut lines = vec![format!(
            "{}: {} added, {} removed",
            self.league, result.added, result.removed
        )];
        lines.extend(
            self.reports
                .iter()
                .filter(|r| matches!(r.result, Ok(Outcome::Applied)))
                .map(|r| format!("{} {}", r.change.kind, r.change.event.describe())),
        );

        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameCalError;
    use crate::event::Event;
    use chrono::{FixedOffset, TimeZone};

    fn change(kind: ChangeKind) -> Change {
        let event = Event::new(
            FixedOffset::east_opt(3 * 3600)
                .unwrap()
                .with_ymd_and_hms(2025, 1, 10, 19, 0, 0)
                .unwrap(),
            None,
            Code::new("NHL").unwrap(),
            "X vs Y",
        );
        match kind {
            ChangeKind::Add => Change::add(event),
            ChangeKind::Remove => Change {
                kind,
                event,
                store_id: Some("1".into()),
            },
        }
    }

    fn batch(reports: Vec<ChangeReport>) -> BatchReport {
        BatchReport {
            league: Code::new("NHL").unwrap(),
            reports,
            undecodable: 0,
        }
    }

    #[test]
    fn test_counts_only_applied_changes() {
        let report = batch(vec![
            ChangeReport { change: change(ChangeKind::Add), result: Ok(Outcome::Applied) },
            ChangeReport {
                change: change(ChangeKind::Add),
                result: Ok(Outcome::Declined { remembered: true }),
            },
            ChangeReport { change: change(ChangeKind::Remove), result: Ok(Outcome::Unanswered) },
            ChangeReport {
                change: change(ChangeKind::Remove),
                result: Err(GameCalError::Provider("503".into())),
            },
        ]);

        assert_eq!(report.result(), ReconcileResult { added: 1, removed: 0 });
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_summary_is_silent_without_changes() {
        let report = batch(vec![ChangeReport {
            change: change(ChangeKind::Add),
            result: Ok(Outcome::Unanswered),
        }]);
        assert!(report.summary().is_none());
    }

    #[test]
    fn test_summary_lists_applied_changes() {
        let report = batch(vec![ChangeReport {
            change: change(ChangeKind::Remove),
            result: Ok(Outcome::Applied),
        }]);

        let summary = report.summary().unwrap();
        assert!(summary.starts_with("NHL: 0 added, 1 removed"));
        assert!(summary.contains("- X vs Y"));
    }
}
