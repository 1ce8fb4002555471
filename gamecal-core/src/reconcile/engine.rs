//! Runs a reconciliation: snapshot, plan, ask, apply.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::confirm::{Answer, Confirmation};
use crate::constants::match_duration;
use crate::error::{GameCalError, GameCalResult};
use crate::event::{Code, Event};
use crate::ledger::RejectionLedger;
use crate::reconcile::{BatchReport, Change, ChangeKind, ChangeReport, Outcome, ReconcilePlan};
use crate::record::StoredEvent;
use crate::store::CalendarStore;

/// Reconciles one league into one calendar.
///
/// Every calendar-visible change goes through the confirmation channel,
/// strictly one prompt at a time.
pub struct Reconciler<S, C> {
    store: S,
    confirm: C,
    ledger: RejectionLedger,
    league: Code,
    time_zone: Option<String>,
    deadline: Option<Instant>,
}

impl<S: CalendarStore, C: Confirmation> Reconciler<S, C> {
    pub fn new(store: S, confirm: C, ledger: RejectionLedger, league: Code) -> Self {
        Reconciler {
            store,
            confirm,
            ledger,
            league,
            time_zone: None,
            deadline: None,
        }
    }

    /// Zone name written into inserted records.
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    /// Stop waiting for answers once `deadline` passes. Pending and remaining
    /// prompts resolve as unanswered; applied changes stay applied.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn league(&self) -> &Code {
        &self.league
    }

    pub fn ledger(&self) -> &RejectionLedger {
        &self.ledger
    }

    /// Decoded store entries starting at or after `since`, plus the number of
    /// records that could not be decoded.
    pub async fn snapshot(&self, since: DateTime<Utc>) -> GameCalResult<(Vec<StoredEvent>, usize)> {
        let records: Vec<_> = self
            .store
            .list_upcoming(since)
            .await?
            .into_iter()
            .filter(|r| r.start.with_timezone(&Utc) >= since)
            .collect();
        let total = records.len();

        let stored: Vec<StoredEvent> = records
            .into_iter()
            .filter_map(|record| {
                let title = record.title.clone();
                match StoredEvent::from_record(record) {
                    Ok(stored) => Some(stored),
                    Err(e) => {
                        tracing::warn!(title = %title, "Ignoring calendar entry: {e}");
                        None
                    }
                }
            })
            .collect();

        let undecodable = total - stored.len();
        Ok((stored, undecodable))
    }

    /// Compute what a run at `now` would propose, without asking anything.
    pub async fn plan(&self, desired: &[Event], now: DateTime<Utc>) -> GameCalResult<ReconcilePlan> {
        let since = now + match_duration();
        let (snapshot, _) = self.snapshot(since).await?;
        Ok(ReconcilePlan::compute(desired, &snapshot, &self.league, since))
    }

    pub async fn reconcile(&self, desired: &[Event]) -> GameCalResult<BatchReport> {
        self.reconcile_at(desired, Utc::now()).await
    }

    /// Run one reconciliation pass as of `now`.
    ///
    /// Per-change failures end up in the report. A ledger failure aborts the
    /// run, since losing a rejection would re-ask the same question forever.
    pub async fn reconcile_at(
        &self,
        desired: &[Event],
        now: DateTime<Utc>,
    ) -> GameCalResult<BatchReport> {
        let since = now + match_duration();
        let (snapshot, undecodable) = self.snapshot(since).await?;
        let plan = ReconcilePlan::compute(desired, &snapshot, &self.league, since);

        tracing::info!(
            league = %self.league,
            stored = snapshot.len(),
            additions = plan.additions.len(),
            deletions = plan.deletions.len(),
            "Planned reconciliation"
        );

        let mut reports = Vec::new();

        for change in plan.additions.into_iter().chain(plan.deletions) {
            match self.apply(&change).await {
                Err(GameCalError::Ledger(msg)) => {
                    let partial = BatchReport {
                        league: self.league.clone(),
                        reports,
                        undecodable,
                    };
                    return Err(aborted(msg, &partial));
                }
                result => {
                    log_outcome(&change, &result);
                    reports.push(ChangeReport { change, result });
                }
            }
        }

        Ok(BatchReport {
            league: self.league.clone(),
            reports,
            undecodable,
        })
    }

    async fn apply(&self, change: &Change) -> GameCalResult<Outcome> {
        match change.kind {
            ChangeKind::Add => self.apply_addition(&change.event, &change.prompt()).await,
            ChangeKind::Remove => {
                let id = change.store_id.as_deref().ok_or_else(|| {
                    GameCalError::InvalidEvent(format!("No store id for {}", change.event))
                })?;
                self.apply_removal(id, &change.prompt()).await
            }
        }
    }

    async fn apply_addition(&self, event: &Event, prompt: &str) -> GameCalResult<Outcome> {
        if self.ledger.contains(event)? {
            return Ok(Outcome::PreviouslyRejected);
        }

        match self.ask(prompt).await? {
            Answer::Yes => {
                let record = event.to_record().with_time_zone(self.time_zone.clone());
                let id = self.store.insert(&record).await?;
                tracing::debug!(id = %id, "Inserted calendar entry");
                Ok(Outcome::Applied)
            }
            Answer::No => {
                self.ledger.record(event)?;
                Ok(Outcome::Declined { remembered: true })
            }
            Answer::Timeout => Ok(Outcome::Unanswered),
        }
    }

    async fn apply_removal(&self, id: &str, prompt: &str) -> GameCalResult<Outcome> {
        match self.ask(prompt).await? {
            Answer::Yes => {
                self.store.delete(id).await?;
                Ok(Outcome::Applied)
            }
            Answer::No => Ok(Outcome::Declined { remembered: false }),
            Answer::Timeout => Ok(Outcome::Unanswered),
        }
    }

    async fn ask(&self, prompt: &str) -> GameCalResult<Answer> {
        let Some(deadline) = self.deadline else {
            return self.confirm.confirm(prompt).await;
        };

        if Instant::now() >= deadline {
            return Ok(Answer::Timeout);
        }

        match tokio::time::timeout_at(deadline, self.confirm.confirm(prompt)).await {
            Ok(answer) => answer,
            Err(_) => {
                tracing::warn!("Run deadline reached while waiting for an answer");
                Ok(Answer::Timeout)
            }
        }
    }
}

/// The ledger error, carrying whatever was already applied so the caller
/// can still report it.
fn aborted(msg: String, partial: &BatchReport) -> GameCalError {
    match partial.summary() {
        Some(summary) => {
            tracing::error!("Run aborted after applying changes:\n{summary}");
            GameCalError::Ledger(format!("{msg}\nAlready applied before the failure:\n{summary}"))
        }
        None => GameCalError::Ledger(msg),
    }
}

fn log_outcome(change: &Change, result: &GameCalResult<Outcome>) {
    match result {
        Ok(Outcome::Applied) => tracing::info!(change = %change, "Applied"),
        Ok(Outcome::PreviouslyRejected) => {
            tracing::debug!(change = %change, "Skipped, rejected before")
        }
        Ok(outcome) => tracing::info!(change = %change, "Not applied: {outcome}"),
        Err(e) if e.is_transport() => tracing::warn!(change = %change, "Failed: {e}"),
        Err(e) => tracing::error!(change = %change, "Failed: {e}"),
    }
}
