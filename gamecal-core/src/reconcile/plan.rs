//! Diff between the desired schedule and the store snapshot.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::event::{Code, Event, EventKey};
use crate::reconcile::Change;
use crate::record::StoredEvent;

/// Changes that would make the store match the desired schedule for one
/// league. Nothing here has been asked or applied yet.
#[derive(Debug, Clone)]
pub struct ReconcilePlan {
    pub league: Code,
    /// Start of the open window; earlier games are frozen.
    pub since: DateTime<Utc>,
    pub additions: Vec<Change>,
    pub deletions: Vec<Change>,
}

impl ReconcilePlan {
    /// `snapshot` must already be limited to games starting at or after
    /// `since`. Desired games inside the frozen window are left alone too.
    pub fn compute(
        desired: &[Event],
        snapshot: &[StoredEvent],
        league: &Code,
        since: DateTime<Utc>,
    ) -> Self {
        let desired: Vec<&Event> = desired
            .iter()
            .filter(|e| e.in_league(league))
            .filter(|e| e.occurs_at.with_timezone(&Utc) >= since)
            .collect();

        let stored_keys: HashSet<EventKey> = snapshot.iter().map(|s| s.event.key()).collect();
        let desired_keys: HashSet<EventKey> = desired.iter().map(|e| e.key()).collect();

        let mut seen = HashSet::new();
        let mut additions: Vec<Change> = desired
            .into_iter()
            .filter(|e| !stored_keys.contains(&e.key()))
            .filter(|e| seen.insert(e.key()))
            .map(|e| Change::add(e.clone()))
            .collect();

        let mut deletions: Vec<Change> = snapshot
            .iter()
            .filter(|s| s.event.in_league(league))
            .filter(|s| !desired_keys.contains(&s.event.key()))
            .map(|s| Change::remove(s.clone()))
            .collect();

        let by_start = |a: &Change, b: &Change| a.event.key().cmp(&b.event.key());
        additions.sort_by(by_start);
        deletions.sort_by(by_start);

        ReconcilePlan {
            league: league.clone(),
            since,
            additions,
            deletions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty()
    }

    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.additions.iter().chain(self.deletions.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
    }

    fn game(hours: i64, league: &str, teams: &str) -> Event {
        Event::new(
            (now() + Duration::hours(hours)).fixed_offset(),
            None,
            Code::new(league).unwrap(),
            teams,
        )
    }

    fn stored(id: &str, event: Event) -> StoredEvent {
        StoredEvent {
            id: id.to_string(),
            event,
        }
    }

    fn nhl() -> Code {
        Code::new("NHL").unwrap()
    }

    fn since() -> DateTime<Utc> {
        now() + Duration::minutes(75)
    }

    #[test]
    fn test_equal_sets_produce_empty_plan() {
        let desired = vec![game(5, "NHL", "X vs Y"), game(30, "NHL", "A vs B")];
        let snapshot = vec![
            stored("1", game(30, "NHL", "A vs B")),
            stored("2", game(5, "NHL", "X vs Y")),
        ];

        let plan = ReconcilePlan::compute(&desired, &snapshot, &nhl(), since());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_venue_change_is_not_a_change() {
        let mut moved = game(5, "NHL", "X vs Y");
        moved.arena = Some(Code::new("Olymp").unwrap());
        let snapshot = vec![stored("1", game(5, "NHL", "X vs Y"))];

        let plan = ReconcilePlan::compute(&[moved], &snapshot, &nhl(), since());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_reschedule_is_remove_plus_add() {
        let snapshot = vec![stored("1", game(5, "NHL", "X vs Y"))];
        let desired = vec![game(6, "NHL", "X vs Y")];

        let plan = ReconcilePlan::compute(&desired, &snapshot, &nhl(), since());
        assert_eq!(plan.additions.len(), 1);
        assert_eq!(plan.deletions.len(), 1);
        assert_eq!(plan.deletions[0].store_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_other_leagues_are_ignored_on_both_sides() {
        let desired = vec![game(5, "LHL", "X vs Y")];
        let snapshot = vec![stored("1", game(8, "ALH", "C vs D"))];

        let plan = ReconcilePlan::compute(&desired, &snapshot, &nhl(), since());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_frozen_window_is_left_alone() {
        // Starts in 30 minutes: already inside the frozen window.
        let soon = Event::new(
            (now() + Duration::minutes(30)).fixed_offset(),
            None,
            nhl(),
            "X vs Y",
        );

        let plan = ReconcilePlan::compute(&[soon], &[], &nhl(), since());
        assert!(plan.additions.is_empty());
    }

    #[test]
    fn test_duplicate_desired_games_are_proposed_once() {
        let desired = vec![game(5, "NHL", "X vs Y"), game(5, "NHL", "X vs Y")];

        let plan = ReconcilePlan::compute(&desired, &[], &nhl(), since());
        assert_eq!(plan.additions.len(), 1);
    }

    #[test]
    fn test_store_entry_of_other_league_satisfies_addition() {
        // Identity ignores league: a matching entry filed under another
        // league still counts as present.
        let desired = vec![game(5, "NHL", "X vs Y")];
        let snapshot = vec![stored("1", game(5, "LHL", "X vs Y"))];

        let plan = ReconcilePlan::compute(&desired, &snapshot, &nhl(), since());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_changes_are_sorted_by_start() {
        let desired = vec![game(30, "NHL", "late"), game(5, "NHL", "early")];

        let plan = ReconcilePlan::compute(&desired, &[], &nhl(), since());
        let teams: Vec<_> = plan.additions.iter().map(|c| c.event.teams.as_str()).collect();
        assert_eq!(teams, vec!["early", "late"]);
    }
}
