use chrono::Duration;

/// Every game occupies this many minutes in the calendar.
pub const MATCH_DURATION_MINUTES: i64 = 75;

/// Title placeholder for games whose arena is not announced yet.
pub const UNKNOWN_ARENA: &str = "TBD";

/// Default time the confirmation channel waits for an answer.
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 60;

pub fn match_duration() -> Duration {
    Duration::minutes(MATCH_DURATION_MINUTES)
}
