//! Store record codec.
//!
//! Calendar stores only know titles, descriptions and start/end times. An
//! event is packed into a record as:
//!
//! - title: `"<arena> <league>"` (`TBD` when the arena is unknown)
//! - description: the teams
//! - start: `occurs_at`, end: `occurs_at` + match duration
//!
//! Decoding is the inverse on the identity fields. Arena and league survive
//! as long as they contain no whitespace, which [`Code`] guarantees.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN_ARENA;
use crate::error::{GameCalError, GameCalResult};
use crate::event::{Code, Event};

/// A provider-neutral calendar entry, as exchanged with providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Store-assigned id; empty until the record has been inserted.
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// IANA zone name the store should display the entry in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// An event that currently lives in the store, with its store id.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub id: String,
    pub event: Event,
}

impl Event {
    pub fn to_record(&self) -> StoreRecord {
        StoreRecord {
            id: String::new(),
            title: format!("{} {}", self.arena_label(), self.league),
            description: Some(self.teams.clone()),
            start: self.occurs_at,
            end: self.ends_at(),
            time_zone: None,
        }
    }
}

impl StoreRecord {
    pub fn with_time_zone(mut self, time_zone: Option<String>) -> Self {
        self.time_zone = time_zone;
        self
    }
}

impl StoredEvent {
    pub fn from_record(record: StoreRecord) -> GameCalResult<Self> {
        let tokens: Vec<&str> = record.title.split_whitespace().collect();
        let &[arena, league] = tokens.as_slice() else {
            return Err(GameCalError::Decode(format!(
                "title '{}' is not '<arena> <league>'",
                record.title
            )));
        };

        let arena = if arena == UNKNOWN_ARENA {
            None
        } else {
            Some(Code::new(arena).map_err(|e| GameCalError::Decode(e.to_string()))?)
        };
        let league = Code::new(league).map_err(|e| GameCalError::Decode(e.to_string()))?;

        let event = Event::new(
            record.start,
            arena,
            league,
            record.description.unwrap_or_default(),
        );

        Ok(StoredEvent {
            id: record.id,
            event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 10, 19, 0, 0)
            .unwrap()
    }

    fn record(title: &str) -> StoreRecord {
        StoreRecord {
            id: "abc123".to_string(),
            title: title.to_string(),
            description: Some("X vs Y".to_string()),
            start: start(),
            end: start() + Duration::minutes(75),
            time_zone: None,
        }
    }

    #[test]
    fn test_record_roundtrip_keeps_identity_and_codes() {
        let event = Event::new(
            start(),
            Some(Code::new("Chizh").unwrap()),
            Code::new("NHL").unwrap(),
            "Dynamo vs Yunost",
        );

        let record = event.to_record();
        assert_eq!(record.title, "Chizh NHL");
        assert_eq!(record.end - record.start, Duration::minutes(75));

        let decoded = StoredEvent::from_record(record).unwrap().event;
        assert!(decoded.is_same_as(&event));
        assert_eq!(decoded.arena, event.arena);
        assert_eq!(decoded.league, event.league);
    }

    #[test]
    fn test_unknown_arena_roundtrips_as_none() {
        let event = Event::new(start(), None, Code::new("NHL").unwrap(), "");

        let record = event.to_record();
        assert_eq!(record.title, "TBD NHL");

        let decoded = StoredEvent::from_record(record).unwrap().event;
        assert!(decoded.arena.is_none());
        assert_eq!(decoded.teams, "");
    }

    #[test]
    fn test_decode_keeps_store_id() {
        let stored = StoredEvent::from_record(record("Park NHL")).unwrap();
        assert_eq!(stored.id, "abc123");
        assert_eq!(stored.event.teams, "X vs Y");
    }

    #[test]
    fn test_decode_rejects_malformed_titles() {
        assert!(StoredEvent::from_record(record("Dentist")).is_err());
        assert!(StoredEvent::from_record(record("Big Rink NHL")).is_err());
        assert!(StoredEvent::from_record(record("")).is_err());
    }

    #[test]
    fn test_missing_description_decodes_as_empty_teams() {
        let mut rec = record("Park NHL");
        rec.description = None;
        let stored = StoredEvent::from_record(rec).unwrap();
        assert_eq!(stored.event.teams, "");
    }
}
