//! Turning feed rows into canonical events.
//!
//! Feeds describe games with local dates, free-text arena names and two team
//! names. The normalizer pins the local time to the configured zone, maps
//! arenas through the alias table and builds the teams line.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{GameCalError, GameCalResult};
use crate::event::{Code, Event};

/// Placeholders feeds use for "not decided yet".
const PLACEHOLDERS: &[&str] = &["", "-", "?", "tbd", "tba", "(не задано)", "хз"];

/// One game row as delivered by a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGame {
    /// `dd.mm.yyyy` or `yyyy-mm-dd`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    #[serde(default)]
    pub arena: Option<String>,
    #[serde(default)]
    pub home: String,
    #[serde(default)]
    pub away: String,
}

pub struct Normalizer {
    league: Code,
    time_zone: Tz,
    arenas: HashMap<String, String>,
}

impl Normalizer {
    pub fn new(league: Code, time_zone: Tz, arenas: HashMap<String, String>) -> Self {
        let arenas = arenas
            .into_iter()
            .map(|(name, code)| (name.trim().to_lowercase(), code))
            .collect();
        Normalizer {
            league,
            time_zone,
            arenas,
        }
    }

    pub fn normalize(&self, raw: &RawGame) -> GameCalResult<Event> {
        let occurs_at = self.occurs_at(&raw.date, &raw.time)?;
        let arena = self.arena(raw.arena.as_deref())?;

        Ok(Event::new(
            occurs_at.fixed_offset(),
            arena,
            self.league.clone(),
            teams_line(&raw.home, &raw.away),
        ))
    }

    /// Normalize every row, logging and dropping the ones that don't parse.
    pub fn normalize_all(&self, rows: &[RawGame]) -> Vec<Event> {
        rows.iter()
            .filter_map(|raw| match self.normalize(raw) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(league = %self.league, "Skipping game row: {e}");
                    None
                }
            })
            .collect()
    }

    fn occurs_at(&self, date: &str, time: &str) -> GameCalResult<chrono::DateTime<Tz>> {
        let date = parse_date(date.trim())?;
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .map_err(|_| GameCalError::InvalidEvent(format!("Invalid time '{time}'")))?;
        let local = NaiveDateTime::new(date, time);

        self.time_zone
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| {
                GameCalError::InvalidEvent(format!(
                    "Local time {local} is ambiguous or does not exist in {}",
                    self.time_zone
                ))
            })
    }

    fn arena(&self, raw: Option<&str>) -> GameCalResult<Option<Code>> {
        let Some(name) = raw.map(str::trim) else {
            return Ok(None);
        };
        if PLACEHOLDERS.contains(&name.to_lowercase().as_str()) {
            return Ok(None);
        }

        let code = match self.arenas.get(&name.to_lowercase()) {
            Some(alias) => alias.clone(),
            None => name.split_whitespace().collect::<Vec<_>>().join("-"),
        };
        Code::new(code).map(Some)
    }
}

fn parse_date(date: &str) -> GameCalResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"))
        .map_err(|_| {
            GameCalError::InvalidEvent(format!(
                "Invalid date '{date}'. Expected DD.MM.YYYY or YYYY-MM-DD"
            ))
        })
}

fn teams_line(home: &str, away: &str) -> String {
    match (home.trim(), away.trim()) {
        ("", "") => String::new(),
        (home, "") => home.to_string(),
        ("", away) => away.to_string(),
        (home, away) => format!("{home} vs {away}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        let mut arenas = HashMap::new();
        arenas.insert("Чижовка-Арена".to_string(), "Chizh".to_string());
        arenas.insert("Олимпик Арена".to_string(), "Olymp".to_string());
        Normalizer::new(Code::new("NHL").unwrap(), chrono_tz::Europe::Minsk, arenas)
    }

    fn row(date: &str, time: &str, arena: Option<&str>) -> RawGame {
        RawGame {
            date: date.to_string(),
            time: time.to_string(),
            arena: arena.map(String::from),
            home: "Dynamo".to_string(),
            away: "Yunost".to_string(),
        }
    }

    #[test]
    fn test_localizes_in_configured_zone() {
        let event = normalizer()
            .normalize(&row("10.01.2025", "19:00", Some("Чижовка-Арена")))
            .unwrap();

        assert_eq!(event.occurs_at.to_rfc3339(), "2025-01-10T19:00:00+03:00");
        assert_eq!(event.arena.unwrap().as_str(), "Chizh");
        assert_eq!(event.teams, "Dynamo vs Yunost");
        assert_eq!(event.league.as_str(), "NHL");
    }

    #[test]
    fn test_accepts_iso_dates() {
        let event = normalizer()
            .normalize(&row("2025-01-10", "19:00", None))
            .unwrap();
        assert_eq!(event.occurs_at.to_rfc3339(), "2025-01-10T19:00:00+03:00");
    }

    #[test]
    fn test_placeholder_arena_is_unknown() {
        let n = normalizer();
        assert!(n.normalize(&row("10.01.2025", "19:00", Some("(не задано)"))).unwrap().arena.is_none());
        assert!(n.normalize(&row("10.01.2025", "19:00", Some("  "))).unwrap().arena.is_none());
    }

    #[test]
    fn test_unaliased_arena_loses_whitespace() {
        let event = normalizer()
            .normalize(&row("10.01.2025", "19:00", Some("Ice  Palace East")))
            .unwrap();
        assert_eq!(event.arena.unwrap().as_str(), "Ice-Palace-East");
    }

    #[test]
    fn test_bad_rows_are_dropped() {
        let rows = vec![
            row("10.01.2025", "19:00", None),
            row("32.01.2025", "19:00", None),
            row("10.01.2025", "late", None),
        ];
        assert_eq!(normalizer().normalize_all(&rows).len(), 1);
    }

    #[test]
    fn test_teams_line_with_missing_side() {
        assert_eq!(teams_line("Dynamo", ""), "Dynamo");
        assert_eq!(teams_line(" ", " "), "");
    }
}
