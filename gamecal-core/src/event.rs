//! The canonical game event.
//!
//! An `Event` is one scheduled game. Sources build them from feed rows and the
//! store codec rebuilds them from calendar records. They are never mutated:
//! reconciliation replaces events, it does not edit them.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GameCalError, GameCalResult};

/// A short whitespace-free tag, used for leagues and arenas.
///
/// Store titles pack the arena and league into one string split on
/// whitespace, so a code can never contain any.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code(String);

impl Code {
    pub fn new(code: impl Into<String>) -> GameCalResult<Self> {
        let code = code.into();
        if code.is_empty() || code.chars().any(char::is_whitespace) {
            return Err(GameCalError::InvalidCode(code));
        }
        Ok(Code(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Code {
    type Error = GameCalError;

    fn try_from(value: String) -> GameCalResult<Self> {
        Code::new(value)
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One scheduled game.
///
/// `Event` deliberately has no `PartialEq`/`Hash`: sameness is the narrower
/// [`EventKey`], and every set or map operation goes through [`Event::key`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub occurs_at: DateTime<FixedOffset>,
    pub arena: Option<Code>,
    pub league: Code,
    pub teams: String,
}

/// Identity of an event: the instant it starts and who plays.
///
/// Arena and league are descriptive. A venue change keeps the key, a
/// rescheduled game gets a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub starts: DateTime<Utc>,
    pub teams: String,
}

impl Event {
    pub fn new(
        occurs_at: DateTime<FixedOffset>,
        arena: Option<Code>,
        league: Code,
        teams: impl Into<String>,
    ) -> Self {
        Event {
            occurs_at,
            arena,
            league,
            teams: teams.into(),
        }
    }

    pub fn key(&self) -> EventKey {
        EventKey {
            starts: self.occurs_at.with_timezone(&Utc),
            teams: self.teams.clone(),
        }
    }

    pub fn is_same_as(&self, other: &Event) -> bool {
        self.key() == other.key()
    }

    pub fn ends_at(&self) -> DateTime<FixedOffset> {
        self.occurs_at + crate::constants::match_duration()
    }

    pub fn in_league(&self, league: &Code) -> bool {
        &self.league == league
    }

    pub fn arena_label(&self) -> &str {
        self.arena
            .as_ref()
            .map(Code::as_str)
            .unwrap_or(crate::constants::UNKNOWN_ARENA)
    }

    /// Human-readable line used in confirmation prompts.
    pub fn describe(&self) -> String {
        let teams = if self.teams.is_empty() {
            "(teams not announced)"
        } else {
            &self.teams
        };
        format!(
            "{} {} @ {} [{}]",
            teams,
            self.occurs_at.format("%a %d.%m.%Y %H:%M"),
            self.arena_label(),
            self.league
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.arena_label(),
            self.league,
            self.occurs_at.to_rfc3339(),
            self.teams
        )
    }
}
