//! gamecal configuration.
//!
//! Lives at `~/.config/gamecal/config.toml`; `GAMECAL_*` environment
//! variables override top-level keys. Loaded once at startup and handed to
//! whatever needs it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONFIRM_TIMEOUT_SECS;
use crate::error::{GameCalError, GameCalResult};
use crate::event::Code;
use crate::ledger::RejectionLedger;
use crate::remote::Remote;

static DEFAULT_TIME_ZONE: &str = "UTC";

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_confirm_timeout() -> String {
    format!("{DEFAULT_CONFIRM_TIMEOUT_SECS}s")
}

/// Where a feed lives and which league its games belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub league: String,
    /// File path or http(s) URL of a JSON array of game rows.
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCalConfig {
    /// League reconciled by default.
    pub league: Option<String>,

    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    pub ledger_path: Option<PathBuf>,

    #[serde(default = "default_confirm_timeout")]
    pub confirm_timeout: String,

    /// Give up waiting for answers after this long (e.g. "20m").
    pub run_deadline: Option<String>,

    /// Calendar each league is written to.
    #[serde(default)]
    pub calendars: HashMap<String, Remote>,

    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    /// Feed arena name -> short code used in calendar titles.
    #[serde(default)]
    pub arenas: HashMap<String, String>,

    pub telegram: Option<TelegramConfig>,
}

impl GameCalConfig {
    pub fn config_path() -> GameCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GameCalError::Config("Could not determine config directory".into()))?
            .join("gamecal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user's config, writing a commented template first if there is none.
    pub fn load() -> GameCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> GameCalResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("GAMECAL"))
            .build()
            .map_err(|e| GameCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| GameCalError::Config(e.to_string()))
    }

    /// The league to reconcile: the explicit choice, else the configured one.
    pub fn league(&self, explicit: Option<&str>) -> GameCalResult<Code> {
        let league = explicit
            .or(self.league.as_deref())
            .ok_or_else(|| GameCalError::Config("No league given and none configured".into()))?;
        Code::new(league).map_err(|e| GameCalError::Config(e.to_string()))
    }

    /// Calendar binding for `league`. Checked before any network call.
    pub fn calendar(&self, league: &Code) -> GameCalResult<&Remote> {
        self.calendars
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(league.as_str()))
            .map(|(_, remote)| remote)
            .ok_or_else(|| GameCalError::NoCalendarBinding(league.to_string()))
    }

    pub fn sources_for(&self, league: &Code) -> Vec<&SourceConfig> {
        self.sources
            .iter()
            .filter(|s| s.league.eq_ignore_ascii_case(league.as_str()))
            .collect()
    }

    pub fn tz(&self) -> GameCalResult<Tz> {
        self.time_zone
            .parse()
            .map_err(|_| GameCalError::Config(format!("Unknown time zone '{}'", self.time_zone)))
    }

    pub fn confirm_timeout(&self) -> GameCalResult<Duration> {
        parse_duration("confirm_timeout", &self.confirm_timeout)
    }

    pub fn run_deadline(&self) -> GameCalResult<Option<Duration>> {
        self.run_deadline
            .as_deref()
            .map(|d| parse_duration("run_deadline", d))
            .transpose()
    }

    pub fn ledger(&self) -> GameCalResult<RejectionLedger> {
        let path = match &self.ledger_path {
            Some(path) => expand_path(path),
            None => RejectionLedger::default_path()?,
        };
        Ok(RejectionLedger::open(path))
    }

    /// Create a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> GameCalResult<()> {
        let contents = format!(
            "\
# gamecal configuration

# League reconciled when --league is not given:
# league = \"NHL\"

# Zone the feeds' local times are in:
# time_zone = \"{DEFAULT_TIME_ZONE}\"

# How long to wait for each answer, and for the whole run:
# confirm_timeout = \"{}\"
# run_deadline = \"30m\"

# Where declined games are remembered:
# ledger_path = \"~/.local/share/gamecal/{}\"

# [calendars.NHL]
# provider = \"google\"
# google_account = \"you@gmail.com\"
# google_calendar = \"Hockey\"

# [[sources]]
# league = \"NHL\"
# location = \"https://example.org/nhl/schedule.json\"

# [arenas]
# \"Olympic Arena\" = \"Olymp\"

# [telegram]
# token = \"123456:ABC\"
# chat_id = \"42\"
",
            default_confirm_timeout(),
            crate::ledger::DEFAULT_LEDGER_FILE,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GameCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| GameCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn parse_duration(key: &str, value: &str) -> GameCalResult<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| GameCalError::Config(format!("Invalid {key} '{value}': {e}")))
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_template_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gamecal/config.toml");

        GameCalConfig::create_default_config(&path).unwrap();
        let config = GameCalConfig::load_from(&path).unwrap();

        assert_eq!(config.time_zone, "UTC");
        assert_eq!(config.confirm_timeout().unwrap(), Duration::from_secs(60));
        assert!(config.run_deadline().unwrap().is_none());
        assert!(config.calendars.is_empty());
    }

    #[test]
    fn test_calendar_binding_lookup() {
        let (_dir, path) = write_config(
            r#"
league = "NHL"
time_zone = "Europe/Minsk"
confirm_timeout = "90s"

[calendars.NHL]
provider = "google"
google_account = "me@example.com"
google_calendar = "Hockey"

[[sources]]
league = "NHL"
location = "/tmp/nhl.json"

[[sources]]
league = "LHL"
location = "/tmp/lhl.json"
"#,
        );

        let config = GameCalConfig::load_from(&path).unwrap();
        let league = config.league(None).unwrap();

        assert_eq!(league.as_str(), "NHL");
        assert_eq!(config.calendar(&league).unwrap().provider.name(), "google");
        assert_eq!(config.sources_for(&league).len(), 1);
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Minsk);
        assert_eq!(config.confirm_timeout().unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn test_missing_binding_is_configuration_error() {
        let (_dir, path) = write_config("league = \"LHL\"\n");
        let config = GameCalConfig::load_from(&path).unwrap();
        let league = config.league(None).unwrap();

        assert!(matches!(
            config.calendar(&league),
            Err(GameCalError::NoCalendarBinding(_))
        ));
    }

    #[test]
    fn test_explicit_league_wins() {
        let (_dir, path) = write_config("league = \"LHL\"\n");
        let config = GameCalConfig::load_from(&path).unwrap();

        assert_eq!(config.league(Some("NHL")).unwrap().as_str(), "NHL");
        assert!(config.league(Some("N H L")).is_err());
    }

    #[test]
    fn test_bad_time_zone_and_duration_are_rejected() {
        let (_dir, path) = write_config("time_zone = \"Mars/Olympus\"\nconfirm_timeout = \"soon\"\n");
        let config = GameCalConfig::load_from(&path).unwrap();

        assert!(config.tz().is_err());
        assert!(config.confirm_timeout().is_err());
    }
}
