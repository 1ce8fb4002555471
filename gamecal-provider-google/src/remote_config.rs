//! Google-specific calendar binding.
//!
//! gamecal-core passes the binding keys through untyped; this gives them
//! shape. A calendar is picked by id (`google_calendar_id`) or by its
//! display name (`google_calendar`); with neither, the primary calendar.

use anyhow::{Context, Result, anyhow};
use google_calendar::Client;
use google_calendar::types::MinAccessRole;
use serde_json::{Map, Value};

/// Google's alias for the account's main calendar.
const PRIMARY_CALENDAR_ID: &str = "primary";

#[derive(Debug, Clone, PartialEq)]
pub enum CalendarRef {
    Id(String),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoogleRemoteConfig {
    pub google_account: String,
    pub calendar: CalendarRef,
}

impl TryFrom<&Map<String, Value>> for GoogleRemoteConfig {
    type Error = anyhow::Error;

    fn try_from(map: &Map<String, Value>) -> Result<Self> {
        let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);

        let google_account =
            field("google_account").ok_or_else(|| anyhow!("Missing required field: google_account"))?;

        let calendar = match (field("google_calendar_id"), field("google_calendar")) {
            (Some(id), _) => CalendarRef::Id(id),
            (None, Some(name)) => CalendarRef::Name(name),
            (None, None) => CalendarRef::Id(PRIMARY_CALENDAR_ID.to_string()),
        };

        Ok(GoogleRemoteConfig {
            google_account,
            calendar,
        })
    }
}

impl GoogleRemoteConfig {
    /// The calendar id to call the events API with. Names are looked up in
    /// the account's calendar list.
    pub async fn calendar_id(&self, client: &Client) -> Result<String> {
        let name = match &self.calendar {
            CalendarRef::Id(id) => return Ok(id.clone()),
            CalendarRef::Name(name) => name,
        };

        let calendars = client
            .calendar_list()
            .list_all(MinAccessRole::default(), false, false)
            .await
            .context("Failed to fetch calendars")?
            .body;

        calendars
            .into_iter()
            .find(|cal| &cal.summary == name)
            .map(|cal| cal.id)
            .ok_or_else(|| anyhow!("No calendar named '{name}' in {}", self.google_account))
    }
}
