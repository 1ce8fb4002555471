//! Conversion between store records and Google Calendar events.

use anyhow::{Result, anyhow};
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use gamecal_core::StoreRecord;
use google_calendar::types::{Event, EventDateTime};

pub fn to_google(record: &StoreRecord) -> Event {
    let time = |dt: &DateTime<FixedOffset>| EventDateTime {
        date: None,
        date_time: Some(dt.with_timezone(&Utc)),
        time_zone: record.time_zone.clone().unwrap_or_default(),
    };

    Event {
        // Let Google pick the id ("Invalid resource id value" otherwise).
        id: String::new(),
        summary: record.title.clone(),
        description: record.description.clone().unwrap_or_default(),
        start: Some(time(&record.start)),
        end: Some(time(&record.end)),
        ..Default::default()
    }
}

/// Timed events only; all-day entries have no place in a game schedule
/// and are reported as errors for the caller to skip.
pub fn from_google(event: Event) -> Result<StoreRecord> {
    let time_zone = event
        .start
        .as_ref()
        .map(|s| s.time_zone.clone())
        .filter(|tz| !tz.is_empty());

    let start = timed(event.start.as_ref(), time_zone.as_deref())
        .ok_or_else(|| anyhow!("Event {} has no start time", event.id))?;
    let end = timed(event.end.as_ref(), time_zone.as_deref())
        .ok_or_else(|| anyhow!("Event {} has no end time", event.id))?;

    Ok(StoreRecord {
        id: event.id,
        title: event.summary,
        description: Some(event.description).filter(|d| !d.is_empty()),
        start,
        end,
        time_zone,
    })
}

/// Google reports instants in UTC; show them in the event's own zone when
/// it names one.
fn timed(time: Option<&EventDateTime>, time_zone: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let utc = time?.date_time?;
    let local = match time_zone.and_then(|tz| tz.parse::<Tz>().ok()) {
        Some(tz) => utc.with_timezone(&tz).fixed_offset(),
        None => utc.fixed_offset(),
    };
    Some(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> StoreRecord {
        let start = FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 10, 19, 0, 0)
            .unwrap();
        StoreRecord {
            id: String::new(),
            title: "Olymp NHL".into(),
            description: Some("Dynamo vs Yunost".into()),
            start,
            end: start + chrono::Duration::minutes(75),
            time_zone: Some("Europe/Minsk".into()),
        }
    }

    #[test]
    fn test_record_to_google() {
        let event = to_google(&record());
        assert_eq!(event.summary, "Olymp NHL");
        assert_eq!(event.description, "Dynamo vs Yunost");

        let start = event.start.unwrap();
        assert_eq!(start.time_zone, "Europe/Minsk");
        assert_eq!(
            start.date_time.unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 10, 16, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_google_to_record_keeps_local_offset() {
        let mut event = to_google(&record());
        event.id = "evt1".into();

        let back = from_google(event).unwrap();
        assert_eq!(back.id, "evt1");
        assert_eq!(back.start.to_rfc3339(), "2025-01-10T19:00:00+03:00");
        assert_eq!(back.end.to_rfc3339(), "2025-01-10T20:15:00+03:00");
        assert_eq!(back.time_zone.as_deref(), Some("Europe/Minsk"));
    }

    #[test]
    fn test_all_day_event_is_rejected() {
        let event = Event {
            id: "bday".into(),
            start: Some(EventDateTime {
                date: chrono::NaiveDate::from_ymd_opt(2025, 1, 10),
                date_time: None,
                time_zone: String::new(),
            }),
            ..Default::default()
        };
        assert!(from_google(event).is_err());
    }
}
