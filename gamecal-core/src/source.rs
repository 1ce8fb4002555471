//! Event sources: where the desired schedule comes from.

use chrono::{DateTime, Utc};

use crate::error::{GameCalError, GameCalResult};
use crate::event::Event;

#[allow(async_fn_in_trait)]
pub trait EventSource {
    /// Label used in logs.
    fn name(&self) -> String;

    async fn events(&self) -> GameCalResult<Vec<Event>>;
}

/// Gather upcoming events from every source.
///
/// Games that already started are dropped. Any failing source fails the
/// whole collection, as does an empty source list: an incomplete schedule
/// would otherwise look like cancelled games.
pub async fn collect_upcoming<S: EventSource>(
    sources: &[S],
    now: DateTime<Utc>,
) -> GameCalResult<Vec<Event>> {
    if sources.is_empty() {
        return Err(GameCalError::Source("No sources configured".into()));
    }

    let mut events = Vec::new();
    let mut failed = Vec::new();

    for source in sources {
        match source.events().await {
            Ok(found) => {
                tracing::info!(source = %source.name(), count = found.len(), "Fetched games");
                events.extend(found.into_iter().filter(|e| e.occurs_at.with_timezone(&Utc) >= now));
            }
            Err(e) => {
                tracing::error!(source = %source.name(), "Could not fetch games: {e}");
                failed.push(source.name());
            }
        }
    }

    if !failed.is_empty() {
        return Err(GameCalError::Source(format!(
            "Could not fetch games from {}",
            failed.join(", ")
        )));
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Code;
    use chrono::{Duration, TimeZone};

    struct Fixed(GameCalResult<Vec<Event>>);

    impl EventSource for Fixed {
        fn name(&self) -> String {
            "fixed".into()
        }

        async fn events(&self) -> GameCalResult<Vec<Event>> {
            match &self.0 {
                Ok(events) => Ok(events.clone()),
                Err(e) => Err(GameCalError::Source(e.to_string())),
            }
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
    }

    fn game(offset: Duration) -> Event {
        Event::new((now() + offset).fixed_offset(), None, Code::new("NHL").unwrap(), "X vs Y")
    }

    #[tokio::test]
    async fn test_collect_drops_past_games() {
        let sources = vec![
            Fixed(Ok(vec![game(Duration::hours(-2)), game(Duration::hours(3))])),
            Fixed(Ok(vec![game(Duration::hours(5))])),
        ];

        let events = collect_upcoming(&sources, now()).await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn test_one_failed_source_fails_collection() {
        let sources = vec![
            Fixed(Ok(vec![game(Duration::hours(3))])),
            Fixed(Err(GameCalError::Source("feed down".into()))),
        ];

        let result = collect_upcoming(&sources, now()).await;
        assert!(matches!(result, Err(GameCalError::Source(msg)) if msg.contains("fixed")));
    }

    #[tokio::test]
    async fn test_no_sources_fails_collection() {
        let sources: Vec<Fixed> = Vec::new();
        let result = collect_upcoming(&sources, now()).await;
        assert!(matches!(result, Err(GameCalError::Source(_))));
    }
}
