//! Schedule feeds: JSON arrays of game rows from a file or a URL.

use std::path::Path;

use gamecal_core::config::{GameCalConfig, SourceConfig, expand_path};
use gamecal_core::error::{GameCalError, GameCalResult};
use gamecal_core::event::Code;
use gamecal_core::normalize::{Normalizer, RawGame};
use gamecal_core::source::EventSource;
use gamecal_core::Event;

pub struct FeedSource {
    location: String,
    normalizer: Normalizer,
    client: reqwest::Client,
}

impl FeedSource {
    pub fn new(source: &SourceConfig, normalizer: Normalizer, client: reqwest::Client) -> Self {
        FeedSource {
            location: source.location.clone(),
            normalizer,
            client,
        }
    }

    /// One feed per configured source of `league`.
    pub fn for_league(config: &GameCalConfig, league: &Code) -> GameCalResult<Vec<FeedSource>> {
        let tz = config.tz()?;
        let client = reqwest::Client::new();

        Ok(config
            .sources_for(league)
            .into_iter()
            .map(|source| {
                let normalizer = Normalizer::new(league.clone(), tz, config.arenas.clone());
                FeedSource::new(source, normalizer, client.clone())
            })
            .collect())
    }

    fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    async fn fetch(&self) -> GameCalResult<String> {
        if !self.is_remote() {
            let path = expand_path(Path::new(&self.location));
            return tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| GameCalError::Source(format!("{}: {e}", self.location)));
        }

        let response = self
            .client
            .get(&self.location)
            .send()
            .await
            .map_err(|e| GameCalError::Source(format!("{}: {e}", self.location)))?;

        if !response.status().is_success() {
            return Err(GameCalError::Source(format!(
                "{}: HTTP {}",
                self.location,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| GameCalError::Source(format!("{}: {e}", self.location)))
    }
}

impl EventSource for FeedSource {
    fn name(&self) -> String {
        self.location.clone()
    }

    async fn events(&self) -> GameCalResult<Vec<Event>> {
        let body = self.fetch().await?;
        let rows = parse_rows(&body)?;
        Ok(self.normalizer.normalize_all(&rows))
    }
}

fn parse_rows(body: &str) -> GameCalResult<Vec<RawGame>> {
    serde_json::from_str(body).map_err(|e| GameCalError::Source(format!("Malformed feed: {e}")))
}
