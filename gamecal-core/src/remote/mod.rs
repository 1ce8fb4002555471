//! Remote calendars reached through provider binaries.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GameCalResult;
use crate::record::StoreRecord;
use crate::remote::protocol::{CreateEvent, DeleteEvent, ListEvents};
use crate::remote::provider::Provider;
use crate::store::CalendarStore;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RemoteConfig(pub HashMap<String, toml::Value>);

impl From<&RemoteConfig> for serde_json::Map<String, serde_json::Value> {
    fn from(config: &RemoteConfig) -> Self {
        config
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A calendar binding: which provider to use and the provider-specific
/// keys (account, calendar name) that select one calendar.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Remote {
    pub provider: Provider,
    #[serde(flatten)]
    pub config: RemoteConfig,
}

impl Remote {
    pub fn new(provider: Provider, config: RemoteConfig) -> Self {
        Remote { provider, config }
    }

    fn remote_config(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.config)
    }

    /// Short label for logs and terminal output, e.g. `google:Hockey`.
    pub fn label(&self) -> String {
        let calendar = self
            .config
            .0
            .iter()
            .find(|(k, _)| k.ends_with("_calendar") || k.ends_with("_calendar_id"))
            .and_then(|(_, v)| v.as_str())
            .unwrap_or("default");
        format!("{}:{}", self.provider.name(), calendar)
    }
}

impl CalendarStore for Remote {
    async fn list_upcoming(&self, since: DateTime<Utc>) -> GameCalResult<Vec<StoreRecord>> {
        self.provider
            .call(ListEvents {
                remote_config: self.remote_config(),
                from: since.to_rfc3339(),
            })
            .await
    }

    async fn insert(&self, record: &StoreRecord) -> GameCalResult<String> {
        self.provider
            .call(CreateEvent {
                remote_config: self.remote_config(),
                record: record.clone(),
            })
            .await
    }

    async fn delete(&self, id: &str) -> GameCalResult<()> {
        self.provider
            .call(DeleteEvent {
                remote_config: self.remote_config(),
                event_id: id.to_string(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_from_toml() {
        let remote: Remote = toml::from_str(
            r#"
provider = "google"
google_account = "me@example.com"
google_calendar = "Hockey"
"#,
        )
        .unwrap();

        assert_eq!(remote.provider.name(), "google");
        assert_eq!(remote.label(), "google:Hockey");

        let params = remote.remote_config();
        assert_eq!(params["google_account"], "me@example.com");
        assert!(!params.contains_key("provider"));
    }
}
