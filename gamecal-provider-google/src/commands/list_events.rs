use anyhow::{Context, Result};
use gamecal_core::StoreRecord;
use gamecal_core::remote::protocol::ListEvents;
use google_calendar::types::OrderBy;

use crate::google_event::from_google;
use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

pub async fn handle(cmd: ListEvents) -> Result<Vec<StoreRecord>> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let client = Session::load_valid(&config.google_account).await?.client()?;
    let calendar_id = config.calendar_id(&client).await?;

    let response = client
        .events()
        .list_all(
            &calendar_id,
            "",
            0,
            OrderBy::default(),
            &[],
            "", // search query
            &[],
            false,
            false,
            false,
            "", // no upper bound
            &cmd.from,
            "",
            "",
        )
        .await
        .context("Failed to fetch events")?;

    let records = response
        .body
        .into_iter()
        .filter(|event| event.status != "cancelled")
        .filter_map(|event| match from_google(event) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Skipping event: {e:#}");
                None
            }
        })
        .collect();

    Ok(records)
}
