use anyhow::{Context, Result};
use gamecal_core::remote::protocol::CreateEvent;
use google_calendar::types::SendUpdates;

use crate::google_event::to_google;
use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

/// Returns the id Google assigned to the new event.
pub async fn handle(cmd: CreateEvent) -> Result<String> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let client = Session::load_valid(&config.google_account).await?.client()?;
    let calendar_id = config.calendar_id(&client).await?;

    let google_event = to_google(&cmd.record);

    let response = client
        .events()
        .insert(&calendar_id, 0, 0, false, SendUpdates::None, false, &google_event)
        .await
        .with_context(|| format!("Failed to create event: {}", google_event.summary))?;

    Ok(response.body.id)
}
