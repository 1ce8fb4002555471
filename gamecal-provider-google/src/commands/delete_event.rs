use anyhow::{Context, Result};
use gamecal_core::remote::protocol::DeleteEvent;
use google_calendar::types::SendUpdates;

use crate::remote_config::GoogleRemoteConfig;
use crate::session::Session;

pub async fn handle(cmd: DeleteEvent) -> Result<()> {
    let config = GoogleRemoteConfig::try_from(&cmd.remote_config)?;
    let client = Session::load_valid(&config.google_account).await?.client()?;
    let calendar_id = config.calendar_id(&client).await?;

    match client
        .events()
        .delete(&calendar_id, &cmd.event_id, false, SendUpdates::None)
        .await
    {
        Ok(_) => Ok(()),
        // Already gone: the calendar is in the state we wanted.
        Err(e) if is_gone(&e.to_string()) => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to delete event: {}", cmd.event_id)),
    }
}

fn is_gone(error: &str) -> bool {
    error.contains("410") || error.contains("Gone")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gone_is_detected() {
        assert!(is_gone("code: 410 Gone, error: Resource has been deleted"));
        assert!(!is_gone("code: 403 Forbidden"));
    }
}
