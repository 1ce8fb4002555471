//! Start OAuth: build the consent URL for the user's own OAuth client.

use anyhow::{Result, anyhow};
use gamecal_core::remote::protocol::{AuthInit, AuthInitResponse};
use google_calendar::Client;
use url::Url;

use crate::app_config::AppConfig;

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.calendarlist.readonly",
    "https://www.googleapis.com/auth/calendar.events.owned",
];

pub async fn handle(cmd: AuthInit) -> Result<AuthInitResponse> {
    let app_config = AppConfig::load()?;

    let client = Client::new(
        app_config.client_id,
        app_config.client_secret,
        cmd.redirect_uri,
        String::new(),
        String::new(),
    );

    let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();
    let authorization_url = client.user_consent_url(&scopes);
    let state = state_param(&authorization_url)?;

    Ok(AuthInitResponse {
        authorization_url,
        state,
    })
}

/// The client library generates its own `state`; the CLI needs it to check
/// the callback.
fn state_param(authorization_url: &str) -> Result<String> {
    Url::parse(authorization_url)?
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| anyhow!("No state parameter in authorization URL"))
}
