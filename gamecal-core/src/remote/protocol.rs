//! JSON protocol between gamecal and provider binaries.
//!
//! One request per line on the provider's stdin, one response on its stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::record::StoreRecord;

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    AuthInit,
    AuthSubmit,
    ListEvents,
    CreateEvent,
    DeleteEvent,
}

/// Request sent from gamecal to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider back to gamecal.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data })
            .unwrap_or_else(|e| Response::error(&format!("Failed to serialize response: {e}")))
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::json!({ "status": "error", "error": msg }).to_string()
    }
}

/// Start an OAuth flow; the provider answers with the consent URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthInit {
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthInitResponse {
    pub authorization_url: String,
    pub state: String,
}

impl ProviderCommand for AuthInit {
    type Response = AuthInitResponse;
    fn command() -> Command {
        Command::AuthInit
    }
}

/// Finish an OAuth flow with the code from the redirect.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthSubmit {
    pub code: String,
    pub state: String,
    pub redirect_uri: String,
}

impl ProviderCommand for AuthSubmit {
    type Response = String; // Account identifier (e.g., email)
    fn command() -> Command {
        Command::AuthSubmit
    }
}

/// List records starting at or after `from` (RFC 3339).
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    /// Provider-specific binding (e.g., google_account, google_calendar)
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub from: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<StoreRecord>;
    fn command() -> Command {
        Command::ListEvents
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub record: StoreRecord,
}

impl ProviderCommand for CreateEvent {
    type Response = String; // Store id of the new record
    fn command() -> Command {
        Command::CreateEvent
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub remote_config: serde_json::Map<String, serde_json::Value>,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_parses_as_error() {
        let line = Response::error("token expired");
        let parsed: Response<Vec<StoreRecord>> = serde_json::from_str(&line).unwrap();
        assert!(matches!(parsed, Response::Error { error } if error == "token expired"));
    }

    #[test]
    fn test_flattened_binding_sits_next_to_params() {
        let mut remote_config = serde_json::Map::new();
        remote_config.insert("google_calendar".into(), "Hockey".into());

        let value = serde_json::to_value(DeleteEvent {
            remote_config,
            event_id: "abc".into(),
        })
        .unwrap();

        assert_eq!(value["google_calendar"], "Hockey");
        assert_eq!(value["event_id"], "abc");
    }
}
