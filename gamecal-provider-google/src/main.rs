//! gamecal-provider-google - Google Calendar provider for gamecal
//!
//! Speaks the gamecal provider protocol: one JSON request per line on
//! stdin, one JSON response per line on stdout.
//!
//! Credentials and tokens live under:
//!   ~/.config/gamecal/providers/google/app_config.toml
//!   ~/.config/gamecal/providers/google/session/{account}.toml

mod app_config;
mod commands;
mod google_event;
mod remote_config;
mod session;

use anyhow::Result;
use gamecal_core::remote::protocol::{Command, ProviderCommand, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(request).await,
            Err(e) => Response::error(&format!("Failed to parse request: {e}")),
        };

        stdout.write_all(format!("{response}\n").as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}

async fn handle_request(request: Request) -> String {
    tracing::debug!(command = ?request.command, "Handling request");
    let params = request.params;

    match request.command {
        Command::AuthInit => dispatch(params, commands::auth_init::handle).await,
        Command::AuthSubmit => dispatch(params, commands::auth_submit::handle).await,
        Command::ListEvents => dispatch(params, commands::list_events::handle).await,
        Command::CreateEvent => dispatch(params, commands::create_event::handle).await,
        Command::DeleteEvent => dispatch(params, commands::delete_event::handle).await,
    }
}

/// Decode typed params, run the handler, encode the protocol response.
async fn dispatch<C, F, Fut>(params: serde_json::Value, handler: F) -> String
where
    C: ProviderCommand + DeserializeOwned,
    C::Response: Serialize,
    F: FnOnce(C) -> Fut,
    Fut: Future<Output = Result<C::Response>>,
{
    let cmd: C = match serde_json::from_value(params) {
        Ok(cmd) => cmd,
        Err(e) => return Response::error(&format!("Invalid params: {e}")),
    };

    match handler(cmd).await {
        Ok(data) => Response::success(data),
        Err(e) => Response::error(&format!("{e:#}")),
    }
}
