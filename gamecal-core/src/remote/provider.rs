//! Provider subprocess protocol.
//!
//! Calendar stores are reached through external provider binaries
//! (e.g. `gamecal-provider-google`) that speak JSON over stdin/stdout.
//! Providers manage their own credentials and tokens; gamecal only passes
//! the binding from the config file along.

use crate::error::{GameCalError, GameCalResult};
use crate::remote::protocol::{
    AuthInit, AuthInitResponse, AuthSubmit, Command, ProviderCommand, Request, Response,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);
/// Auth commands wait on a human in a browser.
const AUTH_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn binary_name(&self) -> String {
        format!("gamecal-provider-{}", self.0)
    }

    fn binary_path(&self) -> GameCalResult<std::path::PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| {
            GameCalError::ProviderNotInstalled(format!(
                "{binary_name} (install it with: cargo install {binary_name})"
            ))
        })
    }

    pub async fn auth_init(&self, redirect_uri: String) -> GameCalResult<AuthInitResponse> {
        self.call_with_timeout(AuthInit { redirect_uri }, AUTH_TIMEOUT)
            .await
    }

    /// Returns the authenticated account identifier.
    pub async fn auth_submit(&self, submit: AuthSubmit) -> GameCalResult<String> {
        self.call_with_timeout(submit, AUTH_TIMEOUT).await
    }

    /// Call a typed provider command; the response type follows the command.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> GameCalResult<C::Response> {
        self.call_with_timeout(cmd, PROVIDER_TIMEOUT).await
    }

    async fn call_with_timeout<C: ProviderCommand>(
        &self,
        cmd: C,
        limit: Duration,
    ) -> GameCalResult<C::Response> {
        timeout(limit, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| GameCalError::ProviderTimeout(limit.as_secs()))?
    }

    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> GameCalResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| GameCalError::Serialization(e.to_string()))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| GameCalError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;
        tracing::debug!(provider = %self.0, ?command, "Calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                GameCalError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| GameCalError::Provider("Provider stdin unavailable".into()))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(GameCalError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        parse_response(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_response<R: serde::de::DeserializeOwned>(raw: &str) -> GameCalResult<R> {
    let line = raw.lines().find(|l| !l.trim().is_empty()).ok_or_else(|| {
        GameCalError::Provider("Provider returned no response".into())
    })?;

    let response: Response<R> = serde_json::from_str(line)
        .map_err(|e| GameCalError::Provider(format!("Failed to parse response: {}", e)))?;

    match response {
        Response::Success { data } => Ok(data),
        Response::Error { error } => Err(GameCalError::Provider(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_response() {
        let id: String = parse_response("{\"status\":\"success\",\"data\":\"evt1\"}\n").unwrap();
        assert_eq!(id, "evt1");
    }

    #[test]
    fn test_provider_error_is_transport_error() {
        let err = parse_response::<String>("{\"status\":\"error\",\"error\":\"HTTP 500\"}")
            .unwrap_err();
        assert!(matches!(err, GameCalError::Provider(ref msg) if msg == "HTTP 500"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_empty_output_is_an_error() {
        assert!(parse_response::<()>("\n").is_err());
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let provider = Provider::from_name("definitely-not-installed-xyz");
        assert!(matches!(
            provider.binary_path(),
            Err(GameCalError::ProviderNotInstalled(_))
        ));
    }
}
