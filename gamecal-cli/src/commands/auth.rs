use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use gamecal_core::remote::protocol::AuthSubmit;
use gamecal_core::remote::provider::Provider;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

const REDIRECT_PORT: u16 = 8085;

pub async fn run(provider_name: &str) -> Result<()> {
    let provider = Provider::from_name(provider_name);
    let redirect_uri = format!("http://localhost:{REDIRECT_PORT}/callback");

    println!("Authenticating with {provider_name}...\n");

    let init = provider.auth_init(redirect_uri.clone()).await?;

    println!("Open this URL in your browser to authenticate:\n");
    println!("{}\n", init.authorization_url);

    if open::that(&init.authorization_url).is_err() {
        println!("(Could not open browser automatically, please copy the URL above)");
    }

    let params = wait_for_callback(REDIRECT_PORT).await?;
    let code = params
        .get("code")
        .ok_or_else(|| anyhow!("No code in callback"))?;
    let state = params
        .get("state")
        .ok_or_else(|| anyhow!("No state in callback"))?;

    if state != &init.state {
        bail!("OAuth state mismatch, refusing the callback");
    }

    println!("Received authorization code, exchanging for tokens...");

    let account = provider
        .auth_submit(AuthSubmit {
            code: code.clone(),
            state: state.clone(),
            redirect_uri,
        })
        .await?;

    println!("\nAuthenticated as: {account}\n");
    println!("Bind a league to one of its calendars in the config, e.g.:\n");
    println!("  [calendars.NHL]");
    println!("  provider = \"{provider_name}\"");
    println!("  {provider_name}_account = \"{account}\"");
    println!("  {provider_name}_calendar = \"Hockey\"");

    Ok(())
}

/// Accept one HTTP request on localhost and return its query parameters.
async fn wait_for_callback(port: u16) -> Result<HashMap<String, String>> {
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .context("Failed to bind OAuth callback listener")?;

    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    let params = callback_params(&request_line)?;

    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>gamecal is connected</h1>\
        <p>You can close this window and return to the terminal.</p>\
        </body></html>";

    let mut stream = reader.into_inner();
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;

    Ok(params)
}

/// Query parameters from an HTTP request line like `GET /callback?code=x HTTP/1.1`.
fn callback_params(request_line: &str) -> Result<HashMap<String, String>> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow!("Invalid HTTP request"))?;

    let url = url::Url::parse(&format!("http://localhost{target}"))?;
    Ok(url.query_pairs().into_owned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_params_are_decoded() {
        let params =
            callback_params("GET /callback?code=4%2F0Ab&state=xyz HTTP/1.1\r\n").unwrap();
        assert_eq!(params["code"], "4/0Ab");
        assert_eq!(params["state"], "xyz");
    }

    #[test]
    fn test_garbage_request_is_rejected() {
        assert!(callback_params("\r\n").is_err());
    }
}
