use reqwest::{Client, RequestBuilder, Response};
use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// One client shared by every feed. The per-request timeout mirrors the
/// fetch policy so a stalled socket is also cut off at the transport.
pub fn build_client(config: &FetchConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| Error::ConfigError(format!("HTTP client: {}", e)))
}

/// Send and reject any non-success status.
pub async fn send_checked(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::ResponseFailure {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}
