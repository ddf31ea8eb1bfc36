use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::http::send_once;
use crate::credentials::ApiKey;
use crate::error::{HandoffError, HandoffResult};

/// Default CLI version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(super) const API_KEY_HEADER: &str = "X-Goog-Api-Key";

fn build_user_agent() -> String {
    std::env::var("HANDOFF_USER_AGENT")
        .unwrap_or_else(|_| format!("jules-handoff/{}", DEFAULT_VERSION))
}

/// Raw outcome of one request: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP client for the remote agent service.
pub struct ApiClient {
    pub(super) client: Client,
    pub(super) base_url: Url,
    pub(super) user_agent: String,
    pub(super) session_id: String,
    pub(super) timeout_secs: u64,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> HandoffResult<Self> {
        let base_url = Self::parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| HandoffError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            user_agent: build_user_agent(),
            session_id: Uuid::new_v4().to_string(),
            timeout_secs,
        })
    }

    /// Parse the base URL, adding the trailing slash `Url::join` needs.
    fn parse_base_url(base_url: &str) -> HandoffResult<Url> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        Url::parse(&normalized)
            .map_err(|e| HandoffError::validation("apiBaseUrl", format!("{}: {}", base_url, e)))
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(super) fn build_url(&self, endpoint: &str) -> HandoffResult<Url> {
        self.base_url
            .join(endpoint)
            .map_err(|e| HandoffError::validation("endpoint", format!("{}: {}", endpoint, e)))
    }

    /// POST `body` as JSON and return status and text without interpreting them.
    pub(super) async fn post_json<T>(
        &self,
        endpoint: &str,
        api_key: &ApiKey,
        body: &T,
    ) -> HandoffResult<RawResponse>
    where
        T: Serialize,
    {
        let url = self.build_url(endpoint)?;
        let request_id = Uuid::new_v4().to_string();

        debug!("=== API Request ===");
        debug!("URL: {}", url);
        debug!("Request ID: {}", request_id);
        debug!("Timeout: {}s", self.timeout_secs);

        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("User-Agent", &self.user_agent)
            .header("x-request-id", &request_id)
            .header("x-request-session-id", &self.session_id)
            .header(API_KEY_HEADER, api_key.expose())
            .json(body);

        let response = send_once(request, self.timeout_secs).await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| HandoffError::Transport(format!("failed to read response body: {}", e)))?;

        debug!("=== API Response ===");
        debug!("Status: {}", status);
        Ok(RawResponse { status, body })
    }
}
