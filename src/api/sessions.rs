use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, error, info};
use url::Url;

use super::client::ApiClient;
use super::types::{classify_failure, CreateSessionRequest, SessionResponse};
use crate::credentials::ApiKey;
use crate::domain::{RemoteSession, RepositoryCoordinates};
use crate::error::{HandoffError, HandoffResult, SecurityKind};

pub const SESSIONS_ENDPOINT: &str = "sessions";
pub const DASHBOARD_HOST: &str = "jules.google.com";

/// Hosts the CLI is willing to open in a browser.
const ALLOWED_HOSTS: &[&str] = &[DASHBOARD_HOST];

static SESSION_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{4,128}$").expect("session id regex should compile")
});

/// Reject ids that could change the meaning of the dashboard URL.
pub fn validate_session_id(id: &str) -> HandoffResult<()> {
    if SESSION_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(HandoffError::validation(
            "session id",
            format!("{:?} is not a valid session identifier", id),
        ))
    }
}

/// Dashboard link for a session id that has already been validated.
pub fn dashboard_url(id: &str) -> HandoffResult<String> {
    validate_session_id(id)?;
    Ok(format!("https://{}/session/{}", DASHBOARD_HOST, id))
}

/// Check a URL before handing it to the system browser.
pub fn validate_external_url(raw: &str) -> HandoffResult<Url> {
    let url = Url::parse(raw).map_err(|e| HandoffError::validation("url", e.to_string()))?;

    if url.scheme() != "https" {
        return Err(HandoffError::security(
            SecurityKind::DisallowedScheme,
            format!("refusing to open {} URL", url.scheme()),
        ));
    }

    let host = url.host_str().unwrap_or_default();
    if !ALLOWED_HOSTS.contains(&host) {
        return Err(HandoffError::security(
            SecurityKind::DisallowedHost,
            format!("refusing to open URL on host {:?}", host),
        ));
    }
    Ok(url)
}

impl ApiClient {
    /// Create a remote session. Exactly one request is made.
    pub async fn create_session(
        &self,
        api_key: &ApiKey,
        request: &CreateSessionRequest,
        coordinates: &RepositoryCoordinates,
    ) -> HandoffResult<RemoteSession> {
        debug!("=== Create Session Request ===");
        debug!("Source: {}", request.source_context.source);
        debug!(
            "Starting branch: {}",
            request.source_context.github_repo_context.starting_branch
        );
        debug!("Prompt: {} chars", request.prompt.chars().count());

        let response = self.post_json(SESSIONS_ENDPOINT, api_key, request).await?;

        if !(200..300).contains(&response.status) {
            let err = classify_failure(response.status, response.body, coordinates);
            error!("Session creation failed: {}", err);
            return Err(err);
        }

        let parsed: SessionResponse = serde_json::from_str(&response.body).map_err(|e| {
            HandoffError::validation("session response", format!("not a session object: {}", e))
        })?;

        let dashboard_url = dashboard_url(&parsed.id)?;
        info!("Created session {}", parsed.id);

        Ok(RemoteSession {
            id: parsed.id,
            name: parsed.name,
            dashboard_url,
        })
    }
}
