//! Wire types for the sessions endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::RepositoryCoordinates;
use crate::error::HandoffError;

/// Body marker of a 404 for a repository the service does not know.
pub const NOT_FOUND_MARKER: &str = "Requested entity was not found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubRepoContext {
    pub starting_branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContext {
    pub source: String,
    pub github_repo_context: GithubRepoContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub prompt: String,
    pub source_context: SourceContext,
    pub title: String,
}

impl CreateSessionRequest {
    pub fn new(prompt: String, title: String, coordinates: &RepositoryCoordinates) -> Self {
        Self {
            prompt,
            source_context: SourceContext {
                source: coordinates.source(),
                github_repo_context: GithubRepoContext {
                    starting_branch: coordinates.branch.clone(),
                },
            },
            title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Turn a non-2xx response into the matching error.
pub fn classify_failure(status: u16, body: String, coordinates: &RepositoryCoordinates) -> HandoffError {
    if status == 404 && body.contains(NOT_FOUND_MARKER) {
        return HandoffError::ProjectNotInitialized {
            owner: coordinates.owner.clone(),
            repo: coordinates.repo_name.clone(),
        };
    }

    let body = if body.trim().is_empty() {
        default_reason(status).to_string()
    } else {
        body
    };
    HandoffError::Api { status, body }
}

fn default_reason(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "The API key was rejected",
        403 => "Permission denied",
        404 => "Not found",
        429 => "Rate limit exceeded. Please wait and try again.",
        500..=599 => "The service is unavailable",
        _ => "Unknown error",
    }
}
