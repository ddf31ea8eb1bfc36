//! Error taxonomy for the handoff pipeline.
//!
//! Context gathering never produces these errors; missing context simply
//! degrades to an absent section. Only validation, security, configuration,
//! version-control and API conditions abort a handoff.

use thiserror::Error;

/// Link shown when the remote service does not know the repository.
pub const REGISTRATION_URL: &str = "https://jules.google.com/";

/// Result alias used by the pipeline modules.
pub type HandoffResult<T> = std::result::Result<T, HandoffError>;

/// Kind of detected boundary violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityKind {
    /// A path resolved outside of its sandbox root.
    PathEscape,
    /// An identifier contained separators or traversal sequences.
    PathTraversal,
    /// A URL used a scheme other than https.
    DisallowedScheme,
    /// A URL pointed at a host that is not allow-listed.
    DisallowedHost,
}

impl SecurityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityKind::PathEscape => "path_escape",
            SecurityKind::PathTraversal => "path_traversal",
            SecurityKind::DisallowedScheme => "disallowed_scheme",
            SecurityKind::DisallowedHost => "disallowed_host",
        }
    }
}

impl std::fmt::Display for SecurityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("security violation ({kind}): {detail}")]
    Security { kind: SecurityKind, detail: String },

    #[error("{missing} is not configured")]
    Configuration {
        missing: String,
        remedy: &'static str,
    },

    #[error("repository {owner}/{repo} is not registered with Jules")]
    ProjectNotInitialized { owner: String, repo: String },

    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("`git {command}` failed: {stderr}")]
    Vcs { command: String, stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("handoff cancelled")]
    Cancelled,
}

impl HandoffError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        HandoffError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn security(kind: SecurityKind, detail: impl Into<String>) -> Self {
        HandoffError::Security {
            kind,
            detail: detail.into(),
        }
    }

    pub fn missing_credential() -> Self {
        HandoffError::Configuration {
            missing: "Jules API key".to_string(),
            remedy: "Run 'handoff set-key' to store your Jules API key.",
        }
    }

    pub fn missing_remote() -> Self {
        HandoffError::Configuration {
            missing: "git remote".to_string(),
            remedy: "Add a GitHub remote with 'git remote add origin <url>'.",
        }
    }

    /// Timeouts and connection failures may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, HandoffError::Timeout(_) | HandoffError::Transport(_))
    }

    /// Targeted hint for the user, if there is one.
    pub fn remediation(&self) -> Option<String> {
        match self {
            HandoffError::Configuration { remedy, .. } => Some((*remedy).to_string()),
            HandoffError::ProjectNotInitialized { owner, repo } => Some(format!(
                "Install the Jules GitHub app for {}/{} at {}",
                owner, repo, REGISTRATION_URL
            )),
            HandoffError::Timeout(_) | HandoffError::Transport(_) => {
                Some("The request may succeed if you run 'handoff send' again.".to_string())
            }
            _ => None,
        }
    }
}
