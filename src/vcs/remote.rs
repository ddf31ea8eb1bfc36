use regex::Regex;
use std::sync::LazyLock;

use crate::error::{HandoffError, HandoffResult, SecurityKind};

/// `git@host:owner/repo(.git)` and `scheme://[user@]host/owner/repo(.git)`.
static REMOTE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[\w.-]+@[\w.-]+:|(?:https?|ssh|git)://(?:[^@/]+@)?[^/]+/)(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$",
    )
    .expect("REMOTE_URL_RE regex should compile")
});

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+$").expect("IDENTIFIER_RE regex should compile")
});

/// Check an owner or repository name against the GitHub identifier set.
///
/// Separators and `..` are reported as security violations, any other
/// disallowed character as a validation error.
pub fn validate_identifier(field: &str, value: &str) -> HandoffResult<()> {
    if value.is_empty() {
        return Err(HandoffError::validation(field, "must not be empty"));
    }
    if value.contains('/') || value.contains('\\') || value.contains("..") || value == "." {
        return Err(HandoffError::security(
            SecurityKind::PathTraversal,
            format!("{} '{}' contains a path separator or traversal sequence", field, value),
        ));
    }
    if !IDENTIFIER_RE.is_match(value) {
        return Err(HandoffError::validation(
            field,
            format!("'{}' may only contain letters, digits, '.', '-' and '_'", value),
        ));
    }
    Ok(())
}

/// Extract `(owner, repo)` from a remote URL.
pub fn parse_remote_url(url: &str) -> HandoffResult<(String, String)> {
    let url = url.trim();
    let captures = REMOTE_URL_RE.captures(url).ok_or_else(|| {
        HandoffError::validation(
            "remote url",
            format!("'{}' is not a GitHub-style owner/repo URL", url),
        )
    })?;

    let owner = captures["owner"].to_string();
    let repo = captures["repo"].to_string();
    validate_identifier("owner", &owner)?;
    validate_identifier("repository name", &repo)?;
    Ok((owner, repo))
}
