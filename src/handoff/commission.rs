use tracing::info;

use crate::api::{ApiClient, CreateSessionRequest};
use crate::credentials::{require_api_key, SecretStore};
use crate::domain::{RemoteSession, RepositoryCoordinates};
use crate::error::{HandoffError, HandoffResult};
use crate::prompt::{derive_title, validate_prompt};
use crate::vcs::{parse_remote_url, SourceControl};

/// Owner, repository and starting branch for the remote session.
pub async fn resolve_coordinates<S: SourceControl>(scm: &S) -> HandoffResult<RepositoryCoordinates> {
    let remote = scm
        .remotes()
        .await?
        .into_iter()
        .next()
        .ok_or_else(HandoffError::missing_remote)?;
    let (owner, repo_name) = parse_remote_url(&remote.fetch_url)?;

    let branch = scm.current_branch().await?;
    if branch.is_empty() || branch == "HEAD" {
        return Err(HandoffError::validation(
            "branch",
            "HEAD is detached; check out a branch before handing off",
        ));
    }

    Ok(RepositoryCoordinates {
        owner,
        repo_name,
        branch,
    })
}

/// A prompt checked and ready to send.
#[derive(Debug, Clone)]
pub struct Commission {
    pub coordinates: RepositoryCoordinates,
    pub request: CreateSessionRequest,
}

/// Run every local check that precedes the network call.
pub async fn prepare_commission<S: SourceControl>(
    scm: &S,
    prompt: &str,
    title: Option<&str>,
    max_prompt_length: usize,
) -> HandoffResult<Commission> {
    validate_prompt(prompt, max_prompt_length)?;
    let coordinates = resolve_coordinates(scm).await?;

    let title = match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.to_string(),
        None => derive_title(prompt, &coordinates.repo_name, &coordinates.branch),
    };
    let request = CreateSessionRequest::new(prompt.to_string(), title, &coordinates);
    Ok(Commission {
        coordinates,
        request,
    })
}

/// Validate, resolve the repository and create the remote session.
pub async fn submit<S, K>(
    scm: &S,
    secrets: &K,
    client: &ApiClient,
    prompt: &str,
    title: Option<&str>,
    max_prompt_length: usize,
) -> HandoffResult<RemoteSession>
where
    S: SourceControl,
    K: SecretStore,
{
    let api_key = require_api_key(secrets).await?;
    let commission = prepare_commission(scm, prompt, title, max_prompt_length).await?;

    info!(
        "Submitting handoff for {}/{} @ {}",
        commission.coordinates.owner, commission.coordinates.repo_name, commission.coordinates.branch
    );
    client
        .create_session(&api_key, &commission.request, &commission.coordinates)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::memory::MemorySecretStore;
    use crate::error::SecurityKind;
    use crate::vcs::fake::FakeScm;
    use crate::vcs::{Remote, RepoStatus};

    const PROMPT: &str = "<mission_brief>\nFix the flaky login test\n</mission_brief>";

    fn client() -> ApiClient {
        ApiClient::new("https://jules.googleapis.com/v1alpha/", 5).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_coordinates() {
        let scm = FakeScm::new(RepoStatus::default());
        let coords = resolve_coordinates(&scm).await.unwrap();
        assert_eq!(coords.owner, "acme");
        assert_eq!(coords.repo_name, "widgets");
        assert_eq!(coords.branch, "main");
        assert_eq!(coords.source(), "sources/github/acme/widgets");
    }

    #[tokio::test]
    async fn test_detached_head_rejected() {
        let scm = FakeScm::new(RepoStatus::default());
        *scm.branch.lock().unwrap() = "HEAD".to_string();
        assert!(matches!(
            resolve_coordinates(&scm).await.unwrap_err(),
            HandoffError::Validation { ref field, .. } if field == "branch"
        ));
    }

    #[tokio::test]
    async fn test_hostile_remote_rejected() {
        let mut scm = FakeScm::new(RepoStatus::default());
        scm.remotes = vec![Remote {
            name: "origin".into(),
            fetch_url: "https://github.com/../widgets.git".into(),
        }];
        assert!(matches!(
            resolve_coordinates(&scm).await.unwrap_err(),
            HandoffError::Security {
                kind: SecurityKind::PathTraversal,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_prepare_uses_brief_title() {
        let scm = FakeScm::new(RepoStatus::default());
        let commission = prepare_commission(&scm, PROMPT, None, 50_000).await.unwrap();
        assert_eq!(commission.request.title, "Fix the flaky login test");
        assert_eq!(
            commission.request.source_context.github_repo_context.starting_branch,
            "main"
        );

        let titled = prepare_commission(&scm, PROMPT, Some("Custom"), 50_000)
            .await
            .unwrap();
        assert_eq!(titled.request.title, "Custom");
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let scm = FakeScm::new(RepoStatus::default());
        let secrets = MemorySecretStore::default();
        let err = submit(&scm, &secrets, &client(), PROMPT, None, 50_000)
            .await
            .unwrap_err();
        assert!(matches!(err, HandoffError::Configuration { .. }));
        assert!(err.remediation().unwrap().contains("set-key"));
    }

    #[tokio::test]
    async fn test_missing_remote_is_configuration_error() {
        let mut scm = FakeScm::new(RepoStatus::default());
        scm.remotes.clear();
        let secrets = MemorySecretStore::with_key("AIzaSyA-valid_key");
        let err = submit(&scm, &secrets, &client(), PROMPT, None, 50_000)
            .await
            .unwrap_err();
        assert!(matches!(err, HandoffError::Configuration { ref missing, .. } if missing == "git remote"));
    }
}
