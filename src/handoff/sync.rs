use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};

use crate::error::{HandoffError, HandoffResult};
use crate::vcs::{RepoStatus, SourceControl};

pub const WIP_BRANCH_PREFIX: &str = "handoff/wip-";

/// What a WIP sync pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub remote: String,
    pub branch: String,
    pub commit_message: String,
}

fn iso_timestamp(now: &DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Branch name derived from the timestamp, with `:` and `.` made ref-safe.
pub fn wip_branch_name(now: &DateTime<Utc>) -> String {
    format!(
        "{}{}",
        WIP_BRANCH_PREFIX,
        iso_timestamp(now).replace([':', '.'], "-")
    )
}

pub fn wip_commit_message(now: &DateTime<Utc>) -> String {
    format!("WIP: handoff sync at {}", iso_timestamp(now))
}

/// Stage everything, falling back to one path at a time.
async fn stage_changes<S: SourceControl>(scm: &S, status: &RepoStatus) -> HandoffResult<()> {
    let err = match scm.stage_all().await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    warn!("Batch staging failed, staging files individually: {}", err);

    for change in &status.working_tree {
        scm.stage(std::slice::from_ref(&change.path)).await?;
    }
    Ok(())
}

/// Stage, commit, branch and push local work so the remote agent sees it.
///
/// Returns `Ok(None)` without touching the repository when there is
/// nothing to sync.
pub async fn stage_commit_push<S: SourceControl>(
    scm: &S,
    now: DateTime<Utc>,
) -> HandoffResult<Option<SyncOutcome>> {
    let status = scm.status().await?;
    if !status.is_dirty() {
        info!("Working tree is clean, nothing to sync");
        return Ok(None);
    }

    let remote = scm
        .remotes()
        .await?
        .into_iter()
        .next()
        .ok_or_else(HandoffError::missing_remote)?;

    stage_changes(scm, &status).await?;

    let commit_message = wip_commit_message(&now);
    scm.commit(&commit_message).await?;

    let branch = wip_branch_name(&now);
    scm.create_branch(&branch, true).await?;
    scm.push(&remote.name, &branch, true).await?;

    info!("Pushed WIP branch {} to {}", branch, remote.name);
    Ok(Some(SyncOutcome {
        remote: remote.name,
        branch,
        commit_message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChangeKind, ChangeRecord};
    use crate::vcs::fake::FakeScm;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 5).unwrap()
    }

    fn dirty() -> RepoStatus {
        RepoStatus {
            working_tree: vec![
                ChangeRecord::new("src/auth.ts", ChangeKind::Modified),
                ChangeRecord::new("src/types.ts", ChangeKind::Added),
            ],
            staged: vec![],
        }
    }

    #[test]
    fn test_branch_name_is_ref_safe() {
        let name = wip_branch_name(&now());
        assert_eq!(name, "handoff/wip-2026-10-16T09-30-05-000Z");
        assert!(!name.contains(':') && !name.contains('.'));
    }

    #[tokio::test]
    async fn test_clean_tree_is_noop() {
        let scm = FakeScm::new(RepoStatus::default());
        assert_eq!(stage_commit_push(&scm, now()).await.unwrap(), None);
        assert!(scm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_full_sequence() {
        let scm = FakeScm::new(dirty());
        let outcome = stage_commit_push(&scm, now()).await.unwrap().unwrap();

        assert_eq!(outcome.remote, "origin");
        assert_eq!(
            scm.calls(),
            vec![
                "stage_all".to_string(),
                "commit WIP: handoff sync at 2026-10-16T09:30:05.000Z".to_string(),
                format!("branch {} true", outcome.branch),
                format!("push origin {} true", outcome.branch),
            ]
        );
        assert_eq!(*scm.branch.lock().unwrap(), outcome.branch);
    }

    #[tokio::test]
    async fn test_batch_failure_falls_back_to_per_file() {
        let mut scm = FakeScm::new(dirty());
        scm.fail_stage_all = true;

        stage_commit_push(&scm, now()).await.unwrap();
        let calls = scm.calls();
        assert_eq!(calls[0], "stage_all");
        assert_eq!(calls[1], "stage src/auth.ts");
        assert_eq!(calls[2], "stage src/types.ts");
        assert!(calls[3].starts_with("commit "));
    }

    #[tokio::test]
    async fn test_per_file_failure_aborts() {
        let mut scm = FakeScm::new(dirty());
        scm.fail_stage_all = true;
        scm.fail_stage_path = Some("src/auth.ts".to_string());

        let err = stage_commit_push(&scm, now()).await.unwrap_err();
        assert!(matches!(err, HandoffError::Vcs { ref stderr, .. } if stderr == "permission denied"));
        assert!(!scm.calls().iter().any(|c| c.starts_with("commit")));
    }

    #[tokio::test]
    async fn test_missing_remote_touches_nothing() {
        let mut scm = FakeScm::new(dirty());
        scm.remotes.clear();

        let err = stage_commit_push(&scm, now()).await.unwrap_err();
        assert!(matches!(err, HandoffError::Configuration { .. }));
        assert!(scm.calls().is_empty());
    }
}
