//! Source-control collaborator.
//!
//! The pipeline only needs a narrow slice of version control: working tree
//! and index status, the current branch, configured remotes, and the
//! stage/commit/branch/push operations used by the WIP sync. `GitCli`
//! provides them by delegating to the `git` executable.

mod git;
mod remote;

use std::future::Future;

pub use git::GitCli;
pub use remote::parse_remote_url;

use crate::domain::ChangeRecord;
use crate::error::HandoffResult;

/// Working tree and index changes relative to HEAD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoStatus {
    pub working_tree: Vec<ChangeRecord>,
    pub staged: Vec<ChangeRecord>,
}

impl RepoStatus {
    pub fn is_dirty(&self) -> bool {
        !self.working_tree.is_empty() || !self.staged.is_empty()
    }

    /// Working-tree records followed by staged records.
    pub fn all_changes(&self) -> Vec<ChangeRecord> {
        self.working_tree
            .iter()
            .chain(self.staged.iter())
            .cloned()
            .collect()
    }
}

/// A configured remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub fetch_url: String,
}

pub trait SourceControl: Send + Sync {
    fn status(&self) -> impl Future<Output = HandoffResult<RepoStatus>> + Send;

    fn current_branch(&self) -> impl Future<Output = HandoffResult<String>> + Send;

    /// Remotes in configuration order.
    fn remotes(&self) -> impl Future<Output = HandoffResult<Vec<Remote>>> + Send;

    fn stage_all(&self) -> impl Future<Output = HandoffResult<()>> + Send;

    fn stage(&self, paths: &[String]) -> impl Future<Output = HandoffResult<()>> + Send;

    fn commit(&self, message: &str) -> impl Future<Output = HandoffResult<()>> + Send;

    fn create_branch(
        &self,
        name: &str,
        checkout: bool,
    ) -> impl Future<Output = HandoffResult<()>> + Send;

    fn push(
        &self,
        remote: &str,
        branch: &str,
        set_upstream: bool,
    ) -> impl Future<Output = HandoffResult<()>> + Send;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory `SourceControl` used by pipeline tests.

    use std::sync::Mutex;

    use super::*;
    use crate::error::HandoffError;

    #[derive(Default)]
    pub struct FakeScm {
        pub status: Mutex<RepoStatus>,
        pub branch: Mutex<String>,
        pub remotes: Vec<Remote>,
        pub fail_stage_all: bool,
        pub fail_stage_path: Option<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeScm {
        pub fn new(status: RepoStatus) -> Self {
            Self {
                status: Mutex::new(status),
                branch: Mutex::new("main".to_string()),
                remotes: vec![Remote {
                    name: "origin".to_string(),
                    fetch_url: "git@github.com:acme/widgets.git".to_string(),
                }],
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl SourceControl for FakeScm {
        async fn status(&self) -> HandoffResult<RepoStatus> {
            Ok(self.status.lock().unwrap().clone())
        }

        async fn current_branch(&self) -> HandoffResult<String> {
            Ok(self.branch.lock().unwrap().clone())
        }

        async fn remotes(&self) -> HandoffResult<Vec<Remote>> {
            Ok(self.remotes.clone())
        }

        async fn stage_all(&self) -> HandoffResult<()> {
            self.record("stage_all".to_string());
            if self.fail_stage_all {
                return Err(HandoffError::Vcs {
                    command: "add --all".to_string(),
                    stderr: "index.lock exists".to_string(),
                });
            }
            Ok(())
        }

        async fn stage(&self, paths: &[String]) -> HandoffResult<()> {
            self.record(format!("stage {}", paths.join(",")));
            if let Some(bad) = &self.fail_stage_path {
                if paths.contains(bad) {
                    return Err(HandoffError::Vcs {
                        command: format!("add -- {}", bad),
                        stderr: "permission denied".to_string(),
                    });
                }
            }
            Ok(())
        }

        async fn commit(&self, message: &str) -> HandoffResult<()> {
            self.record(format!("commit {}", message));
            *self.status.lock().unwrap() = RepoStatus::default();
            Ok(())
        }

        async fn create_branch(&self, name: &str, checkout: bool) -> HandoffResult<()> {
            self.record(format!("branch {} {}", name, checkout));
            if checkout {
                *self.branch.lock().unwrap() = name.to_string();
            }
            Ok(())
        }

        async fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> HandoffResult<()> {
            self.record(format!("push {} {} {}", remote, branch, set_upstream));
            Ok(())
        }
    }
}
