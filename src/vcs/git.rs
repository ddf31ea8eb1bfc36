use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use super::{RepoStatus, Remote, SourceControl};
use crate::domain::{ChangeKind, ChangeRecord};
use crate::error::{HandoffError, HandoffResult};

/// `SourceControl` implemented with the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }

    async fn run(&self, args: &[&str]) -> HandoffResult<String> {
        let command = args.join(" ");
        debug!("git {}", command);

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .await
            .map_err(|e| HandoffError::Vcs {
                command: command.clone(),
                stderr: format!("git not available: {}", e),
            })?;

        if !output.status.success() {
            return Err(HandoffError::Vcs {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Repository top level and the path of `workdir` below it (`""` or `"dir/"`).
    async fn location(&self) -> HandoffResult<(PathBuf, String)> {
        let stdout = self
            .run(&["rev-parse", "--show-toplevel", "--show-prefix"])
            .await?;
        let mut lines = stdout.lines();
        let toplevel = PathBuf::from(lines.next().unwrap_or_default().trim());
        let prefix = lines.next().unwrap_or_default().trim().to_string();
        Ok((toplevel, prefix))
    }
}

impl SourceControl for GitCli {
    async fn status(&self) -> HandoffResult<RepoStatus> {
        let (toplevel, prefix) = self.location().await?;
        let stdout = self
            .run(&["status", "--porcelain=v1", "-z", "--untracked-files=all"])
            .await?;
        Ok(anchor_paths(parse_porcelain(&stdout), &toplevel, &prefix))
    }

    async fn current_branch(&self) -> HandoffResult<String> {
        let stdout = self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(stdout.trim().to_string())
    }

    async fn remotes(&self) -> HandoffResult<Vec<Remote>> {
        let stdout = self.run(&["remote", "-v"]).await?;
        Ok(parse_remotes(&stdout))
    }

    async fn stage_all(&self) -> HandoffResult<()> {
        self.run(&["add", "--all"]).await.map(|_| ())
    }

    async fn stage(&self, paths: &[String]) -> HandoffResult<()> {
        let mut args = vec!["add", "--all", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run(&args).await.map(|_| ())
    }

    async fn commit(&self, message: &str) -> HandoffResult<()> {
        self.run(&["commit", "-m", message]).await.map(|_| ())
    }

    async fn create_branch(&self, name: &str, checkout: bool) -> HandoffResult<()> {
        if checkout {
            self.run(&["checkout", "-b", name]).await.map(|_| ())
        } else {
            self.run(&["branch", name]).await.map(|_| ())
        }
    }

    async fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> HandoffResult<()> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("--set-upstream");
        }
        args.push(remote);
        args.push(branch);
        self.run(&args).await.map(|_| ())
    }
}

fn change_kind(code: char) -> Option<ChangeKind> {
    match code {
        'M' => Some(ChangeKind::Modified),
        'A' | 'R' | 'C' | '?' => Some(ChangeKind::Added),
        'D' => Some(ChangeKind::Deleted),
        'T' => Some(ChangeKind::TypeChanged),
        _ => None,
    }
}

/// Parse `git status --porcelain=v1 -z` output.
///
/// Renames and copies carry the original path as an extra NUL-separated
/// field, which is skipped; the new path is reported as Added.
fn parse_porcelain(raw: &str) -> RepoStatus {
    let mut status = RepoStatus::default();
    let mut fields = raw.split('\0').filter(|f| !f.is_empty());

    while let Some(entry) = fields.next() {
        let mut chars = entry.chars();
        let (Some(index), Some(worktree)) = (chars.next(), chars.next()) else {
            continue;
        };
        let path = entry.get(3..).unwrap_or_default().to_string();
        if path.is_empty() {
            continue;
        }

        if matches!(index, 'R' | 'C') {
            fields.next();
        }

        if index == '?' {
            status
                .working_tree
                .push(ChangeRecord::new(path, ChangeKind::Added));
            continue;
        }

        if let Some(kind) = change_kind(worktree) {
            status
                .working_tree
                .push(ChangeRecord::new(path.clone(), kind));
        }
        if let Some(kind) = change_kind(index) {
            status.staged.push(ChangeRecord::new(path, kind));
        }
    }

    status
}

/// Porcelain paths are relative to the repository top level. Re-express them
/// relative to the working directory below it at `prefix`; paths outside
/// that directory become absolute.
fn anchor_paths(status: RepoStatus, toplevel: &Path, prefix: &str) -> RepoStatus {
    if prefix.is_empty() {
        return status;
    }
    let anchor = |records: Vec<ChangeRecord>| -> Vec<ChangeRecord> {
        records
            .into_iter()
            .map(|record| {
                let path = match record.path.strip_prefix(prefix) {
                    Some(inside) => inside.to_string(),
                    None => toplevel.join(&record.path).to_string_lossy().into_owned(),
                };
                ChangeRecord::new(path, record.kind)
            })
            .collect()
    };
    RepoStatus {
        working_tree: anchor(status.working_tree),
        staged: anchor(status.staged),
    }
}

/// Parse `git remote -v`, keeping the fetch URL of each remote.
fn parse_remotes(raw: &str) -> Vec<Remote> {
    raw.lines()
        .filter(|line| line.ends_with("(fetch)"))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let url = parts.next()?;
            Some(Remote {
                name: name.to_string(),
                fetch_url: url.to_string(),
            })
        })
        .collect()
}
