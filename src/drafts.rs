//! Prompt drafts and review in the user's editor.
//!
//! Every assembled prompt is written to `~/.jules-handoff/drafts/` before
//! review, so an edited draft survives a failed submission and can be
//! resent with `handoff send`.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{HandoffError, HandoffResult};
use crate::handoff::{open_review, ReviewOutcome, ReviewSession};
use crate::prompt::{extract_mission_brief, MISSION_PLACEHOLDER};

pub const DRAFTS_DIR: &str = "drafts";

pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            dir: cache_dir.join(DRAFTS_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(&self, text: &str, now: DateTime<Utc>) -> HandoffResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self
            .dir
            .join(format!("{}.md", now.format("%Y%m%dT%H%M%S%.3fZ")));
        tokio::fs::write(&path, text).await?;
        debug!("Draft saved to {:?}", path);
        Ok(path)
    }

    /// Draft files, newest first.
    pub async fn list(&self) -> HandoffResult<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut drafts = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                drafts.push(path);
            }
        }
        drafts.sort();
        drafts.reverse();
        Ok(drafts)
    }
}

/// `$VISUAL`, then `$EDITOR`, then `vi`.
pub fn editor_command() -> String {
    std::env::var("VISUAL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| std::env::var("EDITOR").ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_string())
}

/// Submit unless the text is empty or the brief still holds the placeholder.
pub fn review_decision(text: &str) -> ReviewOutcome {
    if text.trim().is_empty() {
        return ReviewOutcome::Cancelled;
    }
    match extract_mission_brief(text) {
        Some(brief) if brief.is_empty() || brief == MISSION_PLACEHOLDER => ReviewOutcome::Cancelled,
        _ => ReviewOutcome::Submitted(text.to_string()),
    }
}

/// Run `editor` on `path` through the shell so editor arguments work.
async fn run_editor(editor: &str, path: &Path) -> HandoffResult<()> {
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("{} \"$1\"", editor))
        .arg("sh")
        .arg(path)
        .status()
        .await?;

    if !status.success() {
        return Err(HandoffError::Io(std::io::Error::other(format!(
            "editor `{}` exited with {}",
            editor, status
        ))));
    }
    Ok(())
}

/// Open the draft in an editor; resolves on editor exit or Ctrl-C.
pub fn spawn_editor_review(editor: String, path: PathBuf) -> ReviewSession {
    let (handle, session) = open_review();

    let on_interrupt = handle.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.close();
        }
    });

    tokio::spawn(async move {
        let outcome = match run_editor(&editor, &path).await {
            Ok(()) => match tokio::fs::read_to_string(&path).await {
                Ok(text) => review_decision(&text),
                Err(e) => {
                    warn!("Could not read draft {:?}: {}", path, e);
                    ReviewOutcome::Cancelled
                }
            },
            Err(e) => {
                warn!("Editor failed: {}", e);
                ReviewOutcome::Cancelled
            }
        };
        match outcome {
            ReviewOutcome::Submitted(text) => handle.submit(text),
            ReviewOutcome::Cancelled => handle.close(),
        };
        interrupt.abort();
    });

    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn brief(text: &str) -> String {
        format!("<instruction>\nx\n</instruction>\n<mission_brief>\n{}\n</mission_brief>\n", text)
    }

    #[test]
    fn test_review_decision() {
        assert_eq!(review_decision("  \n"), ReviewOutcome::Cancelled);
        assert_eq!(review_decision(&brief(MISSION_PLACEHOLDER)), ReviewOutcome::Cancelled);
        assert_eq!(review_decision(&brief("")), ReviewOutcome::Cancelled);

        let edited = brief("Add retries to the uploader");
        assert_eq!(review_decision(&edited), ReviewOutcome::Submitted(edited.clone()));
    }

    #[tokio::test]
    async fn test_drafts_newest_first() {
        let tmp = TempDir::new().unwrap();
        let store = DraftStore::new(tmp.path());
        assert!(store.list().await.unwrap().is_empty());

        let older = store
            .save("one", Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
            .await
            .unwrap();
        let newer = store
            .save("two", Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
            .await
            .unwrap();

        assert_eq!(store.list().await.unwrap(), vec![newer, older]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_editor_review_outcomes() {
        let tmp = TempDir::new().unwrap();
        let store = DraftStore::new(tmp.path());

        let untouched = store.save(&brief(MISSION_PLACEHOLDER), Utc::now()).await.unwrap();
        let session = spawn_editor_review("true".to_string(), untouched);
        assert_eq!(session.wait().await, ReviewOutcome::Cancelled);

        let ready = store
            .save(&brief("Ship it"), Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap())
            .await
            .unwrap();
        let session = spawn_editor_review("true".to_string(), ready);
        assert_eq!(
            session.wait().await,
            ReviewOutcome::Submitted(brief("Ship it"))
        );

        let failing = store.save(&brief("Ship it"), Utc::now()).await.unwrap();
        let session = spawn_editor_review("false".to_string(), failing);
        assert_eq!(session.wait().await, ReviewOutcome::Cancelled);
    }
}
