//! Read-only discovery of prior agent sessions.
//!
//! Each direct subdirectory of the artifact root is one conversation. Two
//! markdown files inside it are meaningful: the task checklist and the
//! implementation plan. They provide both the conversation title and the
//! artifact text folded into the prompt.
//!
//! Every path is canonicalised and checked to remain under the canonical
//! root before it is read. Escaping paths are logged and skipped.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::domain::{Artifact, ConversationContext};
use crate::error::{HandoffError, HandoffResult, SecurityKind};

pub const TASK_FILE: &str = "task.md";
pub const PLAN_FILE: &str = "implementation_plan.md";

/// Well-known artifact files with their section headers, in title priority order.
const ARTIFACT_FILES: &[(&str, &str)] = &[
    (TASK_FILE, "CURRENT TASK CHECKLIST"),
    (PLAN_FILE, "IMPLEMENTATION PLAN"),
];

/// Headings that say nothing about the conversation.
const GENERIC_TITLES: &[&str] = &["tasks", "task", "implementation plan", "task list", "plan"];

/// Default bytes read from a marker file when looking for a title.
pub const DEFAULT_TITLE_PREFIX_BYTES: usize = 2048;

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    title_prefix_bytes: usize,
}

impl ArtifactStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            title_prefix_bytes: DEFAULT_TITLE_PREFIX_BYTES,
        }
    }

    pub fn with_title_prefix_bytes(mut self, bytes: usize) -> Self {
        self.title_prefix_bytes = bytes.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical root, or `None` if it does not exist.
    async fn canonical_root(&self) -> Option<PathBuf> {
        match tokio::fs::canonicalize(&self.root).await {
            Ok(root) => Some(root),
            Err(e) => {
                debug!("Artifact root {} unavailable: {}", self.root.display(), e);
                None
            }
        }
    }

    /// Resolve `path` and make sure it stays under `root`.
    ///
    /// Missing paths resolve to `Ok(None)`.
    async fn confine(&self, root: &Path, path: &Path) -> HandoffResult<Option<PathBuf>> {
        let resolved = match tokio::fs::canonicalize(path).await {
            Ok(p) => p,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if resolved == root || !resolved.starts_with(root) {
            return Err(HandoffError::security(
                SecurityKind::PathEscape,
                format!(
                    "{} resolves outside artifact root {}",
                    path.display(),
                    root.display()
                ),
            ));
        }
        Ok(Some(resolved))
    }

    /// Conversations under the root, most recently modified first.
    pub async fn list_contexts(&self) -> Vec<ConversationContext> {
        let Some(root) = self.canonical_root().await else {
            return Vec::new();
        };

        let mut entries = match tokio::fs::read_dir(&root).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read artifact root {}: {}", root.display(), e);
                return Vec::new();
            }
        };

        let mut contexts = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Error reading artifact root: {}", e);
                    break;
                }
            };

            let dir = match self.confine(&root, &entry.path()).await {
                Ok(Some(dir)) => dir,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping conversation: {}", e);
                    continue;
                }
            };

            let metadata = match tokio::fs::metadata(&dir).await {
                Ok(m) if m.is_dir() => m,
                _ => continue,
            };

            let id = entry.file_name().to_string_lossy().to_string();
            let last_modified = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            let title = self
                .extract_title(&root, &dir)
                .await
                .unwrap_or_else(|| id.clone());

            contexts.push(ConversationContext {
                id,
                title,
                path: dir,
                last_modified,
            });
        }

        contexts.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        debug!("Found {} conversation context(s)", contexts.len());
        contexts
    }

    /// First non-generic heading of the task file, then the plan file.
    async fn extract_title(&self, root: &Path, dir: &Path) -> Option<String> {
        for (file, _) in ARTIFACT_FILES {
            let path = match self.confine(root, &dir.join(file)).await {
                Ok(Some(path)) => path,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping title candidate: {}", e);
                    continue;
                }
            };
            match read_prefix(&path, self.title_prefix_bytes).await {
                Ok(prefix) => {
                    if let Some(title) = first_meaningful_heading(&prefix) {
                        return Some(title);
                    }
                }
                Err(e) => debug!("Failed to read {}: {}", path.display(), e),
            }
        }
        None
    }

    /// Artifacts of one conversation directory, each wrapped with its header.
    pub async fn read_artifacts(&self, context_path: &Path) -> Vec<Artifact> {
        let Some(root) = self.canonical_root().await else {
            return Vec::new();
        };

        let dir = match self.confine(&root, context_path).await {
            Ok(Some(dir)) => dir,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Refusing to read artifacts: {}", e);
                return Vec::new();
            }
        };

        let mut artifacts = Vec::new();
        for (file, header) in ARTIFACT_FILES {
            let path = match self.confine(&root, &dir.join(file)).await {
                Ok(Some(path)) => path,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Refusing to read artifact: {}", e);
                    continue;
                }
            };
            match tokio::fs::read_to_string(&path).await {
                Ok(content) if !content.trim().is_empty() => artifacts.push(Artifact {
                    name: (*file).to_string(),
                    content: format!("=== {} ===\n{}", header, content.trim_end()),
                }),
                Ok(_) => debug!("Skipping empty artifact {}", path.display()),
                Err(e) => warn!("Failed to read artifact {}: {}", path.display(), e),
            }
        }
        artifacts
    }
}

/// Reject conversation ids that could address anything but a direct child.
pub fn validate_context_id(id: &str) -> HandoffResult<()> {
    if id.is_empty() {
        return Err(HandoffError::validation("context id", "must not be empty"));
    }
    if id.contains(['/', '\\', '\0']) || id.contains("..") {
        return Err(HandoffError::security(
            SecurityKind::PathTraversal,
            format!("context id '{}' contains a path separator or traversal sequence", id),
        ));
    }
    Ok(())
}

/// Join artifacts into the text of the prompt's artifact section.
pub fn join_artifacts(artifacts: &[Artifact]) -> Option<String> {
    if artifacts.is_empty() {
        return None;
    }
    Some(
        artifacts
            .iter()
            .map(|a| a.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"),
    )
}

async fn read_prefix(path: &Path, limit: usize) -> std::io::Result<String> {
    let file = tokio::fs::File::open(path).await?;
    let mut buf = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn first_meaningful_heading(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim())
        .find(|title| {
            !title.is_empty() && !GENERIC_TITLES.contains(&title.to_lowercase().as_str())
        })
        .map(str::to_string)
}
