use std::fmt;

use super::commission::resolve_coordinates;
use crate::context::ArtifactStore;
use crate::credentials::KeySource;
use crate::domain::{ConversationContext, RepositoryCoordinates};
use crate::vcs::SourceControl;

/// Readiness summary shown by `handoff status` and the status tool.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub key_source: Option<KeySource>,
    pub repository: Result<RepositoryCoordinates, String>,
    pub changed_files: Option<usize>,
    pub contexts: Vec<ConversationContext>,
}

impl StatusReport {
    pub fn is_ready(&self) -> bool {
        self.key_source.is_some() && self.repository.is_ok()
    }
}

/// Collect the report; each part degrades independently.
pub async fn collect_status<S: SourceControl>(
    key_source: Option<KeySource>,
    scm: &S,
    store: &ArtifactStore,
    context_limit: usize,
) -> StatusReport {
    let (repository, status, contexts) = tokio::join!(
        resolve_coordinates(scm),
        scm.status(),
        store.list_contexts()
    );

    StatusReport {
        key_source,
        repository: repository.map_err(|e| e.to_string()),
        changed_files: status.ok().map(|s| s.all_changes().len()),
        contexts: contexts.into_iter().take(context_limit).collect(),
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key_source {
            Some(KeySource::Environment) => writeln!(f, "API key: set (JULES_API_KEY)")?,
            Some(KeySource::File) => writeln!(f, "API key: stored")?,
            None => writeln!(f, "API key: missing (run 'handoff set-key')")?,
        }

        match &self.repository {
            Ok(coords) => writeln!(
                f,
                "Repository: {}/{} @ {}",
                coords.owner, coords.repo_name, coords.branch
            )?,
            Err(e) => writeln!(f, "Repository: unavailable ({})", e)?,
        }

        match self.changed_files {
            Some(0) => writeln!(f, "Working tree: clean")?,
            Some(n) => writeln!(f, "Working tree: {} uncommitted change(s)", n)?,
            None => writeln!(f, "Working tree: unknown")?,
        }

        if self.contexts.is_empty() {
            write!(f, "Artifact contexts: none")
        } else {
            write!(f, "Artifact contexts:")?;
            for context in &self.contexts {
                write!(f, "\n  {}  {}", context.id, context.title)?;
            }
            Ok(())
        }
    }
}
