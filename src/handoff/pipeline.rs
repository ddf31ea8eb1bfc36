use chrono::Utc;
use std::future::Future;
use std::path::Path;
use tracing::{debug, info};

use super::commission::submit;
use super::state::{HandoffEvent, StateTracker};
use super::sync::{stage_commit_push, SyncOutcome};
use crate::api::ApiClient;
use crate::context::{gather_context, validate_context_id, ArtifactStore, ContextSelection, GatheredContext};
use crate::credentials::SecretStore;
use crate::domain::{ChangeRecord, RemoteSession};
use crate::editor::EditorSurface;
use crate::error::{HandoffError, HandoffResult};
use crate::prompt::{assemble, PromptBudget, PromptDocument, PromptInputs};
use crate::vcs::{RepoStatus, SourceControl};

/// Asks whether a dirty working tree may be committed and pushed.
pub trait SyncConsent: Send + Sync {
    fn confirm_sync(&self, status: &RepoStatus) -> impl Future<Output = bool> + Send;
}

/// A fixed answer, for non-interactive callers.
impl SyncConsent for bool {
    async fn confirm_sync(&self, _status: &RepoStatus) -> bool {
        *self
    }
}

/// Output of the local half of a handoff.
#[derive(Debug, Clone)]
pub struct PreparedHandoff {
    pub document: PromptDocument,
    pub context: GatheredContext,
    /// Changes the diff was built from, captured before any sync.
    pub changes: Vec<ChangeRecord>,
    pub sync: Option<SyncOutcome>,
}

pub struct Pipeline<'a, S, E> {
    scm: &'a S,
    editor: &'a E,
    store: &'a ArtifactStore,
    budget: PromptBudget,
    workspace_root: &'a Path,
    tracker: StateTracker,
}

impl<'a, S, E> Pipeline<'a, S, E>
where
    S: SourceControl,
    E: EditorSurface,
{
    pub fn new(
        scm: &'a S,
        editor: &'a E,
        store: &'a ArtifactStore,
        budget: PromptBudget,
        workspace_root: &'a Path,
    ) -> Self {
        Self {
            scm,
            editor,
            store,
            budget,
            workspace_root,
            tracker: StateTracker::new(),
        }
    }

    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    fn advance(&self, event: HandoffEvent) -> HandoffResult<()> {
        self.tracker
            .apply(event)
            .map(|_| ())
            .map_err(|e| HandoffError::validation("handoff state", e.to_string()))
    }

    /// Move to `Cancelled` or `Failed` according to `err`.
    fn settle_error(&self, err: &HandoffError) {
        let event = match err {
            HandoffError::Cancelled => HandoffEvent::Cancel,
            _ => HandoffEvent::Fail,
        };
        if let Err(e) = self.tracker.apply(event) {
            debug!("Ignoring state change after error: {}", e);
        }
    }

    async fn gather_and_assemble(
        &self,
        changes: Vec<ChangeRecord>,
        selection: &ContextSelection,
        sync: Option<SyncOutcome>,
    ) -> PreparedHandoff {
        let context = gather_context(
            self.editor,
            &changes,
            self.store,
            selection,
            self.workspace_root,
        )
        .await;

        let inputs = PromptInputs {
            diff: &context.diff,
            errors: context.errors.as_deref(),
            symbol_context: context.symbol_context.as_deref(),
            active_file: context.active_file.as_ref(),
            artifacts: context.artifacts.as_deref(),
        };
        let document = assemble(&inputs, &self.budget);
        info!(
            "Assembled prompt: {} of {} chars",
            document.char_len(),
            self.budget.max_length
        );

        PreparedHandoff {
            document,
            context,
            changes,
            sync,
        }
    }

    /// Gather and assemble without touching the repository.
    pub async fn preview(&self, selection: &ContextSelection) -> HandoffResult<PreparedHandoff> {
        if let ContextSelection::Id(id) = selection {
            validate_context_id(id)?;
        }
        let status = self.scm.status().await?;
        Ok(self
            .gather_and_assemble(status.all_changes(), selection, None)
            .await)
    }

    /// Sync if needed, then gather and assemble. Ends in `AwaitingReview`.
    ///
    /// Sync always completes before gathering starts, so the prompt
    /// describes exactly what was pushed.
    pub async fn prepare<C: SyncConsent>(
        &self,
        selection: &ContextSelection,
        auto_sync: bool,
        consent: &C,
    ) -> HandoffResult<PreparedHandoff> {
        if let ContextSelection::Id(id) = selection {
            validate_context_id(id)?;
        }
        self.advance(HandoffEvent::Begin)?;

        let result = self.prepare_inner(selection, auto_sync, consent).await;
        if let Err(e) = &result {
            self.settle_error(e);
        }
        result
    }

    async fn prepare_inner<C: SyncConsent>(
        &self,
        selection: &ContextSelection,
        auto_sync: bool,
        consent: &C,
    ) -> HandoffResult<PreparedHandoff> {
        let status = self.scm.status().await?;
        let changes = status.all_changes();

        let sync = if status.is_dirty() {
            if !auto_sync && !consent.confirm_sync(&status).await {
                info!("Sync declined, cancelling handoff");
                return Err(HandoffError::Cancelled);
            }
            stage_commit_push(self.scm, Utc::now()).await?
        } else {
            None
        };

        self.advance(HandoffEvent::Synced)?;
        let prepared = self.gather_and_assemble(changes, selection, sync).await;
        self.advance(HandoffEvent::Gathered)?;
        Ok(prepared)
    }

    /// The user closed the review without submitting.
    pub fn cancel_review(&self) {
        self.settle_error(&HandoffError::Cancelled);
    }

    /// Submit the reviewed prompt. No cancellation once this starts.
    pub async fn send<K: SecretStore>(
        &self,
        secrets: &K,
        client: &ApiClient,
        prompt: &str,
        title: Option<&str>,
    ) -> HandoffResult<RemoteSession> {
        self.advance(HandoffEvent::Submitted)?;
        match submit(
            self.scm,
            secrets,
            client,
            prompt,
            title,
            self.budget.max_length,
        )
        .await
        {
            Ok(session) => {
                self.advance(HandoffEvent::Sent)?;
                Ok(session)
            }
            Err(e) => {
                self.settle_error(&e);
                Err(e)
            }
        }
    }
}
