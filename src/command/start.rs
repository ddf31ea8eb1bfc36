use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use tracing::info;

use super::common::{announce_session, load_editor, TerminalConsent};
use crate::context::ContextSelection;
use crate::drafts::{editor_command, spawn_editor_review};
use crate::editor::EditorSurface;
use crate::environment::Environment;
use crate::error::HandoffError;
use crate::handoff::{Pipeline, ReviewOutcome};
use crate::vcs::SourceControl;

pub struct StartOptions {
    pub editor_state: Option<PathBuf>,
    pub selection: ContextSelection,
    /// `--auto-sync`; the persisted setting still applies when false.
    pub auto_sync: bool,
    pub no_edit: bool,
    pub no_open: bool,
}

/// Full handoff: sync, gather, assemble, review in $EDITOR, submit.
pub async fn run_start(env: &Environment, options: StartOptions) -> Result<()> {
    let editor = load_editor(options.editor_state.as_deref(), &env.workspace_root).await?;
    let git = env.git();
    let store = env.artifact_store();
    let pipeline = Pipeline::new(
        &git,
        &editor,
        &store,
        env.settings.budget(),
        &env.workspace_root,
    );

    let mut states = pipeline.tracker().subscribe();
    let watcher = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            info!("Handoff {}", state.label());
        }
    });

    let result = drive(env, &pipeline, &options).await;
    drop(pipeline);
    let _ = watcher.await;
    result
}

async fn drive<S, E>(
    env: &Environment,
    pipeline: &Pipeline<'_, S, E>,
    options: &StartOptions,
) -> Result<()>
where
    S: SourceControl,
    E: EditorSurface,
{
    let auto_sync = options.auto_sync || env.settings.auto_sync;
    let prepared = match pipeline
        .prepare(&options.selection, auto_sync, &TerminalConsent)
        .await
    {
        Ok(prepared) => prepared,
        Err(HandoffError::Cancelled) => {
            println!("Handoff cancelled. Nothing was committed or pushed.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(sync) = &prepared.sync {
        println!("✅ Pushed local changes to {}/{}", sync.remote, sync.branch);
    }
    if let Some(conversation) = &prepared.context.conversation {
        println!("   Artifacts from: {} ({})", conversation.title, conversation.id);
    }

    let draft = env
        .drafts()
        .save(&prepared.document.text, Utc::now())
        .await?;

    if options.no_edit {
        pipeline.cancel_review();
        println!("Draft saved to {}", draft.display());
        println!(
            "Fill in the mission brief, then run 'handoff send {}'",
            draft.display()
        );
        return Ok(());
    }

    let editor = editor_command();
    println!("Opening the draft in {}. Fill in the mission brief, save and quit.", editor);

    match spawn_editor_review(editor, draft.clone()).wait().await {
        ReviewOutcome::Cancelled => {
            pipeline.cancel_review();
            println!("Handoff cancelled. The draft is kept at {}", draft.display());
            if let Some(sync) = &prepared.sync {
                println!("   The WIP branch {} stays on {}.", sync.branch, sync.remote);
            }
            Ok(())
        }
        ReviewOutcome::Submitted(prompt) => {
            let client = env.api_client()?;
            let session = pipeline
                .send(&env.secrets(), &client, &prompt, None)
                .await?;
            announce_session(&session, options.no_open)
        }
    }
}
