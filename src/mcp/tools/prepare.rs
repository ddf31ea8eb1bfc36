//! prepare_handoff tool implementation.

use chrono::Utc;
use rmcp::{model::*, ErrorData as McpError};
use tracing::info;

use super::common::{handoff_error, tool_error};
use crate::context::ContextSelection;
use crate::editor::SnapshotEditor;
use crate::environment::Environment;
use crate::error::HandoffError;
use crate::handoff::Pipeline;
use crate::mcp::types::PrepareHandoffArgs;
use crate::prompt::{Inclusion, PromptDocument, Section};

const DIRTY_TREE_MESSAGE: &str = "The working tree has uncommitted changes. Call prepare_handoff \
again with sync=true to commit and push them to a WIP branch, or enable autoSync with \
'handoff config set autoSync true'.";

/// Sections the length budget cut short, e.g. `git_diff truncated`.
fn budget_note(document: &PromptDocument) -> Option<String> {
    let trimmed: Vec<String> = Section::ALL
        .iter()
        .filter_map(|section| match document.inclusion(*section) {
            Inclusion::Truncated => Some(format!("{} truncated", section.tag())),
            Inclusion::Skipped => Some(format!("{} skipped", section.tag())),
            Inclusion::Included | Inclusion::Absent => None,
        })
        .collect();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.join(", "))
    }
}

pub(crate) fn selection_for(args: &PrepareHandoffArgs) -> ContextSelection {
    if args.skip_artifacts {
        return ContextSelection::Skip;
    }
    match args.context_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => ContextSelection::Id(id.to_string()),
        _ => ContextSelection::MostRecent,
    }
}

/// Sync, gather and assemble; the prompt is saved as a draft for review.
pub async fn prepare_handoff(
    env: &Environment,
    args: PrepareHandoffArgs,
) -> Result<CallToolResult, McpError> {
    let selection = selection_for(&args);
    let editor = match args.editor_state {
        Some(value) => match SnapshotEditor::from_value(value, env.workspace_root.clone()) {
            Ok(editor) => editor,
            Err(e) => return Ok(handoff_error(&e)),
        },
        None => SnapshotEditor::empty(env.workspace_root.clone()),
    };

    let git = env.git();
    let store = env.artifact_store();
    let pipeline = Pipeline::new(
        &git,
        &editor,
        &store,
        env.settings.budget(),
        &env.workspace_root,
    );

    let prepared = match pipeline
        .prepare(&selection, env.settings.auto_sync, &args.sync)
        .await
    {
        Ok(prepared) => prepared,
        Err(HandoffError::Cancelled) => return Ok(tool_error(DIRTY_TREE_MESSAGE)),
        Err(e) => return Ok(handoff_error(&e)),
    };

    let drafts = env.drafts();
    let draft = match drafts.save(&prepared.document.text, Utc::now()).await {
        Ok(path) => path,
        Err(e) => return Ok(handoff_error(&e)),
    };
    info!("Prepared handoff draft {:?}", draft);

    let mut summary = format!(
        "Draft saved to {}\nPrompt length: {} characters",
        draft.display(),
        prepared.document.char_len()
    );
    if let Some(note) = budget_note(&prepared.document) {
        summary.push_str(&format!("\nOver budget: {}", note));
    }
    if let Some(sync) = &prepared.sync {
        summary.push_str(&format!("\nPushed local changes to {}/{}", sync.remote, sync.branch));
    }
    if let Some(conversation) = &prepared.context.conversation {
        summary.push_str(&format!("\nArtifacts from: {} ({})", conversation.title, conversation.id));
    }
    summary.push_str(
        "\nReplace the mission brief placeholder, then call submit_handoff with the prompt or draft_path.",
    );

    Ok(CallToolResult::success(vec![
        Content::text(summary),
        Content::text(prepared.document.text),
    ]))
}
