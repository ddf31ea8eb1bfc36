use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use tracing::warn;

use crate::api::validate_external_url;
use crate::context::ContextSelection;
use crate::domain::RemoteSession;
use crate::editor::SnapshotEditor;
use crate::handoff::SyncConsent;
use crate::vcs::RepoStatus;

/// Print `question` and read one trimmed line from stdin.
pub fn ask(question: &str) -> Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("Failed to read from stdin")?;
    Ok(answer.trim().to_string())
}

/// `y`/`yes` is consent; anything else, including EOF, is not.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "y" | "yes")
}

/// Asks on the terminal before a dirty tree is committed and pushed.
pub struct TerminalConsent;

impl SyncConsent for TerminalConsent {
    async fn confirm_sync(&self, status: &RepoStatus) -> bool {
        let changes = status.all_changes();
        println!("⚠️  {} uncommitted change(s):", changes.len());
        for change in &changes {
            println!("   {:?} {}", change.kind, change.path);
        }

        let question =
            "Commit and push them to a WIP branch so Jules can see them? [y/N]: ".to_string();
        match tokio::task::spawn_blocking(move || ask(&question)).await {
            Ok(Ok(answer)) => is_yes(&answer),
            Ok(Err(e)) => {
                warn!("Could not read confirmation: {}", e);
                false
            }
            Err(e) => {
                warn!("Confirmation prompt failed: {}", e);
                false
            }
        }
    }
}

/// `--context` / `--no-artifacts` to an artifact selection.
pub fn context_selection(context: Option<String>, no_artifacts: bool) -> ContextSelection {
    if no_artifacts {
        return ContextSelection::Skip;
    }
    match context.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() => ContextSelection::Id(id),
        _ => ContextSelection::MostRecent,
    }
}

/// The `--editor-state` snapshot, or an editor with nothing open.
pub async fn load_editor(editor_state: Option<&Path>, workspace_root: &Path) -> Result<SnapshotEditor> {
    match editor_state {
        Some(path) => Ok(SnapshotEditor::load(path, workspace_root.to_path_buf()).await?),
        None => Ok(SnapshotEditor::empty(workspace_root.to_path_buf())),
    }
}

/// Print the created session and open its dashboard.
pub fn announce_session(session: &RemoteSession, no_open: bool) -> Result<()> {
    let url = validate_external_url(&session.dashboard_url)?;

    println!("✅ Jules session created: {}", session.id);
    println!("   Dashboard: {}", url);

    if !no_open && open::that(url.as_str()).is_err() {
        println!("⚠️  Could not open browser automatically.");
    }
    Ok(())
}
