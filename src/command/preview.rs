use anyhow::Result;
use std::path::Path;
use tracing::info;

use super::common::load_editor;
use crate::context::ContextSelection;
use crate::environment::Environment;
use crate::handoff::Pipeline;

/// Print the prompt a handoff would send. Never touches git state.
pub async fn run_preview(
    env: &Environment,
    editor_state: Option<&Path>,
    selection: ContextSelection,
) -> Result<()> {
    let editor = load_editor(editor_state, &env.workspace_root).await?;
    let git = env.git();
    let store = env.artifact_store();
    let pipeline = Pipeline::new(
        &git,
        &editor,
        &store,
        env.settings.budget(),
        &env.workspace_root,
    );

    let prepared = pipeline.preview(&selection).await?;
    for (section, inclusion) in &prepared.document.sections {
        info!("<{}>: {:?}", section.tag(), inclusion);
    }
    if !prepared.changes.is_empty() {
        info!(
            "{} uncommitted change(s) would be pushed to a WIP branch by 'handoff start'",
            prepared.changes.len()
        );
    }

    println!("{}", prepared.document.text);
    Ok(())
}
