use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use super::common::announce_session;
use crate::drafts::DraftStore;
use crate::environment::Environment;
use crate::handoff::submit;

/// The given prompt file, or the newest saved draft.
async fn prompt_file(drafts: &DraftStore, file: Option<&Path>) -> Result<PathBuf> {
    if let Some(file) = file {
        return Ok(file.to_path_buf());
    }

    let newest = drafts.list().await?.into_iter().next().with_context(|| {
        format!(
            "No prompt file given and no drafts in {}. Run 'handoff start --no-edit' first.",
            drafts.dir().display()
        )
    })?;
    info!("Sending newest draft {}", newest.display());
    Ok(newest)
}

/// Submit an edited prompt file as a new Jules session.
pub async fn run_send(
    env: &Environment,
    file: Option<&Path>,
    title: Option<&str>,
    no_open: bool,
) -> Result<()> {
    let file = prompt_file(&env.drafts(), file).await?;
    let prompt = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read prompt file: {}", file.display()))?;

    let client = env.api_client()?;
    let session = submit(
        &env.git(),
        &env.secrets(),
        &client,
        &prompt,
        title,
        env.settings.max_prompt_length,
    )
    .await?;

    announce_session(&session, no_open)
}
