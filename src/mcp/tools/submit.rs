//! submit_handoff tool implementation.

use rmcp::{model::*, ErrorData as McpError};
use std::path::{Path, PathBuf};

use super::common::{handoff_error, tool_error};
use crate::environment::Environment;
use crate::error::{HandoffError, HandoffResult, SecurityKind};
use crate::handoff::submit;
use crate::mcp::types::SubmitHandoffArgs;

/// Resolve a draft path, refusing anything outside the drafts directory.
pub(crate) fn confine_draft(drafts_dir: &Path, raw: &str) -> HandoffResult<PathBuf> {
    let root = drafts_dir.canonicalize()?;
    let path = Path::new(raw);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        drafts_dir.join(path)
    };
    let resolved = path.canonicalize()?;
    if !resolved.starts_with(&root) || resolved == root {
        return Err(HandoffError::security(
            SecurityKind::PathEscape,
            format!("{} is not a handoff draft", raw),
        ));
    }
    Ok(resolved)
}

async fn prompt_text(env: &Environment, args: &SubmitHandoffArgs) -> HandoffResult<String> {
    if let Some(prompt) = args.prompt.as_ref().filter(|p| !p.trim().is_empty()) {
        return Ok(prompt.clone());
    }
    let Some(raw) = args.draft_path.as_deref() else {
        return Err(HandoffError::validation(
            "prompt",
            "provide either prompt or draft_path",
        ));
    };
    let drafts = env.drafts();
    let path = confine_draft(drafts.dir(), raw)?;
    Ok(tokio::fs::read_to_string(path).await?)
}

/// Create the remote session from a reviewed prompt.
pub async fn submit_handoff(
    env: &Environment,
    args: SubmitHandoffArgs,
) -> Result<CallToolResult, McpError> {
    let prompt = match prompt_text(env, &args).await {
        Ok(prompt) => prompt,
        Err(e) => return Ok(handoff_error(&e)),
    };

    let client = match env.api_client() {
        Ok(client) => client,
        Err(e) => return Ok(handoff_error(&e)),
    };
    let secrets = env.secrets();
    let git = env.git();

    match submit(
        &git,
        &secrets,
        &client,
        &prompt,
        args.title.as_deref(),
        env.settings.max_prompt_length,
    )
    .await
    {
        Ok(session) => Ok(CallToolResult::success(vec![Content::text(format!(
            "Created Jules session {}\nDashboard: {}",
            session.id, session.dashboard_url
        ))])),
        Err(e @ HandoffError::ProjectNotInitialized { .. }) => Ok(handoff_error(&e)),
        Err(e) if e.is_transient() => Ok(tool_error(format!(
            "Error: {}\nThe session may not have been created; retry submit_handoff.",
            e
        ))),
        Err(e) => Ok(handoff_error(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_confine_draft() {
        let tmp = TempDir::new().unwrap();
        let drafts = tmp.path().join("drafts");
        std::fs::create_dir_all(&drafts).unwrap();
        std::fs::write(drafts.join("a.md"), "x").unwrap();
        std::fs::write(tmp.path().join("secret.txt"), "x").unwrap();

        assert!(confine_draft(&drafts, "a.md").is_ok());
        assert!(confine_draft(&drafts, drafts.join("a.md").to_str().unwrap()).is_ok());
        assert!(matches!(
            confine_draft(&drafts, "../secret.txt"),
            Err(HandoffError::Security { kind: SecurityKind::PathEscape, .. })
        ));
        assert!(matches!(
            confine_draft(&drafts, tmp.path().join("secret.txt").to_str().unwrap()),
            Err(HandoffError::Security { .. })
        ));
        assert!(matches!(confine_draft(&drafts, "missing.md"), Err(HandoffError::Io(_))));
    }
}
