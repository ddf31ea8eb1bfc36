//! handoff_status tool implementation.

use rmcp::{model::*, ErrorData as McpError};

use super::common::handoff_error;
use crate::environment::Environment;
use crate::handoff::collect_status;
use crate::mcp::types::HandoffStatusArgs;

const STATUS_CONTEXT_LIMIT: usize = 3;

/// Credential, repository, working tree and artifact readiness.
pub async fn handoff_status(
    env: &Environment,
    _args: HandoffStatusArgs,
) -> Result<CallToolResult, McpError> {
    let secrets = env.secrets();
    let key_source = match secrets.key_source().await {
        Ok(source) => source,
        Err(e) => return Ok(handoff_error(&e)),
    };

    let report = collect_status(
        key_source,
        &env.git(),
        &env.artifact_store(),
        STATUS_CONTEXT_LIMIT,
    )
    .await;

    Ok(CallToolResult::success(vec![Content::text(report.to_string())]))
}
