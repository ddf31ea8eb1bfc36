//! list_contexts tool implementation.

use rmcp::{model::*, ErrorData as McpError};

use super::common::tool_error;
use crate::environment::Environment;
use crate::mcp::types::ListContextsArgs;

const DEFAULT_LIMIT: usize = 10;

/// Prior agent sessions with saved artifacts, newest first, as JSON.
pub async fn list_contexts(
    env: &Environment,
    args: ListContextsArgs,
) -> Result<CallToolResult, McpError> {
    let limit = args.limit.unwrap_or(DEFAULT_LIMIT).max(1);
    let contexts: Vec<_> = env
        .artifact_store()
        .list_contexts()
        .await
        .into_iter()
        .take(limit)
        .collect();

    match serde_json::to_string_pretty(&contexts) {
        Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
        Err(e) => Ok(tool_error(format!("Error: {}", e))),
    }
}
