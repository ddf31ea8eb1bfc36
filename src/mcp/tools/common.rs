//! Common utilities for MCP tools.

use rmcp::model::{CallToolResult, Content};

use crate::error::HandoffError;

/// Error result for tool failures
pub fn tool_error(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Error result carrying the remediation hint, if any.
pub fn handoff_error(err: &HandoffError) -> CallToolResult {
    match err.remediation() {
        Some(hint) => tool_error(format!("Error: {}\n{}", err, hint)),
        None => tool_error(format!("Error: {}", err)),
    }
}
