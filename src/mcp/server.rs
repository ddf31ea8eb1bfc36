//! MCP server implementation.
//!
//! This module contains the HandoffMcpServer struct and its tool routing.

use rmcp::{
    handler::server::router::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use std::sync::Arc;
use tracing::debug;

use super::tools;
use super::types::*;
use crate::environment::Environment;

/// Handoff MCP Server
#[derive(Clone)]
pub struct HandoffMcpServer {
    env: Arc<Environment>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl HandoffMcpServer {
    pub fn new(env: Environment) -> Self {
        Self {
            env: Arc::new(env),
            tool_router: Self::tool_router(),
        }
    }

    #[cfg(test)]
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    #[tool(
        name = "prepare_handoff",
        description = "Prepare a handoff prompt for the Jules remote coding agent.\n\nChecks the working tree (uncommitted changes are committed and pushed to a WIP branch only when sync=true or autoSync is enabled), then gathers the full text of changed files, the symbol under the cursor, current error diagnostics and planning artifacts from the most recent agent session, and assembles them into a prompt within the configured length budget.\n\nPass the editor state (activeEditor, documents, symbols, diagnostics) so the prompt reflects what the user is looking at. The prompt is saved as a draft; edit its mission brief and pass it to submit_handoff."
    )]
    async fn prepare_handoff(
        &self,
        Parameters(args): Parameters<PrepareHandoffArgs>,
    ) -> Result<CallToolResult, McpError> {
        debug!("prepare_handoff called");
        tools::prepare_handoff(&self.env, args).await
    }

    #[tool(
        name = "submit_handoff",
        description = "Create a Jules session from a reviewed handoff prompt. Pass the edited prompt text or the draft_path returned by prepare_handoff. The mission brief must be filled in. Returns the session dashboard URL."
    )]
    async fn submit_handoff(
        &self,
        Parameters(args): Parameters<SubmitHandoffArgs>,
    ) -> Result<CallToolResult, McpError> {
        debug!("submit_handoff called");
        tools::submit_handoff(&self.env, args).await
    }

    #[tool(
        name = "list_contexts",
        description = "List prior agent sessions with saved task and plan artifacts, newest first. Use an id with prepare_handoff's context_id to pick which session's artifacts are included."
    )]
    async fn list_contexts(
        &self,
        Parameters(args): Parameters<ListContextsArgs>,
    ) -> Result<CallToolResult, McpError> {
        tools::list_contexts(&self.env, args).await
    }

    #[tool(
        name = "handoff_status",
        description = "Report whether a handoff can be sent: API key, GitHub repository and branch, uncommitted changes and recent artifact contexts."
    )]
    async fn handoff_status(
        &self,
        Parameters(args): Parameters<HandoffStatusArgs>,
    ) -> Result<CallToolResult, McpError> {
        tools::handoff_status(&self.env, args).await
    }
}

#[tool_handler]
impl ServerHandler for HandoffMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "jules-handoff".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Hands in-progress editor work off to the Jules remote coding agent: prepare_handoff, review the draft, then submit_handoff."
                    .to_string(),
            ),
        }
    }
}
