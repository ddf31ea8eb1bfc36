//! MCP server handlers.
//!
//! This module contains only the MCP server startup logic. Settings and the
//! workspace root are resolved in main.rs.

use anyhow::Result;
use tracing::{error, info};

use super::server::HandoffMcpServer;
use crate::environment::Environment;

/// Run the MCP server over stdio.
pub async fn run_mcp_server(env: Environment) -> Result<()> {
    info!("Starting handoff MCP server (stdio)");
    info!("Workspace root: {}", env.workspace_root.display());

    let server = HandoffMcpServer::new(env);
    run_server(server).await
}

async fn run_server(server: HandoffMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    let service = server.serve(stdio()).await.map_err(|e| {
        error!("Failed to start MCP service: {:?}", e);
        anyhow::anyhow!("Failed to start MCP service: {:?}", e)
    })?;

    info!("MCP server ready");

    service.waiting().await.map_err(|e| {
        error!("MCP service error: {:?}", e);
        anyhow::anyhow!("MCP service error: {:?}", e)
    })?;

    info!("MCP server shutting down");
    Ok(())
}
