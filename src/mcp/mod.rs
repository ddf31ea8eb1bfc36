//! MCP stdio server for editor integrations.
//!
//! Editors that cannot shell out to the CLI drive the handoff through four
//! tools: `prepare_handoff`, `submit_handoff`, `list_contexts` and
//! `handoff_status`. The editor passes its snapshot inline.

mod handlers;
mod server;
mod tools;
mod types;

pub use handlers::run_mcp_server;
