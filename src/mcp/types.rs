//! MCP tool parameter types.
//!
//! These types are used with rmcp's `Parameters<T>` wrapper for automatic
//! deserialization and JSON schema generation.

use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters for the prepare_handoff tool
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct PrepareHandoffArgs {
    /// Editor snapshot: activeEditor, documents, symbols and diagnostics
    #[serde(default)]
    pub editor_state: Option<serde_json::Value>,
    /// Artifact context id to include instead of the most recent one
    #[serde(default)]
    pub context_id: Option<String>,
    /// Leave prior-session artifacts out of the prompt
    #[serde(default)]
    pub skip_artifacts: bool,
    /// Allow committing and pushing uncommitted changes to a WIP branch
    #[serde(default)]
    pub sync: bool,
}

/// Parameters for the submit_handoff tool
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SubmitHandoffArgs {
    /// Final prompt text; takes precedence over draft_path
    #[serde(default)]
    pub prompt: Option<String>,
    /// Draft file returned by prepare_handoff
    #[serde(default)]
    pub draft_path: Option<String>,
    /// Session title; derived from the mission brief when absent
    #[serde(default)]
    pub title: Option<String>,
}

/// Parameters for the list_contexts tool
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListContextsArgs {
    /// Maximum number of contexts to return (default 10)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parameters for the handoff_status tool (no arguments needed)
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct HandoffStatusArgs {}
