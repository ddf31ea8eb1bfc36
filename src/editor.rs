//! Editor collaborator.
//!
//! The handoff pipeline never talks to an editor directly. An editor plugin
//! exports its state (active cursor, open documents, symbol trees and
//! diagnostics) as a JSON snapshot, either as a file passed with
//! `--editor-state` or inline through the MCP `prepare_handoff` tool.
//! Documents that are not part of the snapshot are read from disk.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::domain::{DocumentSymbol, FileDiagnostics, Position};
use crate::error::{HandoffError, HandoffResult};

/// Cursor location in the focused document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEditor {
    pub path: String,
    pub cursor: Position,
}

/// What the pipeline needs from an editor.
pub trait EditorSurface: Send + Sync {
    fn active_editor(&self) -> Option<ActiveEditor>;

    /// Symbol tree of a document, `None` when no provider answered.
    fn document_symbols(&self, path: &str) -> Option<Vec<DocumentSymbol>>;

    /// Diagnostics per file in enumeration order.
    fn diagnostics(&self) -> Vec<FileDiagnostics>;

    fn read_document(&self, path: &str) -> impl Future<Output = std::io::Result<String>> + Send;
}

/// Open document carried in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub path: String,
    pub content: String,
}

/// Raw symbol tree of one document. Parsed lazily so that a malformed tree
/// only costs the breadcrumb, not the whole snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSymbols {
    pub path: String,
    pub symbols: serde_json::Value,
}

/// JSON document exported by editor plugins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    #[serde(default)]
    pub active_editor: Option<ActiveEditor>,
    #[serde(default)]
    pub documents: Vec<SnapshotDocument>,
    #[serde(default)]
    pub symbols: Vec<SnapshotSymbols>,
    #[serde(default)]
    pub diagnostics: Vec<FileDiagnostics>,
}

/// `EditorSurface` backed by an exported snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotEditor {
    snapshot: EditorSnapshot,
    workspace_root: PathBuf,
}

impl SnapshotEditor {
    pub fn new(snapshot: EditorSnapshot, workspace_root: PathBuf) -> Self {
        Self {
            snapshot,
            workspace_root,
        }
    }

    /// Editor with no active document; documents are read from disk.
    pub fn empty(workspace_root: PathBuf) -> Self {
        Self::new(EditorSnapshot::default(), workspace_root)
    }

    pub async fn load(path: &Path, workspace_root: PathBuf) -> HandoffResult<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let snapshot = serde_json::from_str::<EditorSnapshot>(&raw).map_err(|e| {
            HandoffError::validation("editor state", format!("{}: {}", path.display(), e))
        })?;
        debug!(
            "Loaded editor snapshot with {} document(s) from {}",
            snapshot.documents.len(),
            path.display()
        );
        Ok(Self::new(snapshot, workspace_root))
    }

    /// Snapshot passed inline, as MCP clients do.
    pub fn from_value(value: serde_json::Value, workspace_root: PathBuf) -> HandoffResult<Self> {
        let snapshot = serde_json::from_value::<EditorSnapshot>(value)
            .map_err(|e| HandoffError::validation("editor state", e.to_string()))?;
        Ok(Self::new(snapshot, workspace_root))
    }

    #[cfg(test)]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.workspace_root.join(candidate)
        }
    }

    fn same_document(&self, a: &str, b: &str) -> bool {
        a == b || self.resolve(a) == self.resolve(b)
    }
}

impl EditorSurface for SnapshotEditor {
    fn active_editor(&self) -> Option<ActiveEditor> {
        self.snapshot.active_editor.clone()
    }

    fn document_symbols(&self, path: &str) -> Option<Vec<DocumentSymbol>> {
        let entry = self
            .snapshot
            .symbols
            .iter()
            .find(|s| self.same_document(&s.path, path))?;

        match serde_json::from_value::<Vec<DocumentSymbol>>(entry.symbols.clone()) {
            Ok(symbols) => Some(symbols),
            Err(e) => {
                warn!("Ignoring malformed symbol tree for {}: {}", path, e);
                None
            }
        }
    }

    fn diagnostics(&self) -> Vec<FileDiagnostics> {
        self.snapshot.diagnostics.clone()
    }

    async fn read_document(&self, path: &str) -> std::io::Result<String> {
        if let Some(doc) = self
            .snapshot
            .documents
            .iter()
            .find(|d| self.same_document(&d.path, path))
        {
            return Ok(doc.content.clone());
        }
        tokio::fs::read_to_string(self.resolve(path)).await
    }
}

/// Shorten an editor path for display, relative to the workspace if inside it.
pub fn display_path(path: &str, workspace_root: &Path) -> String {
    Path::new(path)
        .strip_prefix(workspace_root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| path.to_string())
}
