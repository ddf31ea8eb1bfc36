//! Domain types shared across modules.
//!
//! These structures are produced by the collaborators (source control,
//! editor, artifact store) and consumed by the context readers and the
//! prompt assembler. Keeping them here avoids circular dependencies between
//! the `vcs`, `editor`, `context` and `api` modules.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a file differs from HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Modified,
    Added,
    Deleted,
    TypeChanged,
}

/// One changed path as reported by source control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Path relative to the workspace, `/`-separated; absolute when the
    /// file lies outside it.
    pub path: String,
    pub kind: ChangeKind,
}

impl ChangeRecord {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Final path component, used as the de-duplication key for diff blocks.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str())
    }
}

/// Zero-based line/character position, ordered line first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    #[cfg(test)]
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Inclusive source range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[cfg(test)]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

/// Node of an editor-supplied symbol tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSymbol {
    /// Kind tag as the editor names it ("Class", "Method", "Function", ...).
    pub kind: String,
    pub name: String,
    pub range: Range,
    #[serde(default)]
    pub children: Vec<DocumentSymbol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

/// Diagnostic as reported by the editor for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub range: Range,
    pub message: String,
}

/// Diagnostics of one file, kept in editor enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiagnostics {
    pub path: String,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// The document under the user's cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFile {
    /// Display path, relative to the workspace root when possible.
    pub path: String,
    /// One-based cursor line.
    pub cursor_line: u32,
    pub content: String,
}

/// One prior agent session discovered under the artifact root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    /// Directory name.
    pub id: String,
    pub title: String,
    pub path: PathBuf,
    /// Milliseconds since the Unix epoch.
    pub last_modified: u64,
}

/// One artifact file with its section header applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub content: String,
}

/// GitHub coordinates of the repository being handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCoordinates {
    pub owner: String,
    pub repo_name: String,
    pub branch: String,
}

impl RepositoryCoordinates {
    /// Canonical source reference understood by the sessions API.
    pub fn source(&self) -> String {
        format!("sources/github/{}/{}", self.owner, self.repo_name)
    }
}

/// Session created by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSession {
    pub id: String,
    pub name: String,
    pub dashboard_url: String,
}
