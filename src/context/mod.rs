//! Context extraction for the handoff prompt.
//!
//! Four independent readers feed the prompt assembler: the diff blob of
//! changed files, the symbol breadcrumb at the cursor, error diagnostics and
//! prior-session artifacts. None of them mutates local state and none of
//! them fails the handoff; a reader that cannot produce anything yields an
//! absent section.

mod artifacts;
mod diagnostics;
mod diff;
mod symbols;

pub use artifacts::{validate_context_id, ArtifactStore};

use std::path::Path;
use tracing::debug;

use artifacts::join_artifacts;
use diagnostics::collect_errors;
use diff::build_diff_blob;
use symbols::locate_symbol;

use crate::domain::{ActiveFile, ChangeRecord, ConversationContext};
use crate::editor::{display_path, EditorSurface};

/// Which prior conversation to draw artifacts from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContextSelection {
    #[default]
    MostRecent,
    Id(String),
    Skip,
}

/// Output of the four readers, ready for assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatheredContext {
    pub diff: String,
    pub errors: Option<String>,
    pub symbol_context: Option<String>,
    pub active_file: Option<ActiveFile>,
    pub artifacts: Option<String>,
    /// Conversation the artifacts came from.
    pub conversation: Option<ConversationContext>,
}

/// Run all readers concurrently and collect their output.
pub async fn gather_context<E: EditorSurface>(
    editor: &E,
    changes: &[ChangeRecord],
    store: &ArtifactStore,
    selection: &ContextSelection,
    workspace_root: &Path,
) -> GatheredContext {
    let (diff, (active_file, symbol_context), errors, (conversation, artifacts)) = tokio::join!(
        build_diff_blob(changes, editor),
        active_file_context(editor, workspace_root),
        async { collect_errors(&editor.diagnostics(), workspace_root) },
        selected_artifacts(store, selection),
    );

    debug!(
        "Gathered context: diff={} chars, errors={}, symbol={}, active_file={}, artifacts={}",
        diff.len(),
        errors.is_some(),
        symbol_context.is_some(),
        active_file.is_some(),
        artifacts.is_some()
    );

    GatheredContext {
        diff,
        errors,
        symbol_context,
        active_file,
        artifacts,
        conversation,
    }
}

async fn active_file_context<E: EditorSurface>(
    editor: &E,
    workspace_root: &Path,
) -> (Option<ActiveFile>, Option<String>) {
    let Some(active) = editor.active_editor() else {
        return (None, None);
    };

    let content = match editor.read_document(&active.path).await {
        Ok(content) => content,
        Err(e) => {
            debug!("Active document {} unreadable: {}", active.path, e);
            return (None, None);
        }
    };

    let symbols = editor.document_symbols(&active.path);
    let symbol_context = locate_symbol(symbols.as_deref(), Some(&content), active.cursor);

    let file = ActiveFile {
        path: display_path(&active.path, workspace_root),
        cursor_line: active.cursor.line + 1,
        content,
    };
    (Some(file), symbol_context)
}

async fn selected_artifacts(
    store: &ArtifactStore,
    selection: &ContextSelection,
) -> (Option<ConversationContext>, Option<String>) {
    let conversation = match selection {
        ContextSelection::Skip => return (None, None),
        ContextSelection::MostRecent => store.list_contexts().await.into_iter().next(),
        ContextSelection::Id(id) => store
            .list_contexts()
            .await
            .into_iter()
            .find(|c| &c.id == id),
    };

    let Some(conversation) = conversation else {
        return (None, None);
    };
    let artifacts = store.read_artifacts(&conversation.path).await;
    (Some(conversation), join_artifacts(&artifacts))
}

#[cfg(test)]
mod tests {
    use super::artifacts::TASK_FILE;
    use super::*;
    use crate::domain::ChangeKind;
    use crate::editor::{EditorSnapshot, SnapshotEditor};
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, SnapshotEditor, ArtifactStore) {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        fs::create_dir_all(repo.join("src")).unwrap();
        fs::write(
            repo.join("src/user.ts"),
            "export class UserManager {\n  validateSession(t: string): boolean {\n    return !!t;\n  }\n}\n",
        )
        .unwrap();

        let brain = tmp.path().join("brain");
        fs::create_dir_all(brain.join("conv-1")).unwrap();
        fs::write(brain.join("conv-1").join(TASK_FILE), "# Session cleanup\n- [ ] a\n").unwrap();

        let snapshot: EditorSnapshot = serde_json::from_value(serde_json::json!({
            "activeEditor": {"path": "src/user.ts", "cursor": {"line": 2, "character": 4}},
            "diagnostics": [{"path": "src/user.ts", "diagnostics": [
                {"severity": "error", "message": "bad",
                 "range": {"start": {"line": 2, "character": 0}, "end": {"line": 2, "character": 1}}}
            ]}]
        }))
        .unwrap();

        let editor = SnapshotEditor::new(snapshot, repo);
        let store = ArtifactStore::new(brain);
        (tmp, editor, store)
    }

    #[tokio::test]
    async fn test_gather_all_sections() {
        let (_tmp, editor, store) = fixture();
        let root = editor.workspace_root().to_path_buf();
        let changes = vec![ChangeRecord::new("src/user.ts", ChangeKind::Modified)];

        let ctx = gather_context(&editor, &changes, &store, &ContextSelection::MostRecent, &root).await;

        assert!(ctx.diff.starts_with("--- user.ts ---\n"));
        assert_eq!(ctx.errors.as_deref(), Some("File: src/user.ts Line 3: bad"));
        assert_eq!(
            ctx.symbol_context.as_deref(),
            Some("Class: UserManager > Method: validateSession")
        );
        let active = ctx.active_file.unwrap();
        assert_eq!(active.path, "src/user.ts");
        assert_eq!(active.cursor_line, 3);
        assert!(ctx.artifacts.unwrap().contains("CURRENT TASK CHECKLIST"));
        assert_eq!(ctx.conversation.unwrap().title, "Session cleanup");
    }

    #[tokio::test]
    async fn test_gather_is_idempotent() {
        let (_tmp, editor, store) = fixture();
        let root = editor.workspace_root().to_path_buf();
        let changes = vec![ChangeRecord::new("src/user.ts", ChangeKind::Modified)];

        let first = gather_context(&editor, &changes, &store, &ContextSelection::MostRecent, &root).await;
        let second = gather_context(&editor, &changes, &store, &ContextSelection::MostRecent, &root).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_gather_with_nothing_available() {
        let tmp = TempDir::new().unwrap();
        let editor = SnapshotEditor::empty(tmp.path().to_path_buf());
        let store = ArtifactStore::new(tmp.path().join("missing"));

        let ctx = gather_context(&editor, &[], &store, &ContextSelection::MostRecent, tmp.path()).await;
        assert_eq!(ctx, GatheredContext::default());
    }

    #[tokio::test]
    async fn test_gather_selection() {
        let (_tmp, editor, store) = fixture();
        let root = editor.workspace_root().to_path_buf();

        let skipped = gather_context(&editor, &[], &store, &ContextSelection::Skip, &root).await;
        assert!(skipped.artifacts.is_none());

        let unknown = gather_context(
            &editor,
            &[],
            &store,
            &ContextSelection::Id("nope".into()),
            &root,
        )
        .await;
        assert!(unknown.artifacts.is_none());

        let chosen = gather_context(
            &editor,
            &[],
            &store,
            &ContextSelection::Id("conv-1".into()),
            &root,
        )
        .await;
        assert!(chosen.artifacts.is_some());
    }
}
