//! Diff blob construction from changed-file records.

use futures_util::future::join_all;
use std::collections::HashSet;
use tracing::debug;

use crate::domain::{ChangeKind, ChangeRecord};
use crate::editor::EditorSurface;

/// Emitted in place of content for files that no longer exist.
pub const DELETED_MARKER: &str = "[DELETED]";

/// Concatenate the current text of every changed file.
///
/// Records are de-duplicated by file name, first occurrence wins. A file
/// that cannot be read is skipped unless it was deleted, in which case the
/// deletion marker is emitted.
pub async fn build_diff_blob<E: EditorSurface>(changes: &[ChangeRecord], editor: &E) -> String {
    let mut seen = HashSet::new();
    let unique: Vec<&ChangeRecord> = changes
        .iter()
        .filter(|change| seen.insert(change.file_name().to_string()))
        .collect();

    let reads = join_all(unique.iter().map(|change| editor.read_document(&change.path))).await;

    let blocks: Vec<String> = unique
        .into_iter()
        .zip(reads)
        .filter_map(|(change, read)| match read {
            Ok(content) => Some(format!("--- {} ---\n{}", change.file_name(), content)),
            Err(_) if change.kind == ChangeKind::Deleted => Some(format!(
                "--- {} ---\n{}",
                change.file_name(),
                DELETED_MARKER
            )),
            Err(e) => {
                debug!("Skipping unreadable file {}: {}", change.path, e);
                None
            }
        })
        .collect();

    blocks.join("\n\n")
}
