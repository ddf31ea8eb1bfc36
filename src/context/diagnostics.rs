//! Error diagnostics reported by the editor, flattened for the prompt.

use std::path::Path;

use crate::domain::{FileDiagnostics, Severity};
use crate::editor::display_path;

/// Flatten error-severity diagnostics into `File: .. Line ..: ..` lines.
///
/// Order follows the editor's enumeration order; nothing is sorted or
/// de-duplicated. Returns `None` when there are no errors at all.
pub fn collect_errors(diagnostics: &[FileDiagnostics], workspace_root: &Path) -> Option<String> {
    let lines: Vec<String> = diagnostics
        .iter()
        .flat_map(|file| {
            let name = display_path(&file.path, workspace_root);
            file.diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .map(move |d| {
                    format!(
                        "File: {} Line {}: {}",
                        name,
                        d.range.start.line + 1,
                        d.message
                    )
                })
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
