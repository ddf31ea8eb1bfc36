use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Find the git root by searching upward from `start`.
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut path = start;

    loop {
        if path.join(".git").exists() {
            return Some(path.to_path_buf());
        }
        path = path.parent()?;
    }
}

/// Resolve the workspace root: the given path, else the enclosing git root,
/// else the current directory.
pub fn resolve_workspace_root(workspace_root: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = workspace_root {
        return PathBuf::from(path)
            .canonicalize()
            .with_context(|| format!("Failed to canonicalize provided workspace root: {}", path));
    }

    let current = std::env::current_dir().context("Failed to get current directory")?;
    Ok(find_git_root(&current).unwrap_or(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_git_root_walks_upward() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        let nested = tmp.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_git_root(&nested), Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn test_resolve_explicit_root() {
        let tmp = TempDir::new().unwrap();
        let root = resolve_workspace_root(tmp.path().to_str()).unwrap();
        assert_eq!(root, tmp.path().canonicalize().unwrap());

        let missing = tmp.path().join("missing");
        assert!(resolve_workspace_root(missing.to_str()).is_err());
    }
}
