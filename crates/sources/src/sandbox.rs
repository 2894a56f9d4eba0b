//! Path sandboxing: collaborators only touch files under the project root.
//!
//! Checks, in order:
//! 1. No `..` segments in the requested path
//! 2. Both the root and the target canonicalize (resolving symlinks)
//! 3. The canonical target lies under the canonical root
//!
//! Relative paths are joined onto the root; absolute paths must already
//! point inside it.

use ctxpack_core::error::CollaboratorError;
use std::path::{Path, PathBuf};

/// Resolve `path` against `root`, refusing anything that escapes it.
pub async fn resolve_in_root(root: &Path, path: &str) -> Result<PathBuf, CollaboratorError> {
    let normalized = path.replace('\\', "/");
    if normalized.split('/').any(|segment| segment == "..") {
        return Err(CollaboratorError::PermissionDenied {
            path: path.into(),
            reason: "path traversal is not allowed".into(),
        });
    }

    let requested = Path::new(path);
    let candidate = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        root.join(requested)
    };

    let canonical_root = tokio::fs::canonicalize(root)
        .await
        .map_err(|e| CollaboratorError::from_io(&root.display().to_string(), &e))?;
    let canonical = tokio::fs::canonicalize(&candidate)
        .await
        .map_err(|e| CollaboratorError::from_io(path, &e))?;

    if !canonical.starts_with(&canonical_root) {
        return Err(CollaboratorError::PermissionDenied {
            path: path.into(),
            reason: "outside the project root".into(),
        });
    }
    Ok(canonical)
}

/// `path` relative to `root`, with forward slashes.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_relative_paths_under_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/app.ts"), "x").unwrap();

        let resolved = resolve_in_root(dir.path(), "src/app.ts").await.unwrap();
        assert!(resolved.ends_with("src/app.ts"));
    }

    #[tokio::test]
    async fn traversal_is_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_in_root(dir.path(), "../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::PermissionDenied { .. }));

        let err = resolve_in_root(dir.path(), "src\\..\\..\\secret").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn absolute_paths_outside_root_are_rejected() {
        let root = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let outside = other.path().join("secret.txt");
        std::fs::write(&outside, "s").unwrap();

        let err = resolve_in_root(root.path(), outside.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn missing_files_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_in_root(dir.path(), "nope.ts").await.unwrap_err();
        assert!(matches!(err, CollaboratorError::NotFound(p) if p == "nope.ts"));
    }

    #[test]
    fn relative_display_uses_forward_slashes() {
        let root = Path::new("/repo");
        assert_eq!(
            relative_display(root, Path::new("/repo/src/ui/button.tsx")),
            "src/ui/button.tsx"
        );
    }
}
