//! Project traversal shared by search and tree building.

use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Directories that never hold useful context.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "dist",
    "build",
    "coverage",
    "__pycache__",
];

/// Options for walking a project tree.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub include_hidden: bool,
    pub skip_dirs: Vec<String>,
    pub max_depth: Option<usize>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            include_hidden: false,
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|d| d.to_string()).collect(),
            max_depth: None,
        }
    }
}

impl WalkOptions {
    fn is_pruned(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if name == ".git" || (!self.include_hidden && name.starts_with('.')) {
            return true;
        }
        entry.file_type().is_dir() && self.skip_dirs.iter().any(|d| *d == name)
    }

    /// Entries under `root` (excluding `root` itself) in a stable order:
    /// directories before files, then by name.
    pub fn walk(&self, root: &Path) -> impl Iterator<Item = DirEntry> + '_ {
        let mut walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by(|a, b| {
                b.file_type()
                    .is_dir()
                    .cmp(&a.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            });
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }
        walker
            .into_iter()
            .filter_entry(move |e| !self.is_pruned(e))
            .filter_map(Result::ok)
            .filter(|e| e.depth() > 0)
    }

    /// Regular files only.
    pub fn files(&self, root: &Path) -> impl Iterator<Item = DirEntry> + '_ {
        self.walk(root).filter(|e| e.file_type().is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prunes_hidden_and_vendor_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for d in ["src", "node_modules/pkg", ".git", ".config"] {
            std::fs::create_dir_all(root.join(d)).unwrap();
        }
        for f in ["src/a.ts", "node_modules/pkg/index.js", ".git/HEAD", ".config/x", ".env", "b.md"] {
            std::fs::write(root.join(f), "x").unwrap();
        }

        let files: Vec<String> = WalkOptions::default()
            .files(root)
            .map(|e| crate::sandbox::relative_display(root, e.path()))
            .collect();
        assert_eq!(files, vec!["src/a.ts", "b.md"]);

        let hidden = WalkOptions {
            include_hidden: true,
            ..WalkOptions::default()
        };
        let files: Vec<String> = hidden
            .files(root)
            .map(|e| crate::sandbox::relative_display(root, e.path()))
            .collect();
        assert_eq!(files, vec![".config/x", "src/a.ts", ".env", "b.md"]);
    }
}
