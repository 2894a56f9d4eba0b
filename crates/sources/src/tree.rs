//! ASCII project tree.
//!
//! ```text
//! repo/
//! ├── src/
//! │   ├── app.ts
//! │   └── util.ts
//! └── README.md
//! ```

use crate::sandbox::relative_display;
use crate::walk::WalkOptions;
use async_trait::async_trait;
use ctxpack_core::collaborator::{ProjectTree, TreeBuilder};
use ctxpack_core::error::CollaboratorError;
use std::path::Path;

/// Entries beyond this are summarized in a single trailing line.
pub const DEFAULT_MAX_ENTRIES: usize = 400;

#[derive(Debug, Clone)]
pub struct WalkTreeBuilder {
    skip_dirs: Vec<String>,
    max_entries: usize,
}

impl Default for WalkTreeBuilder {
    fn default() -> Self {
        Self {
            skip_dirs: WalkOptions::default().skip_dirs,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl WalkTreeBuilder {
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

struct Node {
    depth: usize,
    name: String,
    is_dir: bool,
    is_last: bool,
}

#[async_trait]
impl TreeBuilder for WalkTreeBuilder {
    async fn build(
        &self,
        root: &Path,
        depth: usize,
        include_hidden: bool,
    ) -> Result<ProjectTree, CollaboratorError> {
        if !tokio::fs::metadata(root).await.is_ok_and(|m| m.is_dir()) {
            return Err(CollaboratorError::NotFound(root.display().to_string()));
        }
        let walk = WalkOptions {
            include_hidden,
            skip_dirs: self.skip_dirs.clone(),
            max_depth: Some(depth),
        };
        let max_entries = self.max_entries;
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || build_tree(&root, &walk, max_entries))
            .await
            .map_err(|e| CollaboratorError::Backend(format!("tree task failed: {e}")))
    }
}

fn build_tree(root: &Path, walk: &WalkOptions, max_entries: usize) -> ProjectTree {
    let mut nodes = Vec::new();
    let mut files = Vec::new();
    let mut omitted = 0usize;

    for entry in walk.walk(root) {
        if nodes.len() >= max_entries {
            omitted += 1;
            continue;
        }
        let is_dir = entry.file_type().is_dir();
        if !is_dir {
            files.push(relative_display(root, entry.path()));
        }
        nodes.push(Node {
            depth: entry.depth(),
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_last: false,
        });
    }
    mark_last_siblings(&mut nodes);

    let root_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| ".".into());
    let mut ascii = format!("{root_name}/\n");

    // ancestors[d] is true when the ancestor at depth d+1 was a last child.
    let mut ancestors: Vec<bool> = Vec::new();
    for node in &nodes {
        ancestors.truncate(node.depth - 1);
        for &last in &ancestors {
            ascii.push_str(if last { "    " } else { "│   " });
        }
        ascii.push_str(if node.is_last { "└── " } else { "├── " });
        ascii.push_str(&node.name);
        if node.is_dir {
            ascii.push('/');
        }
        ascii.push('\n');
        ancestors.push(node.is_last);
    }
    if omitted > 0 {
        ascii.push_str(&format!("... ({omitted} more entries)\n"));
    }

    ProjectTree {
        ascii_tree: ascii,
        files,
    }
}

/// Walk backwards: a node is last when no later sibling follows before the
/// parent's subtree ends.
fn mark_last_siblings(nodes: &mut [Node]) {
    let mut sibling_after: Vec<bool> = Vec::new();
    for node in nodes.iter_mut().rev() {
        if sibling_after.len() <= node.depth {
            sibling_after.resize(node.depth + 1, false);
        }
        node.is_last = !sibling_after[node.depth];
        sibling_after[node.depth] = true;
        sibling_after.truncate(node.depth + 1);
    }
}
