//! Project-structure gatherer: one low-priority directory tree item.

use super::{GatherContext, SourceOutput, guarded};
use ctxpack_core::item::{ContextItem, ItemKind, ItemMetadata};
use ctxpack_core::window::SourceKind;

pub const TREE_SCORE: f64 = 0.5;

pub async fn gather(ctx: &GatherContext<'_>) -> SourceOutput {
    let mut out = SourceOutput::empty(SourceKind::Structure);
    if !ctx.request.include_tree {
        return out;
    }

    let depth = ctx.config.gather.tree_depth;
    let build = ctx.collaborators.tree.build(
        &ctx.request.project_root,
        depth,
        ctx.config.gather.include_hidden,
    );

    match guarded(ctx.timeout(), SourceKind::Structure, "build_tree", build).await {
        Ok(tree) if !tree.ascii_tree.trim().is_empty() => {
            out.items.push(ContextItem::new(
                ItemKind::Tree,
                None,
                format!("Project structure (depth {depth}):\n{}", tree.ascii_tree.trim_end()),
                TREE_SCORE,
                ItemMetadata::Tree {
                    file_count: tree.files.len(),
                    depth,
                },
            ));
        }
        Ok(_) => {}
        Err(failure) => out.failures.push(failure),
    }
    out
}
