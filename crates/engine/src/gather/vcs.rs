//! Version-control gatherer: branch position and working-tree changes as a
//! single item.

use super::{GatherContext, SourceOutput, guarded};
use ctxpack_core::collaborator::GitStatus;
use ctxpack_core::item::{ContextItem, ItemKind, ItemMetadata};
use ctxpack_core::window::SourceKind;

pub const GIT_SCORE: f64 = 0.6;

pub async fn gather(ctx: &GatherContext<'_>) -> SourceOutput {
    let mut out = SourceOutput::empty(SourceKind::VersionControl);
    if !ctx.request.include_git {
        return out;
    }

    let status = ctx.collaborators.git.status(&ctx.request.project_root);
    match guarded(ctx.timeout(), SourceKind::VersionControl, "status", status).await {
        Ok(status) => out.items.push(ContextItem::new(
            ItemKind::Git,
            None,
            render_status(&status),
            GIT_SCORE,
            ItemMetadata::Git {
                branch: status.branch.clone(),
                changed_files: status.changed_files(),
                has_conflicts: status.has_conflicts,
            },
        )),
        Err(failure) => out.failures.push(failure),
    }
    out
}

pub(crate) fn render_status(status: &GitStatus) -> String {
    let mut out = format!(
        "Git status:\nBranch: {} (ahead {}, behind {})",
        status.branch, status.ahead, status.behind
    );
    if status.has_conflicts {
        out.push_str("\nMerge conflicts present");
    }
    if status.is_clean() {
        out.push_str("\nWorking tree clean");
        return out;
    }
    for (label, files) in [
        ("Staged", &status.staged),
        ("Unstaged", &status.unstaged),
        ("Untracked", &status.untracked),
    ] {
        if files.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{label} ({}):", files.len()));
        for file in files {
            out.push_str(&format!("\n  {file}"));
        }
    }
    out
}
