//! Recent-files gatherer.
//!
//! Runs the current-file pipeline for the most recently touched files
//! (excluding the current file) and discounts every score, since recency
//! is a weaker relevance signal than the file being edited.

use super::current_file::gather_file;
use super::{GatherContext, SourceOutput};
use ctxpack_core::item::FileRelationship;
use ctxpack_core::window::SourceKind;
use futures::future::join_all;
use std::collections::HashSet;

pub async fn gather(ctx: &GatherContext<'_>) -> SourceOutput {
    let paths = candidates(
        &ctx.request.recent_files,
        ctx.request.current_file.as_deref(),
        ctx.config.gather.max_recent_files,
    );
    if paths.is_empty() {
        return SourceOutput::empty(SourceKind::RecentFiles);
    }

    let penalty = ctx.config.gather.recent_penalty;
    let outputs = join_all(
        paths
            .iter()
            .map(|path| gather_file(ctx, SourceKind::RecentFiles, path, FileRelationship::Recent)),
    )
    .await;

    let mut out = SourceOutput::empty(SourceKind::RecentFiles);
    for output in outputs {
        out.items
            .extend(output.items.into_iter().map(|item| item.scale_score(penalty)));
        out.failures.extend(output.failures);
    }
    out
}

/// Distinct, non-blank recent files other than `current`, capped at `limit`.
fn candidates<'a>(recent: &'a [String], current: Option<&str>, limit: usize) -> Vec<&'a str> {
    let current = current.map(str::trim);
    let mut seen = HashSet::new();
    recent
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty() && Some(*p) != current && seen.insert(*p))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn excludes_current_file_and_duplicates() {
        let recent = owned(&["src/a.ts", "src/b.ts", "src/a.ts", " src/c.ts ", "", "src/d.ts"]);
        assert_eq!(
            candidates(&recent, Some("src/b.ts"), 3),
            vec!["src/a.ts", "src/c.ts", "src/d.ts"]
        );
    }

    #[test]
    fn respects_limit() {
        let recent = owned(&["a", "b", "c", "d", "e"]);
        assert_eq!(candidates(&recent, None, 3), vec!["a", "b", "c"]);
        assert!(candidates(&recent, None, 0).is_empty());
    }
}
