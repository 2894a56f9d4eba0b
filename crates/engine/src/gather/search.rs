//! Free-text search and selection gatherers.
//!
//! Both run a content search and a symbol search concurrently and group the
//! hits per file: one `search` item per file for content hits (each hit
//! with a few lines of context), one `symbol` item per file for symbol
//! hits. The selection gatherer is the same search, driven by the selected
//! text at shallow depth.
//!
//! Import proximity is 1.0 for the current file itself and
//! [`DIRECT_IMPORT_PROXIMITY`] for the files it imports directly. Those are
//! found by reading the current file alongside the searches and resolving
//! its relative imports against the configured suffixes; no extra reads are
//! spent probing.

use super::current_file::{extract_imports, resolve_relative};
use super::{GatherContext, SourceOutput, fenced, guarded, is_export_line};
use crate::scorer::ScoreFactors;
use ctxpack_core::collaborator::{SearchMatch, SearchMode};
use ctxpack_core::item::{ContextItem, ItemKind, ItemMetadata, SearchOrigin};
use ctxpack_core::language::Language;
use ctxpack_core::query::query_terms;
use ctxpack_core::request::Depth;
use ctxpack_core::window::SourceKind;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// `import_distance` for a file the current file imports directly.
pub const DIRECT_IMPORT_PROXIMITY: f64 = 0.5;

/// `symbol_importance` for symbol hits that are not exported.
const LOCAL_SYMBOL_IMPORTANCE: f64 = 0.3;

/// Longest query echoed into an item header.
const HEADER_QUERY_CHARS: usize = 60;

pub async fn gather(ctx: &GatherContext<'_>) -> SourceOutput {
    let query = ctx.request.query.trim();
    if query.is_empty() {
        return SourceOutput::empty(SourceKind::Search);
    }
    run(ctx, SourceKind::Search, query, ctx.request.depth, SearchOrigin::Query).await
}

pub async fn gather_selection(ctx: &GatherContext<'_>) -> SourceOutput {
    match ctx.request.active_selection() {
        Some(selection) => {
            run(ctx, SourceKind::Selection, selection, Depth::Shallow, SearchOrigin::Selection).await
        }
        None => SourceOutput::empty(SourceKind::Selection),
    }
}

async fn run(
    ctx: &GatherContext<'_>,
    source: SourceKind,
    query: &str,
    depth: Depth,
    origin: SearchOrigin,
) -> SourceOutput {
    let mut out = SourceOutput::empty(source);
    let cap = ctx.config.gather.results_for(depth);
    let root = ctx.request.project_root.as_path();
    let search = &ctx.collaborators.search;
    let timeout = ctx.timeout();

    let (content_hits, symbol_hits, imported) = tokio::join!(
        guarded(timeout, source, "search:content", search.search(query, root, SearchMode::Content, cap)),
        guarded(timeout, source, "search:symbol", search.search(query, root, SearchMode::Symbol, cap)),
        direct_imports(ctx),
    );

    let scoring = Scoring::new(ctx, query, imported);

    match content_hits {
        Ok(hits) => {
            for (file, hits) in group_by_file(hits) {
                out.items.push(content_item(ctx, &scoring, query, &file, &hits, origin));
            }
        }
        Err(failure) => out.failures.push(failure),
    }

    match symbol_hits {
        Ok(hits) => {
            for (file, hits) in group_by_file(hits) {
                out.items.push(symbol_item(ctx, &scoring, query, &file, &hits));
            }
        }
        Err(failure) => out.failures.push(failure),
    }

    debug!(source = %source, depth = ?depth, cap, items = out.items.len(), "Search complete");
    out
}

/// Every path the current file's relative imports may resolve to.
///
/// The current file is read once more here so this gatherer stays
/// independent of the current-file gatherer. A failed read only costs the
/// proximity signal; the current-file gatherer reports the failure.
async fn direct_imports(ctx: &GatherContext<'_>) -> HashSet<String> {
    let Some(current) = ctx.request.current_file.as_deref().map(str::trim) else {
        return HashSet::new();
    };
    if current.is_empty() {
        return HashSet::new();
    }

    let read = ctx.collaborators.files.read(current, None, None);
    let content = match tokio::time::timeout(ctx.timeout(), read).await {
        Ok(Ok(file)) => file.content,
        Ok(Err(e)) => {
            debug!(path = current, error = %e, "No import proximity: current file unreadable");
            return HashSet::new();
        }
        Err(_) => {
            debug!(path = current, "No import proximity: current file read timed out");
            return HashSet::new();
        }
    };

    let suffixes = &ctx.config.gather.import_extensions;
    extract_imports(&content, ctx.config.gather.max_imports)
        .iter()
        .filter_map(|spec| resolve_relative(current, spec))
        .flat_map(|base| suffixes.iter().map(move |suffix| format!("{base}{suffix}")))
        .filter(|candidate| candidate != current)
        .collect()
}

/// Per-path scoring signals that do not depend on the hits.
struct Scoring<'a> {
    terms: Vec<String>,
    current_file: Option<&'a str>,
    imported: HashSet<String>,
    recent_files: &'a [String],
}

impl<'a> Scoring<'a> {
    fn new(ctx: &'a GatherContext<'_>, query: &str, imported: HashSet<String>) -> Self {
        Self {
            terms: query_terms(query),
            current_file: ctx.request.current_file.as_deref().map(str::trim),
            imported,
            recent_files: &ctx.request.recent_files,
        }
    }

    /// 1.0 for the current file, one hop away for its direct imports.
    fn import_proximity(&self, file: &str) -> f64 {
        if self.current_file == Some(file) {
            1.0
        } else if self.imported.contains(file) {
            DIRECT_IMPORT_PROXIMITY
        } else {
            0.0
        }
    }

    fn factors(&self, file: &str) -> ScoreFactors {
        let lower = file.to_lowercase();
        let path_match = self.terms.iter().any(|t| lower.contains(t.as_str()));
        ScoreFactors {
            path_match: Some(if path_match { 1.0 } else { 0.0 }),
            import_distance: Some(self.import_proximity(file)),
            recency: Some(if self.recent_files.iter().any(|r| r.trim() == file) {
                1.0
            } else {
                0.0
            }),
            ..ScoreFactors::default()
        }
    }
}

fn group_by_file(hits: Vec<SearchMatch>) -> BTreeMap<String, Vec<SearchMatch>> {
    let mut grouped: BTreeMap<String, Vec<SearchMatch>> = BTreeMap::new();
    for hit in hits {
        grouped.entry(hit.file.clone()).or_default().push(hit);
    }
    for hits in grouped.values_mut() {
        hits.sort_by_key(|h| h.line);
        hits.dedup_by_key(|h| h.line);
    }
    grouped
}

fn content_item(
    ctx: &GatherContext<'_>,
    scoring: &Scoring<'_>,
    query: &str,
    file: &str,
    hits: &[SearchMatch],
    origin: SearchOrigin,
) -> ContextItem {
    let header = format!("Matches for \"{}\" in {file}:", header_query(query));
    let body = render_hits(hits, ctx.config.gather.context_lines);
    let factors = ScoreFactors {
        query_match: Some(query_match_strength(hits.len())),
        ..scoring.factors(file)
    };
    ContextItem::new(
        ItemKind::Search,
        Some(file.to_string()),
        fenced(&header, Language::from_path(file).name(), &body),
        ctx.scorer.score(&factors),
        ItemMetadata::Search {
            match_count: hits.len(),
            origin,
        },
    )
}

fn symbol_item(
    ctx: &GatherContext<'_>,
    scoring: &Scoring<'_>,
    query: &str,
    file: &str,
    hits: &[SearchMatch],
) -> ContextItem {
    let exported = hits.iter().filter(|h| is_export_line(&h.matched_text)).count();
    let mut content = format!("Symbols matching \"{}\" in {file}:", header_query(query));
    for hit in hits {
        content.push_str(&format!("\n- line {}: {}", hit.line, hit.matched_text.trim()));
    }
    let factors = ScoreFactors {
        query_match: Some(1.0),
        symbol_importance: Some(if exported > 0 { 1.0 } else { LOCAL_SYMBOL_IMPORTANCE }),
        ..scoring.factors(file)
    };
    ContextItem::new(
        ItemKind::Symbol,
        Some(file.to_string()),
        content,
        ctx.scorer.score(&factors),
        ItemMetadata::Symbol {
            symbol_count: hits.len(),
            exported_count: exported,
        },
    )
}

/// One hit is a solid match; more hits in the same file push towards 1.0.
fn query_match_strength(hits: usize) -> f64 {
    (0.6 + 0.1 * hits.saturating_sub(1) as f64).min(1.0)
}

fn header_query(query: &str) -> String {
    let single_line = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= HEADER_QUERY_CHARS {
        single_line
    } else {
        let cut: String = single_line.chars().take(HEADER_QUERY_CHARS).collect();
        format!("{cut}…")
    }
}

/// Render hits as numbered lines, `>` marking matches and `:` context.
/// Overlapping context is merged; gaps are shown as `...`.
pub(crate) fn render_hits(hits: &[SearchMatch], context_lines: usize) -> String {
    let mut lines: BTreeMap<usize, (&str, bool)> = BTreeMap::new();

    for hit in hits {
        let line = hit.line.max(1);
        let before = context_lines.min(hit.context_before.len()).min(line - 1);
        let skip = hit.context_before.len() - before;
        for (i, text) in hit.context_before.iter().skip(skip).enumerate() {
            lines.entry(line - before + i).or_insert((text.as_str(), false));
        }
        lines.insert(line, (hit.matched_text.as_str(), true));
        for (i, text) in hit.context_after.iter().take(context_lines).enumerate() {
            lines.entry(line + 1 + i).or_insert((text.as_str(), false));
        }
    }

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut previous: Option<usize> = None;
    for (number, (text, is_match)) in lines {
        if previous.is_some_and(|p| number > p + 1) {
            out.push("...".into());
        }
        let mark = if is_match { '>' } else { ':' };
        out.push(format!("{number}{mark} {text}"));
        previous = Some(number);
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(line: usize, text: &str, before: &[&str], after: &[&str]) -> SearchMatch {
        SearchMatch {
            file: "src/a.ts".into(),
            line,
            column: 1,
            matched_text: text.into(),
            context_before: before.iter().map(|s| s.to_string()).collect(),
            context_after: after.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn renders_context_around_a_hit() {
        let text = render_hits(&[hit(10, "match()", &["b7", "b8", "b9"], &["a11", "a12", "a13"])], 2);
        assert_eq!(text, "8: b8\n9: b9\n10> match()\n11: a11\n12: a12");
    }

    #[test]
    fn overlapping_hits_merge_and_keep_match_markers() {
        let text = render_hits(
            &[
                hit(3, "first", &["l1", "l2"], &["second", "l5"]),
                hit(4, "second", &["l2", "first"], &["l5", "l6"]),
            ],
            2,
        );
        assert_eq!(text, "1: l1\n2: l2\n3> first\n4> second\n5: l5\n6: l6");
    }

    #[test]
    fn distant_hits_are_separated() {
        let text = render_hits(&[hit(2, "x", &["l1"], &[]), hit(20, "y", &[], &[])], 2);
        assert_eq!(text, "1: l1\n2> x\n...\n20> y");
    }

    #[test]
    fn context_never_numbers_below_line_one() {
        let text = render_hits(&[hit(1, "top", &["phantom"], &[])], 2);
        assert_eq!(text, "1> top");
    }

    #[test]
    fn grouping_sorts_and_dedupes_lines() {
        let mut other = hit(5, "b", &[], &[]);
        other.file = "src/b.ts".into();
        let grouped = group_by_file(vec![hit(9, "x", &[], &[]), other, hit(3, "y", &[], &[]), hit(9, "x", &[], &[])]);
        assert_eq!(grouped.len(), 2);
        let lines: Vec<usize> = grouped["src/a.ts"].iter().map(|h| h.line).collect();
        assert_eq!(lines, vec![3, 9]);
    }

    #[test]
    fn match_strength_saturates() {
        assert!((query_match_strength(1) - 0.6).abs() < 1e-9);
        assert!((query_match_strength(3) - 0.8).abs() < 1e-9);
        assert_eq!(query_match_strength(50), 1.0);
    }

    #[test]
    fn long_queries_are_shortened_in_headers() {
        let long = "word ".repeat(40);
        let header = header_query(&long);
        assert_eq!(header.chars().count(), HEADER_QUERY_CHARS + 1);
        assert!(header.ends_with('…'));
        assert_eq!(header_query("multi\nline   query"), "multi line query");
    }
}
