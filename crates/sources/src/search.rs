//! Project search over a `walkdir` traversal.
//!
//! | Mode | Matches |
//! |------|---------|
//! | `file` | relative paths containing the query |
//! | `content` | lines containing enough of the query's terms |
//! | `symbol` | extracted declarations whose name contains a query term |
//!
//! Content and symbol modes match on [`query_terms`], so a question such as
//! "how is the token budget applied?" searches for `applied`, `budget` and
//! `token`. A content line needs at least the configured fraction of those
//! terms (and always at least one). Matching is case-insensitive. Results come back in traversal order
//! (directories first, then by name), so the same tree always produces the
//! same matches.

use crate::sandbox::relative_display;
use crate::symbols::{extract_symbols, supports};
use crate::walk::WalkOptions;
use async_trait::async_trait;
use ctxpack_core::collaborator::{SearchMatch, SearchMode, SearchProvider};
use ctxpack_core::error::CollaboratorError;
use ctxpack_core::language::Language;
use ctxpack_core::query::query_terms;
use std::path::Path;
use tracing::debug;

/// Files above this size are not searched.
const MAX_SEARCH_FILE_BYTES: u64 = 512 * 1024;

/// Share of the query terms a content line must hold by default.
pub const DEFAULT_MIN_TERM_FRACTION: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct WalkSearchProvider {
    walk: WalkOptions,
    context_lines: usize,
    min_term_fraction: f64,
}

impl Default for WalkSearchProvider {
    fn default() -> Self {
        Self::new(2)
    }
}

impl WalkSearchProvider {
    pub fn new(context_lines: usize) -> Self {
        Self {
            walk: WalkOptions::default(),
            context_lines,
            min_term_fraction: DEFAULT_MIN_TERM_FRACTION,
        }
    }

    /// Require this share of the query terms on a content line, clamped to
    /// [0, 1]. `1.0` demands every term.
    pub fn with_min_term_fraction(mut self, fraction: f64) -> Self {
        self.min_term_fraction = if fraction.is_nan() {
            DEFAULT_MIN_TERM_FRACTION
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self
    }

    fn search_blocking(
        &self,
        root: &Path,
        query: &Query,
        mode: SearchMode,
        max_results: usize,
    ) -> Vec<SearchMatch> {
        let mut hits = Vec::new();

        for entry in self.walk.files(root) {
            if hits.len() >= max_results {
                break;
            }
            let file = relative_display(root, entry.path());

            if mode == SearchMode::File {
                if file.to_lowercase().contains(&query.phrase) {
                    hits.push(SearchMatch {
                        file: file.clone(),
                        line: 1,
                        column: 1,
                        matched_text: file,
                        context_before: Vec::new(),
                        context_after: Vec::new(),
                    });
                }
                continue;
            }

            let language = Language::from_path(entry.path());
            if mode == SearchMode::Symbol && !supports(language) {
                continue;
            }
            let Some(content) = read_searchable(entry.path()) else {
                continue;
            };
            let lines: Vec<&str> = content.lines().collect();

            let remaining = max_results - hits.len();
            let found: Vec<(usize, usize)> = match mode {
                SearchMode::Content => lines
                    .iter()
                    .enumerate()
                    .filter_map(|(i, line)| query.match_column(line).map(|col| (i, col)))
                    .take(remaining)
                    .collect(),
                SearchMode::Symbol => extract_symbols(&file, language, &content)
                    .into_iter()
                    .filter(|s| query.matches_name(&s.name))
                    .map(|s| (s.line - 1, s.column))
                    .take(remaining)
                    .collect(),
                SearchMode::File => Vec::new(),
            };

            for (index, column) in found {
                hits.push(self.hit(&file, &lines, index, column));
            }
        }
        hits
    }

    fn hit(&self, file: &str, lines: &[&str], index: usize, column: usize) -> SearchMatch {
        let before_start = index.saturating_sub(self.context_lines);
        let after_end = (index + 1 + self.context_lines).min(lines.len());
        SearchMatch {
            file: file.to_string(),
            line: index + 1,
            column,
            matched_text: lines[index].to_string(),
            context_before: lines[before_start..index].iter().map(|l| l.to_string()).collect(),
            context_after: lines[index + 1..after_end].iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[async_trait]
impl SearchProvider for WalkSearchProvider {
    async fn search(
        &self,
        query: &str,
        root: &Path,
        mode: SearchMode,
        max_results: usize,
    ) -> Result<Vec<SearchMatch>, CollaboratorError> {
        let Some(query) = Query::parse(query, self.min_term_fraction) else {
            return Ok(Vec::new());
        };
        if max_results == 0 {
            return Ok(Vec::new());
        }
        if !tokio::fs::metadata(root).await.is_ok_and(|m| m.is_dir()) {
            return Err(CollaboratorError::NotFound(root.display().to_string()));
        }

        let this = self.clone();
        let root = root.to_path_buf();
        let hits = tokio::task::spawn_blocking(move || {
            this.search_blocking(&root, &query, mode, max_results)
        })
        .await
        .map_err(|e| CollaboratorError::Backend(format!("search task failed: {e}")))?;

        debug!(mode = mode.as_str(), hits = hits.len(), "Search finished");
        Ok(hits)
    }
}

/// A normalized query: the whole phrase for path matching plus the content
/// terms for line and name matching.
#[derive(Debug, Clone)]
struct Query {
    phrase: String,
    terms: Vec<String>,
    required: usize,
}

impl Query {
    fn parse(raw: &str, min_term_fraction: f64) -> Option<Self> {
        let words: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return None;
        }
        let terms = query_terms(raw);
        let required = ((terms.len() as f64 * min_term_fraction).ceil() as usize).max(1);
        Some(Self {
            phrase: words.join(" "),
            terms,
            required,
        })
    }

    /// 1-based column of the earliest term when the line holds enough terms.
    fn match_column(&self, line: &str) -> Option<usize> {
        let lower = line.to_lowercase();
        let offsets: Vec<usize> = self
            .terms
            .iter()
            .filter_map(|t| lower.find(t.as_str()))
            .collect();
        if offsets.len() < self.required {
            return None;
        }
        let offset = offsets.into_iter().min()?;
        Some(lower[..offset].chars().count() + 1)
    }

    fn matches_name(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.terms.iter().any(|t| lower.contains(t.as_str()))
    }
}

/// File content if it is small enough and valid UTF-8.
fn read_searchable(path: &Path) -> Option<String> {
    let meta = std::fs::metadata(path).ok()?;
    if meta.len() > MAX_SEARCH_FILE_BYTES {
        return None;
    }
    std::fs::read_to_string(path).ok()
}
