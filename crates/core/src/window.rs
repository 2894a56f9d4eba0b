//! The packed output of a gather cycle.

use crate::item::{ContextItem, ItemKind};
use serde::{Deserialize, Serialize};

/// Identifies which gatherer produced items or failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    CurrentFile,
    Selection,
    Search,
    RecentFiles,
    Structure,
    VersionControl,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentFile => "current_file",
            Self::Selection => "selection",
            Self::Search => "search",
            Self::RecentFiles => "recent_files",
            Self::Structure => "structure",
            Self::VersionControl => "version_control",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collaborator call that failed or timed out during gathering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: SourceKind,
    /// Collaborator operation, e.g. `read`, `search:content`, `status`.
    pub operation: String,
    pub reason: String,
}

/// How many items one gatherer contributed before deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    pub source: SourceKind,
    pub items: usize,
}

/// What happened while building a window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatherReport {
    /// Items produced by all gatherers.
    pub candidates: usize,
    /// Items left after deduplication.
    pub after_dedupe: usize,
    /// Items in the final window.
    pub included: usize,
    /// Items that did not make it into the window (including those never
    /// examined after the budget ran out).
    pub dropped: usize,
    /// Whether the boundary item was truncated to fit.
    pub truncated: bool,
    pub per_source: Vec<SourceStats>,
    pub failures: Vec<SourceFailure>,
}

/// Ordered, budget-bounded selection of items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextWindow {
    /// Items in packing order (score descending).
    pub items: Vec<ContextItem>,
    /// Sum of the included items' token estimates.
    pub total_tokens: usize,
    /// The request budget.
    pub max_tokens: usize,
    /// `total_tokens / max_tokens`, rounded to 4 decimal places.
    pub utilization: f64,
    #[serde(default)]
    pub report: GatherReport,
}

impl ContextWindow {
    /// Build a window from packed items. `total_tokens` is recomputed from
    /// the items so it can never disagree with them.
    pub fn new(items: Vec<ContextItem>, max_tokens: usize) -> Self {
        let total_tokens = items.iter().map(|i| i.token_estimate).sum();
        Self {
            utilization: utilization(total_tokens, max_tokens),
            items,
            total_tokens,
            max_tokens,
            report: GatherReport::default(),
        }
    }

    pub fn with_report(mut self, report: GatherReport) -> Self {
        self.report = report;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items of one kind, in packing order.
    pub fn items_of(&self, kind: ItemKind) -> impl Iterator<Item = &ContextItem> {
        self.items.iter().filter(move |i| i.kind == kind)
    }
}

/// `total / max` rounded to 4 decimal places; 0 when `max` is 0.
pub fn utilization(total_tokens: usize, max_tokens: usize) -> f64 {
    if max_tokens == 0 {
        return 0.0;
    }
    let raw = total_tokens as f64 / max_tokens as f64;
    (raw * 10_000.0).round() / 10_000.0
}
