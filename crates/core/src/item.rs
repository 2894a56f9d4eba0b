//! Context items: the unit of retrievable information.
//!
//! Every source gatherer produces [`ContextItem`]s. An item carries its own
//! rendered content, a relevance score and the token cost of that content.
//! Provenance lives in a typed [`ItemMetadata`] rather than an open map, so
//! a `git` item can never be asked for a match count.

use crate::token::estimate_tokens;
use serde::{Deserialize, Serialize};

/// The closed set of item kinds.
///
/// The declaration order is the presentation order used by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    File,
    Symbol,
    Search,
    Git,
    Tree,
    Diagnostic,
}

impl ItemKind {
    /// All kinds, in presentation order.
    pub const ALL: [ItemKind; 6] = [
        ItemKind::File,
        ItemKind::Symbol,
        ItemKind::Search,
        ItemKind::Git,
        ItemKind::Tree,
        ItemKind::Diagnostic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Symbol => "symbol",
            Self::Search => "search",
            Self::Git => "git",
            Self::Tree => "tree",
            Self::Diagnostic => "diagnostic",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a file item relates to what the user is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRelationship {
    /// The file currently open in the editor.
    Active,
    /// Reached through a static import of an active or recent file.
    Imported,
    /// Recently opened or edited.
    Recent,
}

/// Which query produced a search item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrigin {
    Query,
    Selection,
}

/// Provenance for an item, one variant per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemMetadata {
    File {
        relationship: FileRelationship,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        line_count: usize,
    },
    Symbol {
        symbol_count: usize,
        exported_count: usize,
    },
    Search {
        match_count: usize,
        origin: SearchOrigin,
    },
    Git {
        branch: String,
        changed_files: usize,
        has_conflicts: bool,
    },
    Tree {
        file_count: usize,
        depth: usize,
    },
    Diagnostic {
        count: usize,
    },
}

/// One retrievable unit of information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub kind: ItemKind,

    /// Logical location; `None` for whole-project items (tree, git).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Rendered payload, ready for the model to read.
    pub content: String,

    /// Relevance in `[0, 1]`.
    pub relevance_score: f64,

    /// Estimated token cost of `content`.
    pub token_estimate: usize,

    pub metadata: ItemMetadata,
}

impl ContextItem {
    /// Build an item. The score is clamped into `[0, 1]` (NaN becomes 0)
    /// and the token estimate is derived from `content`.
    pub fn new(
        kind: ItemKind,
        path: Option<String>,
        content: impl Into<String>,
        relevance_score: f64,
        metadata: ItemMetadata,
    ) -> Self {
        let content = content.into();
        let token_estimate = estimate_tokens(&content);
        Self {
            kind,
            path,
            content,
            relevance_score: clamp_unit(relevance_score),
            token_estimate,
            metadata,
        }
    }

    /// Multiply the score by `factor`, keeping it inside `[0, 1]`.
    pub fn scale_score(mut self, factor: f64) -> Self {
        self.relevance_score = clamp_unit(self.relevance_score * factor);
        self
    }

    /// Logical identity used for deduplication: the path when present,
    /// otherwise the first `prefix_chars` characters of the content.
    pub fn dedupe_key(&self, prefix_chars: usize) -> (ItemKind, String) {
        let locator = match &self.path {
            Some(path) => path.clone(),
            None => self.content.chars().take(prefix_chars).collect(),
        };
        (self.kind, locator)
    }
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
