//! Collaborator traits. The engine's view of the outside world.
//!
//! The engine never touches the filesystem, a search index or git
//! directly. It consumes these contracts, and any conforming
//! implementation may be substituted. Every call is treated as slow and
//! fallible: the engine wraps each one in its own timeout.

use crate::error::CollaboratorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ── Search ────────────────────────────────────────────────────────────────

/// What a search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// File paths.
    File,
    /// File contents, line by line.
    Content,
    /// Declared symbol names.
    Symbol,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Content => "content",
            Self::Symbol => "symbol",
        }
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Path relative to the project root.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column of the match start.
    pub column: usize,
    /// The full text of the matching line.
    pub matched_text: String,
    /// Lines immediately before the match, in file order.
    #[serde(default)]
    pub context_before: Vec<String>,
    /// Lines immediately after the match, in file order.
    #[serde(default)]
    pub context_after: Vec<String>,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        root: &Path,
        mode: SearchMode,
        max_results: usize,
    ) -> Result<Vec<SearchMatch>, CollaboratorError>;
}

// ── Files ─────────────────────────────────────────────────────────────────

/// A file (or line range of one) as returned by a [`FileReader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub path: String,
    pub content: String,
    /// Language identifier suitable for a fenced code block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub line_count: usize,
    pub byte_size: usize,
}

#[async_trait]
pub trait FileReader: Send + Sync {
    /// Read `path`, optionally restricted to a 1-based inclusive line range.
    async fn read(
        &self,
        path: &str,
        start_line: Option<usize>,
        end_line: Option<usize>,
    ) -> Result<FileContent, CollaboratorError>;
}

// ── Symbols ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Class,
    Variable,
    Interface,
    Type,
    Method,
    Property,
    Import,
    Export,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Variable => "variable",
            Self::Interface => "interface",
            Self::Type => "type",
            Self::Method => "method",
            Self::Property => "property",
            Self::Import => "import",
            Self::Export => "export",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    pub line: usize,
    pub column: usize,
    /// Visible outside its module (`export`, `pub`).
    pub exported: bool,
    /// The declaration line, trimmed.
    pub signature: String,
}

#[async_trait]
pub trait SymbolExtractor: Send + Sync {
    async fn extract(&self, path: &str) -> Result<Vec<Symbol>, CollaboratorError>;
}

// ── Project tree ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTree {
    pub ascii_tree: String,
    /// Files included in the tree, relative to the root.
    pub files: Vec<String>,
}

#[async_trait]
pub trait TreeBuilder: Send + Sync {
    async fn build(
        &self,
        root: &Path,
        depth: usize,
        include_hidden: bool,
    ) -> Result<ProjectTree, CollaboratorError>;
}

// ── Version control ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitStatus {
    pub branch: String,
    pub ahead: usize,
    pub behind: usize,
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
    pub untracked: Vec<String>,
    pub has_conflicts: bool,
}

impl GitStatus {
    /// Number of files with any kind of change.
    pub fn changed_files(&self) -> usize {
        self.staged.len() + self.unstaged.len() + self.untracked.len()
    }

    pub fn is_clean(&self) -> bool {
        self.changed_files() == 0
    }
}

#[async_trait]
pub trait GitStatusProvider: Send + Sync {
    async fn status(&self, root: &Path) -> Result<GitStatus, CollaboratorError>;
}
