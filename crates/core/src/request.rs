//! The input to a single gather cycle.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Token budget used when the caller does not pick one.
pub const DEFAULT_MAX_TOKENS: usize = 100_000;

/// How far each gatherer may reach for candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Shallow,
    #[default]
    Medium,
    Deep,
}

impl Depth {
    /// Default result cap per search mode at this depth.
    pub fn default_result_cap(&self) -> usize {
        match self {
            Self::Shallow => 5,
            Self::Medium => 15,
            Self::Deep => 30,
        }
    }
}

impl std::str::FromStr for Depth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shallow" => Ok(Self::Shallow),
            "medium" => Ok(Self::Medium),
            "deep" => Ok(Self::Deep),
            other => Err(format!("unknown depth '{other}' (expected shallow, medium or deep)")),
        }
    }
}

/// Everything the engine needs to assemble one context window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRequest {
    /// Natural-language request from the user.
    pub query: String,

    /// Root of the project being worked on.
    pub project_root: PathBuf,

    /// File currently open in the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_file: Option<String>,

    /// Text the user has selected, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<String>,

    /// Recently opened or edited files, most recent first.
    #[serde(default)]
    pub recent_files: Vec<String>,

    /// Upper bound on the packed window's token estimate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_true")]
    pub include_git: bool,

    #[serde(default = "default_true")]
    pub include_tree: bool,

    #[serde(default)]
    pub depth: Depth,
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}
fn default_true() -> bool {
    true
}

impl ContextRequest {
    pub fn new(query: impl Into<String>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            query: query.into(),
            project_root: project_root.into(),
            current_file: None,
            selection: None,
            recent_files: Vec::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            include_git: true,
            include_tree: true,
            depth: Depth::default(),
        }
    }

    pub fn with_current_file(mut self, path: impl Into<String>) -> Self {
        self.current_file = Some(path.into());
        self
    }

    pub fn with_selection(mut self, text: impl Into<String>) -> Self {
        self.selection = Some(text.into());
        self
    }

    pub fn with_recent_files(mut self, files: Vec<String>) -> Self {
        self.recent_files = files;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_git(mut self, enabled: bool) -> Self {
        self.include_git = enabled;
        self
    }

    pub fn with_tree(mut self, enabled: bool) -> Self {
        self.include_tree = enabled;
        self
    }

    /// Selected text, if present and not blank.
    pub fn active_selection(&self) -> Option<&str> {
        self.selection
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Reject requests that cannot produce a meaningful window.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_tokens == 0 {
            return Err(EngineError::InvalidRequest(
                "max_tokens must be greater than 0".into(),
            ));
        }
        if self.project_root.as_os_str().is_empty() {
            return Err(EngineError::InvalidRequest(
                "project_root must not be empty".into(),
            ));
        }
        let has_file = self
            .current_file
            .as_deref()
            .is_some_and(|f| !f.trim().is_empty());
        if self.query.trim().is_empty() && !has_file && self.active_selection().is_none() {
            return Err(EngineError::InvalidRequest(
                "a query, current file or selection is required".into(),
            ));
        }
        Ok(())
    }
}
