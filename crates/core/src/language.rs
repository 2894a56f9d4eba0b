//! Source language detection from file extensions.
//!
//! Shared by the engine (fence names) and the local collaborators (symbol
//! patterns, reader metadata).

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
    Rust,
    Python,
    Go,
    Java,
    Json,
    Markdown,
    Toml,
    Yaml,
    Css,
    Html,
    Shell,
    Unknown,
}

impl Language {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let Some(ext) = path.as_ref().extension().and_then(|e| e.to_str()) else {
            return Self::Unknown;
        };
        match ext.to_ascii_lowercase().as_str() {
            "ts" | "mts" | "cts" => Self::TypeScript,
            "tsx" => Self::Tsx,
            "js" | "mjs" | "cjs" => Self::JavaScript,
            "jsx" => Self::Jsx,
            "rs" => Self::Rust,
            "py" => Self::Python,
            "go" => Self::Go,
            "java" => Self::Java,
            "json" => Self::Json,
            "md" => Self::Markdown,
            "toml" => Self::Toml,
            "yml" | "yaml" => Self::Yaml,
            "css" | "scss" => Self::Css,
            "html" | "htm" => Self::Html,
            "sh" | "bash" => Self::Shell,
            _ => Self::Unknown,
        }
    }

    /// Name used for fenced code blocks, `None` when unknown.
    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::JavaScript => "javascript",
            Self::Jsx => "jsx",
            Self::Rust => "rust",
            Self::Python => "python",
            Self::Go => "go",
            Self::Java => "java",
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Toml => "toml",
            Self::Yaml => "yaml",
            Self::Css => "css",
            Self::Html => "html",
            Self::Shell => "bash",
            Self::Unknown => return None,
        };
        Some(name)
    }

    /// Whether the ECMAScript family of declaration patterns applies.
    pub fn is_ecmascript(&self) -> bool {
        matches!(self, Self::TypeScript | Self::Tsx | Self::JavaScript | Self::Jsx)
    }
}
