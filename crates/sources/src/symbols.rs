//! Regex-based symbol extraction.
//!
//! Line-oriented declaration patterns for the ECMAScript family and Rust.
//! This is a heuristic: declarations split across lines, or produced by
//! macros, are not seen. Other languages yield no symbols.

use crate::sandbox::resolve_in_root;
use async_trait::async_trait;
use ctxpack_core::collaborator::{Symbol, SymbolExtractor, SymbolKind};
use ctxpack_core::error::CollaboratorError;
use ctxpack_core::language::Language;
use regex_lite::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Signatures longer than this are cut.
const MAX_SIGNATURE_CHARS: usize = 160;

/// A declaration pattern: group 1 is the visibility marker (present means
/// exported), group 2 the declared name.
struct Pattern {
    re: Regex,
    kind: SymbolKind,
}

fn pattern(re: &str, kind: SymbolKind) -> Pattern {
    Pattern {
        re: Regex::new(re).expect("symbol pattern should compile"),
        kind,
    }
}

static ECMASCRIPT: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    vec![
        pattern(
            r"^\s*(export\s+(?:default\s+)?)?(?:declare\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)",
            SymbolKind::Function,
        ),
        pattern(
            r"^\s*(export\s+(?:default\s+)?)?(?:declare\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)",
            SymbolKind::Class,
        ),
        pattern(
            r"^\s*(export\s+)?(?:declare\s+)?interface\s+([A-Za-z_$][\w$]*)",
            SymbolKind::Interface,
        ),
        pattern(
            r"^\s*(export\s+)?(?:declare\s+)?(?:const\s+)?enum\s+([A-Za-z_$][\w$]*)",
            SymbolKind::Type,
        ),
        pattern(
            r"^\s*(export\s+)?(?:declare\s+)?type\s+([A-Za-z_$][\w$]*)\s*(?:<[^=]*>)?\s*=",
            SymbolKind::Type,
        ),
        pattern(
            r"^\s*(export\s+)?(?:declare\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)",
            SymbolKind::Variable,
        ),
    ]
});

static RUST: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    vec![
        pattern(
            r#"^\s*(pub(?:\([^)]*\))?\s+)?(?:default\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+"[^"]*"\s+)?fn\s+([A-Za-z_]\w*)"#,
            SymbolKind::Function,
        ),
        pattern(
            r"^\s*(pub(?:\([^)]*\))?\s+)?(?:struct|union)\s+([A-Za-z_]\w*)",
            SymbolKind::Class,
        ),
        pattern(
            r"^\s*(pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?trait\s+([A-Za-z_]\w*)",
            SymbolKind::Interface,
        ),
        pattern(
            r"^\s*(pub(?:\([^)]*\))?\s+)?(?:enum|type)\s+([A-Za-z_]\w*)",
            SymbolKind::Type,
        ),
        pattern(
            r"^\s*(pub(?:\([^)]*\))?\s+)?(?:const|static(?:\s+mut)?)\s+([A-Za-z_]\w*)\s*:",
            SymbolKind::Variable,
        ),
    ]
});

fn patterns_for(language: Language) -> &'static [Pattern] {
    if language.is_ecmascript() {
        ECMASCRIPT.as_slice()
    } else if language == Language::Rust {
        RUST.as_slice()
    } else {
        &[]
    }
}

/// Whether declarations can be extracted from files of this language.
pub fn supports(language: Language) -> bool {
    !patterns_for(language).is_empty()
}

/// Extract declarations from `content`. `file` is recorded on each symbol.
pub fn extract_symbols(file: &str, language: Language, content: &str) -> Vec<Symbol> {
    let patterns = patterns_for(language);
    let mut symbols = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let Some((caps, kind)) = patterns
            .iter()
            .find_map(|p| p.re.captures(line).map(|caps| (caps, p.kind)))
        else {
            continue;
        };
        let Some(name) = caps.get(2) else {
            continue;
        };

        let indented = line.starts_with(char::is_whitespace);
        let kind = match kind {
            // Indented functions are methods of an impl, class or trait.
            SymbolKind::Function if indented => SymbolKind::Method,
            other => other,
        };

        symbols.push(Symbol {
            name: name.as_str().to_string(),
            kind,
            file: file.to_string(),
            line: index + 1,
            column: line[..name.start()].chars().count() + 1,
            exported: caps.get(1).is_some(),
            signature: signature(line),
        });
    }
    symbols
}

fn signature(line: &str) -> String {
    let trimmed = line.trim().trim_end_matches('{').trim_end();
    if trimmed.chars().count() <= MAX_SIGNATURE_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(MAX_SIGNATURE_CHARS).collect();
        format!("{cut}…")
    }
}

/// [`SymbolExtractor`] that reads files under a project root and applies
/// the declaration patterns above.
pub struct RegexSymbolExtractor {
    root: PathBuf,
}

impl RegexSymbolExtractor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SymbolExtractor for RegexSymbolExtractor {
    async fn extract(&self, path: &str) -> Result<Vec<Symbol>, CollaboratorError> {
        let language = Language::from_path(path);
        if !supports(language) {
            return Ok(Vec::new());
        }
        let resolved = resolve_in_root(&self.root, path).await?;
        let content = tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| CollaboratorError::from_io(path, &e))?;
        Ok(extract_symbols(path, language, &content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(symbols: &[Symbol]) -> Vec<(&str, SymbolKind, bool)> {
        symbols
            .iter()
            .map(|s| (s.name.as_str(), s.kind, s.exported))
            .collect()
    }

    #[test]
    fn typescript_declarations() {
        let src = r#"import { x } from './x';

export async function loadConfig(path: string) {
function helper() {}
export default class Engine {
  run() {}
}
export interface Options {
export type Mode = 'a' | 'b';
type Pair<T> = [T, T];
export const enum Level {
export const DEFAULT_LIMIT = 10;
let counter = 0;
"#;
        let symbols = extract_symbols("src/config.ts", Language::TypeScript, src);
        assert_eq!(
            names(&symbols),
            vec![
                ("loadConfig", SymbolKind::Function, true),
                ("helper", SymbolKind::Function, false),
                ("Engine", SymbolKind::Class, true),
                ("Options", SymbolKind::Interface, true),
                ("Mode", SymbolKind::Type, true),
                ("Pair", SymbolKind::Type, false),
                ("Level", SymbolKind::Type, true),
                ("DEFAULT_LIMIT", SymbolKind::Variable, true),
                ("counter", SymbolKind::Variable, false),
            ]
        );

        let load = &symbols[0];
        assert_eq!(load.line, 3);
        assert_eq!(load.column, 23);
        assert_eq!(load.signature, "export async function loadConfig(path: string)");
        assert_eq!(load.file, "src/config.ts");
    }

    #[test]
    fn rust_declarations() {
        let src = r#"pub struct Engine {
    config: Config,
}

impl Engine {
    pub fn new() -> Self {
    fn helper(&self) {}
}

pub(crate) async fn run() {}
pub trait Source: Send {}
enum State { A }
pub const LIMIT: usize = 3;
static mut COUNTER: u32 = 0;
"#;
        let symbols = extract_symbols("src/lib.rs", Language::Rust, src);
        assert_eq!(
            names(&symbols),
            vec![
                ("Engine", SymbolKind::Class, true),
                ("new", SymbolKind::Method, true),
                ("helper", SymbolKind::Method, false),
                ("run", SymbolKind::Function, true),
                ("Source", SymbolKind::Interface, true),
                ("State", SymbolKind::Type, false),
                ("LIMIT", SymbolKind::Variable, true),
                ("COUNTER", SymbolKind::Variable, false),
            ]
        );
    }

    #[test]
    fn unsupported_languages_yield_nothing() {
        assert!(extract_symbols("notes.md", Language::Markdown, "# function x()").is_empty());
        assert!(!supports(Language::Python));
        assert!(supports(Language::Jsx));
    }

    #[test]
    fn long_signatures_are_cut() {
        let line = format!("export function f({})", "a: number, ".repeat(40));
        let sig = signature(&line);
        assert_eq!(sig.chars().count(), MAX_SIGNATURE_CHARS + 1);
    }

    #[tokio::test]
    async fn extractor_reads_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("util.js"), "export function helper() {}\n").unwrap();

        let extractor = RegexSymbolExtractor::new(dir.path());
        let symbols = extractor.extract("util.js").await.unwrap();
        assert_eq!(symbols.len(), 1);
        assert!(symbols[0].exported);

        let none = extractor.extract("README").await.unwrap();
        assert!(none.is_empty());
    }
}
