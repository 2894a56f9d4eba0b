//! Current-file gatherer.
//!
//! Reads the active file, lists its exported symbols, and follows its first
//! few static imports. Import resolution is a regex heuristic over
//! `import … from '…'`, `import '…'`, `export … from '…'` and
//! `require('…')`. Only relative specifiers are followed; package imports
//! and anything that fails to resolve are skipped silently.

use super::{GatherContext, SourceOutput, fenced, guarded};
use ctxpack_core::collaborator::{FileContent, Symbol};
use ctxpack_core::item::{ContextItem, FileRelationship, ItemKind, ItemMetadata};
use ctxpack_core::language::Language;
use ctxpack_core::window::SourceKind;
use futures::future::join_all;
use regex_lite::Regex;
use std::sync::LazyLock;
use tracing::debug;

pub const ACTIVE_FILE_SCORE: f64 = 1.0;
pub const EXPORTED_SYMBOLS_SCORE: f64 = 0.9;
pub const IMPORTED_FILE_SCORE: f64 = 0.7;

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)(?:^\s*import\s+(?:type\s+)?(?:[\w*{}\s,$]+?\s+from\s+)?|^\s*export\s+(?:type\s+)?[\w*{}\s,$]+?\s+from\s+|\brequire\s*\(\s*)['"]([^'"\n]+)['"]"#,
    )
    .expect("IMPORT_RE regex should compile")
});

pub async fn gather(ctx: &GatherContext<'_>) -> SourceOutput {
    match ctx.request.current_file.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => {
            gather_file(ctx, SourceKind::CurrentFile, path, FileRelationship::Active).await
        }
        _ => SourceOutput::empty(SourceKind::CurrentFile),
    }
}

/// The per-file pipeline: file content, exported symbols, imports.
///
/// Shared with the recent-files gatherer, which rescales the scores.
pub(crate) async fn gather_file(
    ctx: &GatherContext<'_>,
    source: SourceKind,
    path: &str,
    relationship: FileRelationship,
) -> SourceOutput {
    let mut out = SourceOutput::empty(source);
    let timeout = ctx.timeout();

    let (file, symbols) = tokio::join!(
        guarded(timeout, source, "read", ctx.collaborators.files.read(path, None, None)),
        guarded(timeout, source, "extract_symbols", ctx.collaborators.symbols.extract(path)),
    );

    let file = match file {
        Ok(file) => Some(file),
        Err(failure) => {
            out.failures.push(failure);
            None
        }
    };

    if let Some(file) = &file
        && !file.content.trim().is_empty()
    {
        out.items.push(file_item(path, file, relationship, ACTIVE_FILE_SCORE));
    }

    match symbols {
        Ok(symbols) => out.items.extend(exported_symbols_item(path, &symbols)),
        Err(failure) => out.failures.push(failure),
    }

    if let Some(file) = &file {
        out.items.extend(follow_imports(ctx, path, &file.content).await);
    }

    debug!(source = %source, path, items = out.items.len(), "File pipeline complete");
    out
}

fn file_item(path: &str, file: &FileContent, relationship: FileRelationship, score: f64) -> ContextItem {
    let language = file
        .language
        .clone()
        .or_else(|| Language::from_path(path).name().map(String::from));
    ContextItem::new(
        ItemKind::File,
        Some(path.to_string()),
        fenced(&format!("File: {path}"), language.as_deref(), &file.content),
        score,
        ItemMetadata::File {
            relationship,
            language,
            line_count: file.line_count,
        },
    )
}

fn exported_symbols_item(path: &str, symbols: &[Symbol]) -> Option<ContextItem> {
    let exported: Vec<&Symbol> = symbols.iter().filter(|s| s.exported).collect();
    if exported.is_empty() {
        return None;
    }

    let mut content = format!("Exported symbols in {path}:");
    for symbol in &exported {
        content.push_str(&format!(
            "\n- {} {} (line {}): {}",
            symbol.kind.as_str(),
            symbol.name,
            symbol.line,
            symbol.signature
        ));
    }

    Some(ContextItem::new(
        ItemKind::Symbol,
        Some(path.to_string()),
        content,
        EXPORTED_SYMBOLS_SCORE,
        ItemMetadata::Symbol {
            symbol_count: symbols.len(),
            exported_count: exported.len(),
        },
    ))
}

async fn follow_imports(ctx: &GatherContext<'_>, path: &str, content: &str) -> Vec<ContextItem> {
    let targets: Vec<String> = extract_imports(content, ctx.config.gather.max_imports)
        .iter()
        .filter_map(|spec| {
            let resolved = resolve_relative(path, spec);
            if resolved.is_none() {
                debug!(from = path, import = %spec, "Skipping non-relative or malformed import");
            }
            resolved
        })
        .collect();

    join_all(targets.iter().map(|base| probe_import(ctx, path, base)))
        .await
        .into_iter()
        .flatten()
        .collect()
}

/// Try each configured suffix until the reader finds a file.
async fn probe_import(ctx: &GatherContext<'_>, from: &str, base: &str) -> Option<ContextItem> {
    for suffix in &ctx.config.gather.import_extensions {
        let candidate = format!("{base}{suffix}");
        if candidate == from {
            continue;
        }
        let read = ctx.collaborators.files.read(&candidate, None, None);
        match tokio::time::timeout(ctx.timeout(), read).await {
            Ok(Ok(file)) if !file.content.trim().is_empty() => {
                return Some(file_item(
                    &candidate,
                    &file,
                    FileRelationship::Imported,
                    IMPORTED_FILE_SCORE,
                ));
            }
            Ok(Ok(_)) => return None,
            Ok(Err(_)) | Err(_) => continue,
        }
    }
    debug!(from, import = base, "Import did not resolve to a readable file");
    None
}

/// The first `limit` distinct import specifiers, in file order.
pub(crate) fn extract_imports(content: &str, limit: usize) -> Vec<String> {
    let mut specs: Vec<String> = Vec::new();
    for caps in IMPORT_RE.captures_iter(content) {
        if specs.len() >= limit {
            break;
        }
        if let Some(spec) = caps.get(1) {
            let spec = spec.as_str().to_string();
            if !specs.contains(&spec) {
                specs.push(spec);
            }
        }
    }
    specs
}

/// Resolve a relative specifier against the importing file's directory.
///
/// Returns `None` for package/absolute specifiers and for paths that climb
/// above the root.
pub(crate) fn resolve_relative(from_file: &str, spec: &str) -> Option<String> {
    if !(spec.starts_with("./") || spec.starts_with("../")) {
        return None;
    }

    let from_file = from_file.replace('\\', "/");
    let absolute = from_file.starts_with('/');
    let mut parts: Vec<&str> = from_file.split('/').filter(|s| !s.is_empty()).collect();
    parts.pop(); // the file name

    for segment in spec.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return None;
    }
    let joined = parts.join("/");
    Some(if absolute { format!("/{joined}") } else { joined })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_es_and_commonjs_imports_in_order() {
        let src = r#"
import React from 'react';
import { parse, format } from "./parser";
import * as util from '../shared/util';
import './styles.css';
import type { Header } from './types';
export { helper } from './helper';
const fs = require('fs');
const cfg = require("./config");
"#;
        assert_eq!(
            extract_imports(src, 10),
            vec![
                "react",
                "./parser",
                "../shared/util",
                "./styles.css",
                "./types",
                "./helper",
                "fs",
                "./config"
            ]
        );
    }

    #[test]
    fn import_limit_counts_statements() {
        let src = "import a from 'a';\nimport b from './b';\nimport c from './c';\n";
        assert_eq!(extract_imports(src, 2), vec!["a", "./b"]);
    }

    #[test]
    fn multiline_import_is_recognized() {
        let src = "import {\n  alpha,\n  beta,\n} from './greek';\n";
        assert_eq!(extract_imports(src, 5), vec!["./greek"]);
    }

    #[test]
    fn duplicate_specifiers_collapse() {
        let src = "import a from './x';\nimport { b } from './x';\n";
        assert_eq!(extract_imports(src, 5), vec!["./x"]);
    }

    #[test]
    fn resolves_sibling_and_parent_imports() {
        assert_eq!(resolve_relative("src/app.ts", "./util"), Some("src/util".into()));
        assert_eq!(
            resolve_relative("src/ui/button.tsx", "../lib/theme"),
            Some("src/lib/theme".into())
        );
        assert_eq!(
            resolve_relative("/repo/src/app.ts", "./a/./b"),
            Some("/repo/src/a/b".into())
        );
    }

    #[test]
    fn skips_package_and_escaping_imports() {
        assert_eq!(resolve_relative("src/app.ts", "react"), None);
        assert_eq!(resolve_relative("src/app.ts", "/abs/path"), None);
        assert_eq!(resolve_relative("app.ts", "../outside"), None);
        assert_eq!(resolve_relative("src/app.ts", "../../outside"), None);
    }

    #[test]
    fn exported_symbols_item_lists_only_exports() {
        let symbols = vec![
            Symbol {
                name: "parse".into(),
                kind: ctxpack_core::collaborator::SymbolKind::Function,
                file: "src/p.ts".into(),
                line: 3,
                column: 1,
                exported: true,
                signature: "export function parse(input: string)".into(),
            },
            Symbol {
                name: "helper".into(),
                kind: ctxpack_core::collaborator::SymbolKind::Function,
                file: "src/p.ts".into(),
                line: 9,
                column: 1,
                exported: false,
                signature: "function helper()".into(),
            },
        ];
        let item = exported_symbols_item("src/p.ts", &symbols).unwrap();
        assert_eq!(item.kind, ItemKind::Symbol);
        assert_eq!(item.relevance_score, EXPORTED_SYMBOLS_SCORE);
        assert!(item.content.contains("function parse (line 3)"));
        assert!(!item.content.contains("helper"));
        assert_eq!(
            item.metadata,
            ItemMetadata::Symbol {
                symbol_count: 2,
                exported_count: 1
            }
        );
    }

    #[test]
    fn no_exports_no_symbol_item() {
        assert!(exported_symbols_item("src/p.ts", &[]).is_none());
    }
}
