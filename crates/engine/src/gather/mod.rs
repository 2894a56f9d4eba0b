//! Source gatherers.
//!
//! Each gatherer is an independent async function of the request and the
//! collaborators, returning an owned [`SourceOutput`]. Gatherers never see
//! each other's output; the engine concatenates them once all are done.
//!
//! | Gatherer | Collaborators | Baseline score |
//! |----------|---------------|----------------|
//! | current file | reader, symbols | 1.0 file / 0.9 symbols / 0.7 imports |
//! | selection | search | scored (shallow) |
//! | search | search | scored (depth cap) |
//! | recent files | reader, symbols | current-file pipeline × 0.8 |
//! | structure | tree | 0.5 |
//! | version control | git | 0.6 |

pub mod current_file;
pub mod recent;
pub mod search;
pub mod structure;
pub mod vcs;

use crate::scorer::RelevanceScorer;
use ctxpack_config::EngineConfig;
use ctxpack_core::collaborator::{
    FileReader, GitStatusProvider, SearchProvider, SymbolExtractor, TreeBuilder,
};
use ctxpack_core::error::CollaboratorError;
use ctxpack_core::item::ContextItem;
use ctxpack_core::request::ContextRequest;
use ctxpack_core::window::{SourceFailure, SourceKind};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// The external collaborators a gather cycle may call.
#[derive(Clone)]
pub struct Collaborators {
    pub files: Arc<dyn FileReader>,
    pub search: Arc<dyn SearchProvider>,
    pub symbols: Arc<dyn SymbolExtractor>,
    pub tree: Arc<dyn TreeBuilder>,
    pub git: Arc<dyn GitStatusProvider>,
}

/// Everything one gatherer produced.
#[derive(Debug)]
pub struct SourceOutput {
    pub source: SourceKind,
    pub items: Vec<ContextItem>,
    pub failures: Vec<SourceFailure>,
}

impl SourceOutput {
    pub fn empty(source: SourceKind) -> Self {
        Self {
            source,
            items: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Read-only view shared by all gatherers of one cycle.
pub struct GatherContext<'a> {
    pub request: &'a ContextRequest,
    pub collaborators: &'a Collaborators,
    pub config: &'a EngineConfig,
    pub scorer: &'a RelevanceScorer,
}

impl GatherContext<'_> {
    pub fn timeout(&self) -> Duration {
        self.config.gather.collaborator_timeout()
    }
}

/// Await a collaborator call under its own timeout.
///
/// Failures and timeouts become a [`SourceFailure`] and are logged; they
/// never abort the gather cycle.
pub async fn guarded<T, F>(
    timeout: Duration,
    source: SourceKind,
    operation: &str,
    call: F,
) -> Result<T, SourceFailure>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    let error = match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => return Ok(value),
        Ok(Err(e)) => e,
        Err(_) => CollaboratorError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        },
    };

    warn!(
        source = %source,
        operation,
        error = %error,
        "Collaborator call failed, source degraded"
    );
    Err(SourceFailure {
        source,
        operation: operation.to_string(),
        reason: error.to_string(),
    })
}

// ── Rendering helpers ─────────────────────────────────────────────────────

/// Wrap `body` in a fenced code block headed by its path.
pub(crate) fn fenced(header: &str, language: Option<&str>, body: &str) -> String {
    let body = body.strip_suffix('\n').unwrap_or(body);
    format!("{header}\n```{}\n{body}\n```", language.unwrap_or(""))
}

/// Does a source line declare something visible outside its module?
pub(crate) fn is_export_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("export ")
        || line.starts_with("export{")
        || line.starts_with("module.exports")
        || line.starts_with("exports.")
        || line.starts_with("pub ")
        || line.starts_with("pub(")
        || line.starts_with("public ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn guarded_passes_values_through() {
        let value = guarded(Duration::from_secs(1), SourceKind::Search, "search", async {
            Ok::<_, CollaboratorError>(42)
        })
        .await
        .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn guarded_records_errors() {
        let failure = guarded(Duration::from_secs(1), SourceKind::CurrentFile, "read", async {
            Err::<(), _>(CollaboratorError::NotFound("src/x.ts".into()))
        })
        .await
        .unwrap_err();
        assert_eq!(failure.source, SourceKind::CurrentFile);
        assert_eq!(failure.operation, "read");
        assert!(failure.reason.contains("src/x.ts"));
    }

    #[tokio::test(start_paused = true)]
    async fn guarded_times_out_slow_calls() {
        let failure = guarded(Duration::from_millis(50), SourceKind::VersionControl, "status", async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, CollaboratorError>(())
        })
        .await
        .unwrap_err();
        assert_eq!(failure.reason, "Timed out after 50ms");
    }

    #[test]
    fn fenced_strips_one_trailing_newline() {
        assert_eq!(
            fenced("File: a.ts", Some("typescript"), "let a = 1;\n"),
            "File: a.ts\n```typescript\nlet a = 1;\n```"
        );
    }

    #[test]
    fn export_lines() {
        assert!(is_export_line("export function parse() {"));
        assert!(is_export_line("  pub fn pack(&self)"));
        assert!(is_export_line("pub(crate) struct Slot;"));
        assert!(is_export_line("module.exports = { a };"));
        assert!(!is_export_line("function local() {"));
        assert!(!is_export_line("const exported = 1;"));
    }
}
