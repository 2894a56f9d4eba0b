//! The context engine. Fans out to the gatherers, then dedupes, sorts and packs.
//!
//! # Determinism
//!
//! Gatherer outputs are concatenated in a fixed source order, the sort is
//! stable, and packing is a single greedy pass. Identical requests with
//! identical collaborator responses always produce identical windows.
//!
//! # Cancellation
//!
//! Cancelling the token discards everything gathered so far and yields
//! [`EngineError::Cancelled`]. A cancelled cycle never returns a window.

use crate::dedupe::dedupe;
use crate::formatter::format_window;
use crate::gather::{self, Collaborators, GatherContext, SourceOutput};
use crate::packer::WindowBuilder;
use crate::scorer::RelevanceScorer;
use ctxpack_config::EngineConfig;
use ctxpack_core::error::{EngineError, Result};
use ctxpack_core::item::ContextItem;
use ctxpack_core::request::ContextRequest;
use ctxpack_core::window::{ContextWindow, GatherReport, SourceStats};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Stateless between calls; share one instance across concurrent requests.
#[derive(Clone)]
pub struct ContextEngine {
    collaborators: Collaborators,
    config: EngineConfig,
    scorer: RelevanceScorer,
    builder: WindowBuilder,
}

impl ContextEngine {
    /// Create an engine. Fails if the configuration does not validate.
    pub fn new(collaborators: Collaborators, config: EngineConfig) -> Result<Self> {
        config.validate().map_err(|e| EngineError::Config {
            message: e.to_string(),
        })?;
        Ok(Self {
            collaborators,
            scorer: RelevanceScorer::new(config.scoring),
            builder: WindowBuilder::new(&config.budget),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Gather, score, dedupe and pack context for `request`.
    pub async fn gather(&self, request: &ContextRequest) -> Result<ContextWindow> {
        self.gather_with_cancel(request, &CancellationToken::new()).await
    }

    /// Like [`gather`](Self::gather), aborting with
    /// [`EngineError::Cancelled`] as soon as `cancel` fires.
    pub async fn gather_with_cancel(
        &self,
        request: &ContextRequest,
        cancel: &CancellationToken,
    ) -> Result<ContextWindow> {
        request.validate()?;

        let outputs = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(query = %request.query, "Gather cancelled, discarding partial results");
                return Err(EngineError::Cancelled);
            }
            outputs = self.run_gatherers(request) => outputs,
        };

        Ok(self.assemble(outputs, request.max_tokens))
    }

    /// Render a packed window for the model.
    pub fn format(&self, window: &ContextWindow) -> String {
        format_window(window)
    }

    /// Run every gatherer concurrently. Each returns an owned output; the
    /// results come back in fixed source order.
    async fn run_gatherers(&self, request: &ContextRequest) -> Vec<SourceOutput> {
        let ctx = GatherContext {
            request,
            collaborators: &self.collaborators,
            config: &self.config,
            scorer: &self.scorer,
        };

        let (current, selection, search, recent, structure, vcs) = tokio::join!(
            gather::current_file::gather(&ctx),
            gather::search::gather_selection(&ctx),
            gather::search::gather(&ctx),
            gather::recent::gather(&ctx),
            gather::structure::gather(&ctx),
            gather::vcs::gather(&ctx),
        );

        vec![current, selection, search, recent, structure, vcs]
    }

    fn assemble(&self, outputs: Vec<SourceOutput>, max_tokens: usize) -> ContextWindow {
        let mut candidates: Vec<ContextItem> = Vec::new();
        let mut per_source = Vec::with_capacity(outputs.len());
        let mut failures = Vec::new();

        for output in outputs {
            debug!(
                source = %output.source,
                items = output.items.len(),
                failures = output.failures.len(),
                "Source gathered"
            );
            per_source.push(SourceStats {
                source: output.source,
                items: output.items.len(),
            });
            failures.extend(output.failures);
            candidates.extend(output.items);
        }

        let candidate_count = candidates.len();
        let mut items = dedupe(candidates, self.config.gather.dedupe_prefix_chars);
        let after_dedupe = items.len();

        // Stable: equal scores keep gatherer order.
        items.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        let window = self.builder.pack(items, max_tokens);
        let report = GatherReport {
            candidates: candidate_count,
            after_dedupe,
            per_source,
            failures,
            ..window.report.clone()
        };

        info!(
            candidates = report.candidates,
            after_dedupe = report.after_dedupe,
            included = report.included,
            dropped = report.dropped,
            truncated = report.truncated,
            failures = report.failures.len(),
            total_tokens = window.total_tokens,
            max_tokens,
            "Context window assembled"
        );

        window.with_report(report)
    }
}
