//! Window builder: greedy single-pass packing into a token budget.
//!
//! # Algorithm
//!
//! Walk the score-sorted items once:
//! 1. If the item fits in what is left, include it whole.
//! 2. Otherwise, if more than `truncation_threshold` tokens remain, cut the
//!    item back to whole lines that fit, append the truncation marker,
//!    include it, and stop.
//! 3. Otherwise drop it and stop.
//!
//! Items after the stopping point are never examined. This is not an
//! optimal knapsack; it never backtracks.

use ctxpack_config::BudgetConfig;
use ctxpack_core::item::ContextItem;
use ctxpack_core::token::{CHARS_PER_TOKEN, estimate_tokens};
use ctxpack_core::window::{ContextWindow, GatherReport};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct WindowBuilder {
    truncation_threshold: usize,
    marker: String,
}

impl WindowBuilder {
    pub fn new(config: &BudgetConfig) -> Self {
        Self {
            truncation_threshold: config.truncation_threshold,
            marker: config.truncation_marker.clone(),
        }
    }

    /// Pack `items` (already sorted by score, descending) into `max_tokens`.
    ///
    /// The returned window's report carries `included`, `dropped` and
    /// `truncated`; the other report fields are left for the caller.
    pub fn pack(&self, items: Vec<ContextItem>, max_tokens: usize) -> ContextWindow {
        let offered = items.len();
        let mut packed: Vec<ContextItem> = Vec::new();
        let mut total = 0usize;
        let mut truncated = false;

        for item in items {
            if item.content.is_empty() {
                continue;
            }

            if total + item.token_estimate <= max_tokens {
                total += item.token_estimate;
                packed.push(item);
                continue;
            }

            let remaining = max_tokens - total;
            if remaining > self.truncation_threshold {
                match self.truncate(&item.content, remaining) {
                    Some(content) => {
                        debug!(
                            kind = %item.kind,
                            path = item.path.as_deref().unwrap_or("-"),
                            original_tokens = item.token_estimate,
                            remaining,
                            "Truncated boundary item"
                        );
                        packed.push(ContextItem {
                            content,
                            token_estimate: remaining,
                            ..item
                        });
                        total += remaining;
                        truncated = true;
                    }
                    None => {
                        debug!(kind = %item.kind, remaining, "Boundary item has no line that fits, dropped");
                    }
                }
            } else {
                debug!(kind = %item.kind, remaining, "Budget exhausted, boundary item dropped");
            }
            break;
        }

        let included = packed.len();
        ContextWindow::new(packed, max_tokens).with_report(GatherReport {
            included,
            dropped: offered - included,
            truncated,
            ..GatherReport::default()
        })
    }

    /// Keep the longest run of leading whole lines such that the lines plus
    /// the marker line fit in `budget` tokens. `None` when not even the
    /// first line fits.
    fn truncate(&self, content: &str, budget: usize) -> Option<String> {
        let max_chars = budget.saturating_mul(CHARS_PER_TOKEN);
        let marker_chars = self.marker.chars().count() + 1; // "\n" + marker

        let mut kept_chars = 0usize;
        let mut kept_lines = 0usize;
        for (i, line) in content.split('\n').enumerate() {
            let separator = usize::from(i > 0);
            let next = kept_chars + separator + line.chars().count();
            if next + marker_chars > max_chars {
                break;
            }
            kept_chars = next;
            kept_lines += 1;
        }

        if kept_lines == 0 {
            return None;
        }

        let mut out: String = content.split('\n').take(kept_lines).collect::<Vec<_>>().join("\n");
        out.push('\n');
        out.push_str(&self.marker);
        debug_assert!(estimate_tokens(&out) <= budget);
        Some(out)
    }
}

impl Default for WindowBuilder {
    fn default() -> Self {
        Self::new(&BudgetConfig::default())
    }
}
