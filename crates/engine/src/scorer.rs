//! Relevance scoring with a fixed linear model over five signals.
//!
//! | factor | default weight |
//! |--------|----------------|
//! | query_match | 0.35 |
//! | path_match | 0.20 |
//! | import_distance | 0.20 |
//! | recency | 0.15 |
//! | symbol_importance | 0.10 |
//!
//! Missing factors contribute 0. Factors and the final score are clamped
//! into `[0, 1]`; out-of-range input is never an error.

use ctxpack_config::ScoringWeights;
use ctxpack_core::item::clamp_unit;

/// A partial set of scoring signals, each in `[0, 1]` when present.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreFactors {
    /// Lexical match strength between the item and the query.
    pub query_match: Option<f64>,
    /// Whether the path itself relates to the query.
    pub path_match: Option<f64>,
    /// Proximity to the current file (1.0 = same file).
    pub import_distance: Option<f64>,
    /// Recently opened or edited.
    pub recency: Option<f64>,
    /// Exported/public (high) versus local (low).
    pub symbol_importance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
}

impl RelevanceScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, factors: &ScoreFactors) -> f64 {
        let w = &self.weights;
        let term = |weight: f64, factor: Option<f64>| weight * factor.map_or(0.0, clamp_unit);
        clamp_unit(
            term(w.query_match, factors.query_match)
                + term(w.path_match, factors.path_match)
                + term(w.import_distance, factors.import_distance)
                + term(w.recency, factors.recency)
                + term(w.symbol_importance, factors.symbol_importance),
        )
    }
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}
