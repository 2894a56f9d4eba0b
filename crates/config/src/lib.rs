//! Configuration loading, validation, and management for ctxpack.
//!
//! Loads configuration from `~/.ctxpack/config.toml` with environment
//! variable overrides. Every field has a default, so an absent file or a
//! partial file is always usable. Validated on load.

use ctxpack_core::request::{DEFAULT_MAX_TOKENS, Depth};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.ctxpack/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Token budget used when a request does not name one.
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: usize,

    /// Relevance scorer weights
    #[serde(default)]
    pub scoring: ScoringWeights,

    /// Window builder settings
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Source gatherer settings
    #[serde(default)]
    pub gather: GatherConfig,
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

/// Weights of the linear relevance model. Must sum to 1.0.
///
/// These are hand-tuned defaults with no calibration data behind them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_query_match")]
    pub query_match: f64,

    #[serde(default = "default_path_match")]
    pub path_match: f64,

    #[serde(default = "default_import_distance")]
    pub import_distance: f64,

    #[serde(default = "default_recency")]
    pub recency: f64,

    #[serde(default = "default_symbol_importance")]
    pub symbol_importance: f64,
}

fn default_query_match() -> f64 {
    0.35
}
fn default_path_match() -> f64 {
    0.20
}
fn default_import_distance() -> f64 {
    0.20
}
fn default_recency() -> f64 {
    0.15
}
fn default_symbol_importance() -> f64 {
    0.10
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            query_match: default_query_match(),
            path_match: default_path_match(),
            import_distance: default_import_distance(),
            recency: default_recency(),
            symbol_importance: default_symbol_importance(),
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.query_match + self.path_match + self.import_distance + self.recency + self.symbol_importance
    }

    fn all(&self) -> [(&'static str, f64); 5] {
        [
            ("query_match", self.query_match),
            ("path_match", self.path_match),
            ("import_distance", self.import_distance),
            ("recency", self.recency),
            ("symbol_importance", self.symbol_importance),
        ]
    }

    /// Check every weight is finite and non-negative and that they sum to 1.0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in self.all() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "scoring.{name} must be a finite, non-negative number (got {weight})"
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::ValidationError(format!(
                "scoring weights must sum to 1.0 (got {sum:.6})"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Minimum remaining tokens for the boundary item to be truncated
    /// rather than dropped.
    #[serde(default = "default_truncation_threshold")]
    pub truncation_threshold: usize,

    /// Appended to truncated content on its own line.
    #[serde(default = "default_truncation_marker")]
    pub truncation_marker: String,
}

fn default_truncation_threshold() -> usize {
    500
}
fn default_truncation_marker() -> String {
    "... (truncated)".into()
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            truncation_threshold: default_truncation_threshold(),
            truncation_marker: default_truncation_marker(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatherConfig {
    /// Per-call timeout applied to every collaborator call.
    #[serde(default = "default_timeout_ms")]
    pub collaborator_timeout_ms: u64,

    /// Static imports followed from the current file.
    #[serde(default = "default_max_imports")]
    pub max_imports: usize,

    /// Recently touched files considered.
    #[serde(default = "default_max_recent_files")]
    pub max_recent_files: usize,

    /// Score multiplier for everything the recent-files gatherer emits.
    #[serde(default = "default_recent_penalty")]
    pub recent_penalty: f64,

    #[serde(default = "default_tree_depth")]
    pub tree_depth: usize,

    #[serde(default)]
    pub include_hidden: bool,

    /// Suffixes probed, in order, when resolving a relative import.
    #[serde(default = "default_import_extensions")]
    pub import_extensions: Vec<String>,

    /// Content prefix length used as the dedupe key for path-less items.
    #[serde(default = "default_dedupe_prefix_chars")]
    pub dedupe_prefix_chars: usize,

    /// Context lines kept on each side of a content-search hit.
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,

    /// Share of the query's terms a line must contain to count as a
    /// content-search hit (at least one term always).
    #[serde(default = "default_search_term_fraction")]
    pub search_term_fraction: f64,

    #[serde(default = "default_shallow_results")]
    pub shallow_results: usize,

    #[serde(default = "default_medium_results")]
    pub medium_results: usize,

    #[serde(default = "default_deep_results")]
    pub deep_results: usize,
}

fn default_timeout_ms() -> u64 {
    5_000
}
fn default_max_imports() -> usize {
    5
}
fn default_max_recent_files() -> usize {
    3
}
fn default_recent_penalty() -> f64 {
    0.8
}
fn default_tree_depth() -> usize {
    3
}
fn default_import_extensions() -> Vec<String> {
    [
        "", ".ts", ".tsx", ".js", ".jsx", "/index.ts", "/index.tsx", "/index.js", "/index.jsx",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_dedupe_prefix_chars() -> usize {
    100
}
fn default_context_lines() -> usize {
    2
}
fn default_search_term_fraction() -> f64 {
    0.5
}
fn default_shallow_results() -> usize {
    Depth::Shallow.default_result_cap()
}
fn default_medium_results() -> usize {
    Depth::Medium.default_result_cap()
}
fn default_deep_results() -> usize {
    Depth::Deep.default_result_cap()
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            collaborator_timeout_ms: default_timeout_ms(),
            max_imports: default_max_imports(),
            max_recent_files: default_max_recent_files(),
            recent_penalty: default_recent_penalty(),
            tree_depth: default_tree_depth(),
            include_hidden: false,
            import_extensions: default_import_extensions(),
            dedupe_prefix_chars: default_dedupe_prefix_chars(),
            context_lines: default_context_lines(),
            search_term_fraction: default_search_term_fraction(),
            shallow_results: default_shallow_results(),
            medium_results: default_medium_results(),
            deep_results: default_deep_results(),
        }
    }
}

impl GatherConfig {
    /// Result cap per search mode for the given depth.
    pub fn results_for(&self, depth: Depth) -> usize {
        match depth {
            Depth::Shallow => self.shallow_results,
            Depth::Medium => self.medium_results,
            Depth::Deep => self.deep_results,
        }
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

impl EngineConfig {
    /// Load configuration from the default path (~/.ctxpack/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `CTXPACK_MAX_TOKENS`
    /// - `CTXPACK_TIMEOUT_MS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `CTXPACK_*` environment variables on top of the loaded values.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var("CTXPACK_MAX_TOKENS") {
            self.default_max_tokens = parse_env("CTXPACK_MAX_TOKENS", &raw)?;
        }
        if let Ok(raw) = std::env::var("CTXPACK_TIMEOUT_MS") {
            self.gather.collaborator_timeout_ms = parse_env("CTXPACK_TIMEOUT_MS", &raw)?;
        }
        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ctxpack")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "default_max_tokens must be > 0".into(),
            ));
        }

        self.scoring.validate()?;

        let gather = &self.gather;
        if gather.collaborator_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "gather.collaborator_timeout_ms must be > 0".into(),
            ));
        }
        if !(gather.recent_penalty > 0.0 && gather.recent_penalty <= 1.0) {
            return Err(ConfigError::ValidationError(
                "gather.recent_penalty must be in (0, 1]".into(),
            ));
        }
        if gather.shallow_results == 0 || gather.medium_results == 0 || gather.deep_results == 0 {
            return Err(ConfigError::ValidationError(
                "gather result caps must be > 0".into(),
            ));
        }
        if gather.dedupe_prefix_chars == 0 {
            return Err(ConfigError::ValidationError(
                "gather.dedupe_prefix_chars must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&gather.search_term_fraction) {
            return Err(ConfigError::ValidationError(
                "gather.search_term_fraction must be in [0, 1]".into(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as TOML (for `ctxpack config`).
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_max_tokens: default_max_tokens(),
            scoring: ScoringWeights::default(),
            budget: BudgetConfig::default(),
            gather: GatherConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{name} is not a valid number: '{raw}'")))
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to serialize config: {0}")]
    SerializeError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
