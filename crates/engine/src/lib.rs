//! # ctxpack Engine
//!
//! Assembles the context window for one LLM request: fan out to the source
//! gatherers concurrently, score what they find, drop duplicates, and pack
//! the highest-value items into the token budget.
//!
//! ```text
//! request ──▶ gatherers (concurrent) ──▶ dedupe ──▶ sort by score ──▶ pack ──▶ format
//! ```
//!
//! The engine only talks to the outside world through the collaborator
//! traits in `ctxpack-core`, so every stage can be driven by scripted
//! collaborators in tests.

pub mod dedupe;
pub mod engine;
pub mod formatter;
pub mod gather;
pub mod packer;
pub mod scorer;

pub use dedupe::dedupe;
pub use engine::ContextEngine;
pub use formatter::format_window;
pub use gather::Collaborators;
pub use packer::WindowBuilder;
pub use scorer::{RelevanceScorer, ScoreFactors};
