//! # ctxpack Core
//!
//! Domain types, collaborator traits, and error definitions for the ctxpack
//! context assembly engine. This crate has no runtime dependencies: it
//! defines the model that the engine and the collaborator implementations
//! are written against.
//!
//! ## Design Philosophy
//!
//! Every external information source is a trait here. Implementations live
//! in `ctxpack-sources` (or in the embedding application). This enables:
//! - Swapping a search backend or git provider without touching the engine
//! - Testing the engine with scripted collaborators
//! - Clean dependency graph (all crates depend inward on core)

pub mod collaborator;
pub mod error;
pub mod item;
pub mod language;
pub mod query;
pub mod request;
pub mod token;
pub mod window;

// Re-export key types at crate root for ergonomics
pub use collaborator::{
    FileContent, FileReader, GitStatus, GitStatusProvider, ProjectTree, SearchMatch, SearchMode,
    SearchProvider, Symbol, SymbolExtractor, SymbolKind, TreeBuilder,
};
pub use error::{CollaboratorError, EngineError, Result};
pub use item::{ContextItem, FileRelationship, ItemKind, ItemMetadata, SearchOrigin};
pub use language::Language;
pub use query::query_terms;
pub use request::{ContextRequest, Depth};
pub use token::estimate_tokens;
pub use window::{ContextWindow, GatherReport, SourceFailure, SourceKind, SourceStats};
