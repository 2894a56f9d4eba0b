//! # ctxpack Sources
//!
//! Local implementations of the collaborator traits from `ctxpack-core`:
//!
//! | Trait | Implementation | Backed by |
//! |-------|----------------|-----------|
//! | `FileReader` | [`FsFileReader`] | `tokio::fs`, sandboxed to the root |
//! | `SymbolExtractor` | [`RegexSymbolExtractor`] | declaration regexes |
//! | `SearchProvider` | [`WalkSearchProvider`] | `walkdir` traversal |
//! | `TreeBuilder` | [`WalkTreeBuilder`] | `walkdir` traversal |
//! | `GitStatusProvider` | [`GitCliStatus`] | `git status --porcelain` |
//!
//! Blocking traversal runs on the blocking thread pool.

pub mod fs_reader;
pub mod git;
pub mod sandbox;
pub mod search;
pub mod symbols;
pub mod tree;
pub mod walk;

pub use fs_reader::FsFileReader;
pub use git::GitCliStatus;
pub use search::WalkSearchProvider;
pub use symbols::RegexSymbolExtractor;
pub use tree::WalkTreeBuilder;
pub use walk::WalkOptions;
