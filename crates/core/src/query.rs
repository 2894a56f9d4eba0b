//! Query term normalisation.
//!
//! Requests arrive as natural language ("how is the token budget
//! applied?"). Both the search backend and the path scorer work on the same
//! reduced form: lowercase alphanumeric runs (`_` kept), at least three
//! characters, common question words removed.

/// Shortest term kept.
pub const MIN_TERM_CHARS: usize = 3;

/// Words that carry no signal in a code search.
const STOPWORDS: &[&str] = &[
    "about", "and", "are", "can", "does", "for", "from", "have", "how", "into", "the", "this",
    "that", "what", "when", "where", "which", "who", "why", "with", "was", "were", "will", "you",
];

/// Distinct lowercased terms of `query`, sorted.
///
/// Falls back to the unfiltered terms when every word is a stopword, so a
/// query like `"where"` still searches for something.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut all: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.chars().count() >= MIN_TERM_CHARS)
        .map(str::to_lowercase)
        .collect();
    all.sort();
    all.dedup();

    let content: Vec<String> = all
        .iter()
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .cloned()
        .collect();
    if content.is_empty() { all } else { content }
}
