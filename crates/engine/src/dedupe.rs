//! Deduplication of gathered items.
//!
//! Two items collide when they share `(kind, path)`, or `(kind, content
//! prefix)` for path-less items. The higher score wins; on a tie the first
//! one seen is kept. Survivors keep the position of the first item seen
//! under their key, so the function is idempotent.

use ctxpack_core::item::{ContextItem, ItemKind};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

pub fn dedupe(items: Vec<ContextItem>, prefix_chars: usize) -> Vec<ContextItem> {
    let mut kept: Vec<ContextItem> = Vec::with_capacity(items.len());
    let mut slots: HashMap<(ItemKind, String), usize> = HashMap::new();

    for item in items {
        match slots.entry(item.dedupe_key(prefix_chars)) {
            Entry::Occupied(slot) => {
                let existing = &mut kept[*slot.get()];
                if item.relevance_score > existing.relevance_score {
                    *existing = item;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(kept.len());
                kept.push(item);
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxpack_core::item::{FileRelationship, ItemMetadata};

    fn file(path: &str, score: f64, relationship: FileRelationship) -> ContextItem {
        ContextItem::new(
            ItemKind::File,
            Some(path.into()),
            format!("contents of {path}"),
            score,
            ItemMetadata::File {
                relationship,
                language: None,
                line_count: 1,
            },
        )
    }

    fn tree(content: &str, score: f64) -> ContextItem {
        ContextItem::new(
            ItemKind::Tree,
            None,
            content,
            score,
            ItemMetadata::Tree {
                file_count: 0,
                depth: 3,
            },
        )
    }

    #[test]
    fn keeps_highest_score_per_path() {
        let items = vec![
            file("src/a.ts", 0.8, FileRelationship::Recent),
            file("src/a.ts", 1.0, FileRelationship::Active),
        ];
        let out = dedupe(items, 100);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].relevance_score, 1.0);
        assert!(matches!(
            out[0].metadata,
            ItemMetadata::File {
                relationship: FileRelationship::Active,
                ..
            }
        ));
    }

    #[test]
    fn tie_keeps_first_seen() {
        let items = vec![
            file("src/a.ts", 0.7, FileRelationship::Imported),
            file("src/a.ts", 0.7, FileRelationship::Recent),
        ];
        let out = dedupe(items, 100);
        assert!(matches!(
            out[0].metadata,
            ItemMetadata::File {
                relationship: FileRelationship::Imported,
                ..
            }
        ));
    }

    #[test]
    fn same_path_different_kind_is_not_a_duplicate() {
        let symbol = ContextItem::new(
            ItemKind::Symbol,
            Some("src/a.ts".into()),
            "symbols",
            0.9,
            ItemMetadata::Symbol {
                symbol_count: 1,
                exported_count: 1,
            },
        );
        let out = dedupe(vec![file("src/a.ts", 1.0, FileRelationship::Active), symbol], 100);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn pathless_items_collide_on_content_prefix() {
        let shared = "x".repeat(100);
        let items = vec![
            tree(&format!("{shared}-first"), 0.5),
            tree(&format!("{shared}-second"), 0.6),
            tree("something else", 0.5),
        ];
        let out = dedupe(items, 100);
        assert_eq!(out.len(), 2);
        assert!(out[0].content.ends_with("-second"));
    }

    #[test]
    fn idempotent_and_never_grows() {
        let items = vec![
            file("a", 0.3, FileRelationship::Recent),
            file("b", 0.5, FileRelationship::Recent),
            file("a", 0.9, FileRelationship::Active),
            tree("t", 0.5),
            tree("t", 0.4),
        ];
        let once = dedupe(items.clone(), 100);
        let twice = dedupe(once.clone(), 100);
        assert!(once.len() <= items.len());
        assert_eq!(once, twice);
    }

    #[test]
    fn winner_set_is_independent_of_input_order() {
        let forward = vec![
            file("a", 0.3, FileRelationship::Recent),
            file("a", 0.9, FileRelationship::Active),
            file("b", 0.5, FileRelationship::Recent),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let mut f: Vec<f64> = dedupe(forward, 100).iter().map(|i| i.relevance_score).collect();
        let mut b: Vec<f64> = dedupe(backward, 100).iter().map(|i| i.relevance_score).collect();
        f.sort_by(f64::total_cmp);
        b.sort_by(f64::total_cmp);
        assert_eq!(f, b);
    }
}
