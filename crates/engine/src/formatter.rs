//! Rendering a packed window for the consuming model.
//!
//! Presentation order is by kind (`file → symbol → search → git → tree →
//! diagnostic`), not by score, so the model always sees the same layout.
//! Within a block, items keep their packing order.

use ctxpack_core::item::ItemKind;
use ctxpack_core::window::ContextWindow;

fn block_name(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::File => "files",
        ItemKind::Symbol => "symbols",
        ItemKind::Search => "search_results",
        ItemKind::Git => "git_status",
        ItemKind::Tree => "project_structure",
        ItemKind::Diagnostic => "diagnostics",
    }
}

pub fn format_window(window: &ContextWindow) -> String {
    let mut out = format!(
        "<context utilization=\"{:.4}\" total_tokens=\"{}\" max_tokens=\"{}\">\n",
        window.utilization, window.total_tokens, window.max_tokens
    );

    for kind in ItemKind::ALL {
        let contents: Vec<&str> = window.items_of(kind).map(|i| i.content.as_str()).collect();
        if contents.is_empty() {
            continue;
        }
        let name = block_name(kind);
        out.push_str(&format!("<{name}>\n{}\n</{name}>\n", contents.join("\n\n")));
    }

    out.push_str("</context>");
    out
}
