//! Tree report rendering.

use hivescope_core::{EnumerationResult, KeyNode};

use crate::report::{ReportHeader, separator};

const BRANCH: &str = "├─ ";
const LAST_BRANCH: &str = "└─ ";
const INDENT_WIDTH: usize = 4;

/// Render an enumeration result as a text tree.
///
/// A failed result renders its header followed by an `Error:` line.
pub fn render_tree(result: &EnumerationResult, header: &ReportHeader) -> String {
    let mut out = String::new();
    out.push_str(&header.title_line());
    out.push('\n');
    out.push_str(&format!(
        "Total: {}, Filtered: {}\n",
        result.total_count, result.filtered_count
    ));
    out.push_str(&separator());
    out.push_str("\n\n");

    match result.error() {
        Some(message) if !result.success => {
            out.push_str(&format!("Error: {message}\n"));
        }
        _ => out.push_str(&render_tree_body(&result.nodes)),
    }
    out
}

/// Render only the tree lines for `nodes`.
pub fn render_tree_body(nodes: &[KeyNode]) -> String {
    let mut out = String::new();
    for (i, node) in nodes.iter().enumerate() {
        let indent = " ".repeat(node.depth as usize * INDENT_WIDTH);
        let glyph = if is_last_at_depth(nodes, i) { LAST_BRANCH } else { BRANCH };
        out.push_str(&indent);
        out.push_str(glyph);
        out.push_str(&node.name);
        out.push('\n');
    }
    out
}

/// Whether `nodes[index]` is the last entry at its depth before the list
/// returns to a shallower depth.
///
/// Only the flat list is consulted; siblings are not reconstructed.
pub fn is_last_at_depth(nodes: &[KeyNode], index: usize) -> bool {
    let Some(current) = nodes.get(index) else {
        return true;
    };

    for next in &nodes[index + 1..] {
        if next.depth < current.depth {
            return true;
        }
        if next.depth == current.depth {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn node(name: &str, depth: u32) -> KeyNode {
        KeyNode::new(name, name, depth, 0)
    }

    #[test]
    fn test_flat_siblings() {
        let nodes = [node("A", 0), node("B", 0), node("C", 0)];
        assert_eq!(render_tree_body(&nodes), "├─ A\n├─ B\n└─ C\n");
    }

    #[test]
    fn test_nested_child_is_last() {
        let nodes = [node("A", 0), node("A1", 1), node("B", 0)];
        assert!(!is_last_at_depth(&nodes, 0));
        assert!(is_last_at_depth(&nodes, 1));
        assert!(is_last_at_depth(&nodes, 2));
        assert_eq!(render_tree_body(&nodes), "├─ A\n    └─ A1\n└─ B\n");
    }

    #[test]
    fn test_deeper_entries_are_skipped() {
        let nodes = [node("A", 0), node("A1", 1), node("A1a", 2), node("A2", 1)];
        assert!(!is_last_at_depth(&nodes, 1));
        assert!(is_last_at_depth(&nodes, 2));
        assert!(is_last_at_depth(&nodes, 3));
        assert!(is_last_at_depth(&nodes, 0));
        assert!(is_last_at_depth(&nodes, 10));
    }

    #[test]
    fn test_failed_result_renders_error() {
        let at = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let result = EnumerationResult::failed("X", "Unable to open registry path: X");
        let text = render_tree(&result, &ReportHeader::new("T", at));
        assert!(text.ends_with("\n\nError: Unable to open registry path: X\n"));

        let empty = EnumerationResult::succeeded("X", Vec::new(), 0, Duration::ZERO);
        let text = render_tree(&empty, &ReportHeader::new("T", at));
        assert!(text.ends_with(&format!("{}\n\n", separator())));
    }
}
