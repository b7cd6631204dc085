//! Discovered key nodes.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// One key discovered during enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyNode {
    /// Key name (last path segment).
    pub name: CompactString,

    /// Path from the enumeration root, joined with the store separator.
    pub full_path: String,

    /// 0 for direct children of the enumeration root.
    pub depth: u32,

    /// Number of immediate children when the key was visited.
    pub child_count: usize,
}

impl KeyNode {
    /// Create a new key node.
    pub fn new(
        name: impl Into<CompactString>,
        full_path: impl Into<String>,
        depth: u32,
        child_count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            depth,
            child_count,
        }
    }

    /// Whether the key had no children when visited.
    pub fn is_empty(&self) -> bool {
        self.child_count == 0
    }

    /// Path relative to the enumeration root.
    pub fn relative_path<'a>(&'a self, root: &str, separator: char) -> &'a str {
        if root.is_empty() {
            return &self.full_path;
        }
        self.full_path
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix(separator))
            .unwrap_or(&self.full_path)
    }
}
