//! Enumeration results.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::node::KeyNode;

/// Aggregate outcome of one enumeration.
///
/// `filtered_count == nodes.len()` holds for every value produced by the
/// constructors. Callers must pass `total_count >= filtered_count`; debug
/// builds assert it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumerationResult {
    /// Root path that was enumerated.
    pub root_path: String,

    /// Retained keys in pre-order.
    pub nodes: Vec<KeyNode>,

    /// Child names inspected across all visited parents.
    pub total_count: usize,

    /// Number of retained keys.
    pub filtered_count: usize,

    /// Whether the walk completed.
    pub success: bool,

    /// Reason for failure, present iff `success` is false.
    pub error_message: Option<String>,

    /// Duration of the walk.
    pub elapsed: Duration,
}

impl EnumerationResult {
    /// Create a successful result.
    pub fn succeeded(
        root_path: impl Into<String>,
        nodes: Vec<KeyNode>,
        total_count: usize,
        elapsed: Duration,
    ) -> Self {
        let filtered_count = nodes.len();
        debug_assert!(
            total_count >= filtered_count,
            "total_count {total_count} below retained count {filtered_count}"
        );
        Self {
            root_path: root_path.into(),
            nodes,
            total_count,
            filtered_count,
            success: true,
            error_message: None,
            elapsed,
        }
    }

    /// Create a failed result with no nodes.
    pub fn failed(root_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            nodes: Vec::new(),
            total_count: 0,
            filtered_count: 0,
            success: false,
            error_message: Some(message.into()),
            elapsed: Duration::ZERO,
        }
    }

    /// Failure reason, if any.
    pub fn error(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Whether no keys were retained.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest depth among retained keys.
    pub fn max_depth(&self) -> Option<u32> {
        self.nodes.iter().map(|n| n.depth).max()
    }

    /// Retained keys at `depth`.
    pub fn at_depth(&self, depth: u32) -> impl Iterator<Item = &KeyNode> {
        self.nodes.iter().filter(move |n| n.depth == depth)
    }
}
