//! Report rendering for hivescope.
//!
//! The renderers are pure functions from results to text; [`ReportSink`]
//! is the only part that touches the filesystem.
//!
//! ```rust
//! use std::time::Duration;
//! use hivescope_core::{EnumerationResult, KeyNode};
//! use hivescope_export::{ReportHeader, render_tree};
//!
//! let nodes = vec![KeyNode::new("A", "A", 0, 1), KeyNode::new("A1", r"A\A1", 1, 0)];
//! let result = EnumerationResult::succeeded("", nodes, 2, Duration::ZERO);
//! let text = render_tree(&result, &ReportHeader::now("Registry Enumerate Export"));
//!
//! assert!(text.ends_with("└─ A\n    └─ A1\n"));
//! ```

mod report;
mod sink;
mod tree;
mod values;

pub use report::{ReportHeader, SEPARATOR_WIDTH, TREE_TITLE, VALUES_TITLE, separator};
pub use sink::{ExportError, ReportSink};
pub use tree::{is_last_at_depth, render_tree, render_tree_body};
pub use values::{render_value_group, render_values};
