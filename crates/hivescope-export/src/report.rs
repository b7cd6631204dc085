//! Shared report header.

use chrono::{Local, NaiveDateTime};

/// Width of the `=` rule below report headers.
pub const SEPARATOR_WIDTH: usize = 60;

/// Default title of tree reports.
pub const TREE_TITLE: &str = "Registry Enumerate Export";

/// Default title of value reports.
pub const VALUES_TITLE: &str = "Registry Export";

/// Title and generation time printed at the top of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    pub title: String,
    pub generated_at: NaiveDateTime,
}

impl ReportHeader {
    /// Create a header with an explicit timestamp.
    pub fn new(title: impl Into<String>, generated_at: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            generated_at,
        }
    }

    /// Create a header stamped with the current local time.
    pub fn now(title: impl Into<String>) -> Self {
        Self::new(title, Local::now().naive_local())
    }

    /// `"{title} - {yyyy-MM-dd HH:mm:ss}"`.
    pub fn title_line(&self) -> String {
        format!("{} - {}", self.title, self.generated_at.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// The `=` rule.
pub fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}
