//! Filter compilation errors.

use thiserror::Error;

/// Errors raised while compiling a filter.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A regex, wildcard or exclude pattern did not compile.
    #[error("Invalid {kind} pattern '{pattern}': {source}")]
    InvalidPattern {
        kind: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl FilterError {
    pub(crate) fn invalid(kind: &'static str, pattern: &str, source: regex::Error) -> Self {
        Self::InvalidPattern {
            kind,
            pattern: pattern.to_string(),
            source,
        }
    }
}
