//! Declarative filter specifications.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::matcher::NameFilter;
use crate::patterns;

/// Caller-supplied name predicate used by [`FilterMode::Custom`].
#[derive(Clone)]
pub struct CustomMatch(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl CustomMatch {
    /// Wrap a predicate.
    pub fn new(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub(crate) fn call(&self, name: &str) -> bool {
        (self.0)(name)
    }
}

impl fmt::Debug for CustomMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomMatch(..)")
    }
}

/// How the primary pattern of a [`FilterSpec`] is matched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FilterMode {
    /// Every name matches.
    #[default]
    None,
    /// Whole-name equality.
    Exact { pattern: String },
    /// Substring.
    Contains { pattern: String },
    /// Prefix.
    StartsWith { pattern: String },
    /// Suffix.
    EndsWith { pattern: String },
    /// Regular expression (unanchored unless the pattern anchors itself).
    Regex { pattern: String },
    /// Glob with `*` and `?`, anchored to the whole name.
    Wildcard { pattern: String },
    /// Programmatic predicate; not serializable.
    #[serde(skip)]
    Custom(CustomMatch),
}

impl FilterMode {
    /// Short name of the mode.
    pub fn name(&self) -> &'static str {
        match self {
            FilterMode::None => "none",
            FilterMode::Exact { .. } => "exact",
            FilterMode::Contains { .. } => "contains",
            FilterMode::StartsWith { .. } => "starts_with",
            FilterMode::EndsWith { .. } => "ends_with",
            FilterMode::Regex { .. } => "regex",
            FilterMode::Wildcard { .. } => "wildcard",
            FilterMode::Custom(_) => "custom",
        }
    }

    /// The primary pattern, for modes that carry one.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            FilterMode::Exact { pattern }
            | FilterMode::Contains { pattern }
            | FilterMode::StartsWith { pattern }
            | FilterMode::EndsWith { pattern }
            | FilterMode::Regex { pattern }
            | FilterMode::Wildcard { pattern } => Some(pattern),
            FilterMode::None | FilterMode::Custom(_) => None,
        }
    }

    /// The same mode applied to another pattern.
    ///
    /// Modes without a textual pattern fall back to exact matching.
    pub fn with_pattern(&self, pattern: impl Into<String>) -> FilterMode {
        let pattern = pattern.into();
        match self {
            FilterMode::Contains { .. } => FilterMode::Contains { pattern },
            FilterMode::StartsWith { .. } => FilterMode::StartsWith { pattern },
            FilterMode::EndsWith { .. } => FilterMode::EndsWith { pattern },
            FilterMode::Regex { .. } => FilterMode::Regex { pattern },
            FilterMode::Wildcard { .. } => FilterMode::Wildcard { pattern },
            FilterMode::Exact { .. } | FilterMode::None | FilterMode::Custom(_) => {
                FilterMode::Exact { pattern }
            }
        }
    }
}

/// A serializable description of a key-name predicate.
///
/// Evaluation order:
/// 1. any matching exclude pattern returns `invert` outright;
/// 2. the primary mode is evaluated;
/// 3. if it failed, any matching alternate pattern makes it succeed;
/// 4. the result is flipped when `invert` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Primary mode and pattern.
    #[serde(flatten)]
    pub mode: FilterMode,

    /// Extra patterns OR-ed with the primary one, matched in the same mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<String>,

    /// Regular expressions that veto a name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_patterns: Vec<String>,

    /// Flip the final result.
    #[serde(default)]
    pub invert: bool,

    /// Match case-sensitively (default is case-insensitive).
    #[serde(default)]
    pub case_sensitive: bool,
}

impl FilterSpec {
    /// Create a spec from a mode.
    pub fn new(mode: FilterMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Spec that matches every name.
    pub fn any() -> Self {
        Self::default()
    }

    /// Whole-name match.
    pub fn exact(pattern: impl Into<String>) -> Self {
        Self::new(FilterMode::Exact {
            pattern: pattern.into(),
        })
    }

    /// Substring match.
    pub fn contains(pattern: impl Into<String>) -> Self {
        Self::new(FilterMode::Contains {
            pattern: pattern.into(),
        })
    }

    /// Prefix match.
    pub fn starts_with(pattern: impl Into<String>) -> Self {
        Self::new(FilterMode::StartsWith {
            pattern: pattern.into(),
        })
    }

    /// Suffix match.
    pub fn ends_with(pattern: impl Into<String>) -> Self {
        Self::new(FilterMode::EndsWith {
            pattern: pattern.into(),
        })
    }

    /// Regular expression match.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::new(FilterMode::Regex {
            pattern: pattern.into(),
        })
    }

    /// Glob match (`*`, `?`).
    pub fn wildcard(pattern: impl Into<String>) -> Self {
        Self::new(FilterMode::Wildcard {
            pattern: pattern.into(),
        })
    }

    /// Programmatic match.
    pub fn custom(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self::new(FilterMode::Custom(CustomMatch::new(f)))
    }

    /// Every name except those starting with one of `items` (regex fragments).
    pub fn excluding_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::any().excluding(patterns::exclude_items(items))
    }

    /// Every name except those ending with one of `suffixes` (regex fragments).
    pub fn excluding_suffixes<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::any().excluding(patterns::exclude_suffix(suffixes))
    }

    /// Add an alternate pattern.
    pub fn or_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.alternates.push(pattern.into());
        self
    }

    /// Add several alternate patterns.
    pub fn with_alternates<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternates.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add an exclude pattern.
    pub fn excluding(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Flip the final result.
    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    /// Set case sensitivity.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Compile into an executable filter.
    pub fn compile(&self) -> Result<NameFilter, FilterError> {
        NameFilter::compile(self)
    }
}
