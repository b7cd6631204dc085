//! Composable name predicates.
//!
//! A lighter alternative to [`FilterSpec`](crate::FilterSpec) for callers that
//! build filters in code. All text comparisons are case-insensitive.

use std::collections::HashSet;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use regex::RegexBuilder;
use uuid::Uuid;

use crate::error::FilterError;
use crate::matcher::{NameFilter, NameMatch};

/// A shareable predicate over key names.
#[derive(Clone)]
pub struct NamePredicate(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl NamePredicate {
    /// Wrap a closure.
    pub fn custom(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    fn eval(&self, name: &str) -> bool {
        (self.0)(name)
    }

    /// Accepts every name.
    pub fn always() -> Self {
        Self::custom(|_| true)
    }

    /// All predicates accept (true for an empty list).
    pub fn and(predicates: impl IntoIterator<Item = NamePredicate>) -> Self {
        let predicates: Vec<_> = predicates.into_iter().collect();
        Self::custom(move |name| predicates.iter().all(|p| p.eval(name)))
    }

    /// Any predicate accepts (false for an empty list).
    pub fn or(predicates: impl IntoIterator<Item = NamePredicate>) -> Self {
        let predicates: Vec<_> = predicates.into_iter().collect();
        Self::custom(move |name| predicates.iter().any(|p| p.eval(name)))
    }

    /// Negation.
    pub fn negate(predicate: NamePredicate) -> Self {
        Self::custom(move |name| !predicate.eval(name))
    }

    /// Name starts with `prefix`.
    pub fn starts_with(prefix: impl AsRef<str>) -> Self {
        let prefix = prefix.as_ref().to_lowercase();
        Self::custom(move |name| name.to_lowercase().starts_with(&prefix))
    }

    /// Name ends with `suffix`.
    pub fn ends_with(suffix: impl AsRef<str>) -> Self {
        let suffix = suffix.as_ref().to_lowercase();
        Self::custom(move |name| name.to_lowercase().ends_with(&suffix))
    }

    /// Name contains `text`.
    pub fn contains(text: impl AsRef<str>) -> Self {
        let text = text.as_ref().to_lowercase();
        Self::custom(move |name| name.to_lowercase().contains(&text))
    }

    /// Name matches a regular expression.
    pub fn regex(pattern: &str) -> Result<Self, FilterError> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| FilterError::invalid("regex", pattern, e))?;
        Ok(Self::custom(move |name| re.is_match(name)))
    }

    /// Name is none of `names`.
    pub fn exclude<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = lowercase_set(names);
        Self::custom(move |name| !set.contains(&name.to_lowercase()))
    }

    /// Name is one of `names`.
    pub fn include<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = lowercase_set(names);
        Self::custom(move |name| set.contains(&name.to_lowercase()))
    }

    /// Name parses as a GUID, with or without braces.
    pub fn is_guid() -> Self {
        Self::custom(|name| Uuid::try_parse(name).is_ok())
    }

    /// Lift a compiled filter into a predicate.
    pub fn from_filter(filter: NameFilter) -> Self {
        Self::custom(move |name| filter.is_match(name))
    }
}

fn lowercase_set<I, S>(names: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().map(|n| n.as_ref().to_lowercase()).collect()
}

impl NameMatch for NamePredicate {
    fn is_match(&self, name: &str) -> bool {
        !name.is_empty() && self.eval(name)
    }
}

impl From<NameFilter> for NamePredicate {
    fn from(filter: NameFilter) -> Self {
        Self::from_filter(filter)
    }
}

impl Not for NamePredicate {
    type Output = NamePredicate;

    fn not(self) -> Self::Output {
        NamePredicate::negate(self)
    }
}

impl BitAnd for NamePredicate {
    type Output = NamePredicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        NamePredicate::and([self, rhs])
    }
}

impl BitOr for NamePredicate {
    type Output = NamePredicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        NamePredicate::or([self, rhs])
    }
}

impl fmt::Debug for NamePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NamePredicate(..)")
    }
}
