//! Compiled filters.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};

use crate::error::FilterError;
use crate::spec::{CustomMatch, FilterMode, FilterSpec};

/// Anything that can accept or reject a key name.
///
/// Implementations must reject the empty name.
pub trait NameMatch {
    /// Whether `name` is accepted.
    fn is_match(&self, name: &str) -> bool;
}

impl<F> NameMatch for F
where
    F: Fn(&str) -> bool,
{
    fn is_match(&self, name: &str) -> bool {
        !name.is_empty() && self(name)
    }
}

/// One compiled pattern.
#[derive(Debug, Clone)]
enum Matcher {
    Always,
    Exact(String),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    Pattern(Regex),
    Custom(CustomMatch),
}

impl Matcher {
    fn compile(mode: &FilterMode, case_sensitive: bool) -> Result<Self, FilterError> {
        let fold = |p: &str| fold_case(p, case_sensitive).into_owned();
        Ok(match mode {
            FilterMode::None => Matcher::Always,
            FilterMode::Exact { pattern } => Matcher::Exact(fold(pattern)),
            FilterMode::Contains { pattern } => Matcher::Contains(fold(pattern)),
            FilterMode::StartsWith { pattern } => Matcher::StartsWith(fold(pattern)),
            FilterMode::EndsWith { pattern } => Matcher::EndsWith(fold(pattern)),
            FilterMode::Regex { pattern } => {
                Matcher::Pattern(build_regex("regex", pattern, pattern, case_sensitive)?)
            }
            FilterMode::Wildcard { pattern } => Matcher::Pattern(build_regex(
                "wildcard",
                pattern,
                &wildcard_to_regex(pattern),
                case_sensitive,
            )?),
            FilterMode::Custom(f) => Matcher::Custom(f.clone()),
        })
    }

    /// `folded` is `name` after case folding; `name` is the original.
    fn matches(&self, name: &str, folded: &str) -> bool {
        match self {
            Matcher::Always => true,
            Matcher::Exact(p) => folded == p,
            Matcher::Contains(p) => folded.contains(p.as_str()),
            Matcher::StartsWith(p) => folded.starts_with(p.as_str()),
            Matcher::EndsWith(p) => folded.ends_with(p.as_str()),
            Matcher::Pattern(re) => re.is_match(name),
            Matcher::Custom(f) => f.call(name),
        }
    }
}

/// A compiled, executable [`FilterSpec`].
///
/// Compilation validates every pattern up front, so a malformed regex
/// fails here rather than silently matching nothing during a walk.
#[derive(Debug, Clone)]
pub struct NameFilter {
    primary: Matcher,
    alternates: Vec<Matcher>,
    excludes: Vec<Regex>,
    invert: bool,
    case_sensitive: bool,
}

impl NameFilter {
    /// Compile a spec.
    pub fn compile(spec: &FilterSpec) -> Result<Self, FilterError> {
        let primary = Matcher::compile(&spec.mode, spec.case_sensitive)?;

        let alternates = spec
            .alternates
            .iter()
            .map(|p| Matcher::compile(&spec.mode.with_pattern(p.as_str()), spec.case_sensitive))
            .collect::<Result<Vec<_>, _>>()?;

        let excludes = spec
            .exclude_patterns
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| build_regex("exclude", p, p, spec.case_sensitive))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            primary,
            alternates,
            excludes,
            invert: spec.invert,
            case_sensitive: spec.case_sensitive,
        })
    }

    /// Whether any exclude pattern matches `name`.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excludes.iter().any(|re| re.is_match(name))
    }
}

impl NameMatch for NameFilter {
    fn is_match(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }

        if self.is_excluded(name) {
            return self.invert;
        }

        let folded = fold_case(name, self.case_sensitive);
        let mut matched = self.primary.matches(name, &folded);
        if !matched && !self.alternates.is_empty() {
            matched = self.alternates.iter().any(|m| m.matches(name, &folded));
        }

        matched != self.invert
    }
}

fn fold_case(s: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.to_lowercase())
    }
}

fn build_regex(
    kind: &'static str,
    original: &str,
    source: &str,
    case_sensitive: bool,
) -> Result<Regex, FilterError> {
    RegexBuilder::new(source)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| FilterError::invalid(kind, original, e))
}

/// Translate a glob into an anchored regular expression.
///
/// `*` becomes `.*`, `?` becomes `.`, everything else is literal.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(spec: FilterSpec) -> NameFilter {
        spec.compile().unwrap()
    }

    #[test]
    fn test_wildcard_to_regex() {
        assert_eq!(wildcard_to_regex("S-1-5-21-*"), r"^S\-1\-5\-21\-.*$");
        assert_eq!(wildcard_to_regex("a?.b"), r"^a.\.b$");
    }

    #[test]
    fn test_wildcard_sid() {
        let filter = compile(FilterSpec::wildcard("S-1-5-21-*"));
        assert!(filter.is_match("S-1-5-21-999-888-777-1001"));
        assert!(!filter.is_match("S-1-5-18"));
    }

    #[test]
    fn test_text_modes_case_insensitive_by_default() {
        assert!(compile(FilterSpec::exact("software")).is_match("SOFTWARE"));
        assert!(compile(FilterSpec::contains("soft")).is_match("Microsoft"));
        assert!(compile(FilterSpec::starts_with("micro")).is_match("Microsoft"));
        assert!(compile(FilterSpec::ends_with("SOFT")).is_match("Microsoft"));
        assert!(!compile(FilterSpec::exact("soft")).is_match("Microsoft"));
    }

    #[test]
    fn test_case_sensitive() {
        let filter = compile(FilterSpec::exact("SOFTWARE").case_sensitive(true));
        assert!(filter.is_match("SOFTWARE"));
        assert!(!filter.is_match("software"));

        let filter = compile(FilterSpec::regex("^Classes$").case_sensitive(true));
        assert!(!filter.is_match("classes"));
    }

    #[test]
    fn test_none_mode_matches_everything_but_empty() {
        let filter = compile(FilterSpec::any());
        assert!(filter.is_match("anything"));
        assert!(!filter.is_match(""));
    }

    #[test]
    fn test_empty_name_never_matches_even_inverted() {
        let filter = compile(FilterSpec::exact("x").inverted());
        assert!(!filter.is_match(""));
        assert!(filter.is_match("y"));
    }

    #[test]
    fn test_exclude_is_a_veto() {
        let filter = compile(FilterSpec::any().excluding("^Classes$"));
        assert!(!filter.is_match("Classes"));
        assert!(filter.is_match("Policies"));

        // An exclusion returns the invert flag, not its negation.
        let filter = compile(FilterSpec::exact("Classes").excluding("^Classes$").inverted());
        assert!(filter.is_match("Classes"));
    }

    #[test]
    fn test_alternates_or_with_primary() {
        let filter = compile(
            FilterSpec::exact("Policies").with_alternates(["Classes", "CloudStore"]),
        );
        assert!(filter.is_match("Policies"));
        assert!(filter.is_match("classes"));
        assert!(filter.is_match("CloudStore"));
        assert!(!filter.is_match("Environment"));
    }

    #[test]
    fn test_alternates_use_primary_mode() {
        let filter = compile(FilterSpec::wildcard("S-1-5-21-*").or_pattern("S-1-5-1?"));
        assert!(filter.is_match("S-1-5-18"));
        assert!(!filter.is_match("S-1-5-20x"));
    }

    #[test]
    fn test_invert_after_alternates() {
        let filter = compile(FilterSpec::starts_with("S-1-5-2").or_pattern(".DEFAULT").inverted());
        assert!(!filter.is_match("S-1-5-21-1-2-3-500"));
        assert!(!filter.is_match(".default"));
        assert!(filter.is_match("Software"));
    }

    #[test]
    fn test_custom_mode() {
        let filter = compile(FilterSpec::custom(|name| name.chars().all(|c| c.is_ascii_digit())));
        assert!(filter.is_match("1001"));
        assert!(!filter.is_match("Policies"));
    }

    #[test]
    fn test_malformed_patterns_fail_at_compile() {
        assert!(FilterSpec::regex("(unclosed").compile().is_err());
        assert!(FilterSpec::any().excluding("[").compile().is_err());
        assert!(FilterSpec::regex("ok").or_pattern("(").compile().is_err());
    }

    #[test]
    fn test_empty_exclude_patterns_are_ignored() {
        let filter = compile(FilterSpec::any().excluding(""));
        assert!(filter.is_match("Classes"));
    }
}
