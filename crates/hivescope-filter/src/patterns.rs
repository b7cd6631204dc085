//! Common key-name patterns.
//!
//! The `regex` crate has no look-around, so the "exclude" helpers return
//! positive patterns meant for [`FilterSpec::exclude_patterns`](crate::FilterSpec).

/// Per-user account identifier under `HKEY_USERS`.
pub const USER_SID: &str = r"^S-1-5-21-\d+-\d+-\d+-\d+$";

/// Top-level `HKEY_USERS` entries that are not user profiles.
pub const SYSTEM_KEYS: &str = r"^(Classes|CloudStore|Policies|\.DEFAULT|S-1-5-18|S-1-5-19|S-1-5-20)";

/// Per-user class registration hives (`{sid}_Classes`).
pub const CLASSES_SUFFIX: &str = r"_Classes$";

/// The default profile hive.
pub const DEFAULT_SUFFIX: &str = r"\.DEFAULT$";

/// Names starting with any of `items`.
pub fn exclude_items<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("^({})", alternation(items))
}

/// Names starting with any of `prefixes`, as a full-name match.
pub fn match_start<I, S>(prefixes: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("^({}).*", alternation(prefixes))
}

/// Names ending with any of `suffixes`.
pub fn exclude_suffix<I, S>(suffixes: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    format!("({})$", alternation(suffixes))
}

fn alternation<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FilterSpec, NameMatch};

    #[test]
    fn test_builders() {
        assert_eq!(exclude_items(["Classes", "Policies"]), "^(Classes|Policies)");
        assert_eq!(match_start(["S-1-5-21"]), "^(S-1-5-21).*");
        assert_eq!(exclude_suffix(["_Classes"]), "(_Classes)$");
    }

    #[test]
    fn test_system_keys_excluded() {
        let filter = FilterSpec::any().excluding(SYSTEM_KEYS).compile().unwrap();
        assert!(!filter.is_match("Classes"));
        assert!(!filter.is_match(".DEFAULT"));
        assert!(!filter.is_match("S-1-5-19"));
        assert!(filter.is_match("S-1-5-21-1-2-3-1001"));
    }

    #[test]
    fn test_excluding_helpers() {
        let filter = FilterSpec::excluding_items(["Classes", "CloudStore"]).compile().unwrap();
        assert!(!filter.is_match("CloudStore"));
        assert!(filter.is_match("Environment"));

        let filter = FilterSpec::excluding_suffixes(["_Classes"]).compile().unwrap();
        assert!(!filter.is_match("S-1-5-21-1-2-3-1001_Classes"));
        assert!(filter.is_match("S-1-5-21-1-2-3-1001"));
    }

    #[test]
    fn test_user_sid_pattern() {
        let filter = FilterSpec::regex(USER_SID).compile().unwrap();
        assert!(filter.is_match("S-1-5-21-3623811015-3361044348-30300820-1013"));
        assert!(!filter.is_match("S-1-5-21-3623811015-3361044348-30300820-1013_Classes"));
        assert!(!filter.is_match("S-1-5-18"));
    }
}
