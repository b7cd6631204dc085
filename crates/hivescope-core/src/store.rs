//! Store-access contract and location selectors.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::StoreError;
use crate::value::KeyValue;

/// Default path separator of registry-style stores.
pub const DEFAULT_SEPARATOR: char = '\\';

/// Top-level hive of a registry-style store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Hive {
    #[strum(to_string = "HKEY_CLASSES_ROOT", serialize = "HKCR")]
    #[serde(rename = "HKEY_CLASSES_ROOT", alias = "HKCR")]
    ClassesRoot,
    #[strum(to_string = "HKEY_CURRENT_USER", serialize = "HKCU")]
    #[serde(rename = "HKEY_CURRENT_USER", alias = "HKCU")]
    CurrentUser,
    #[default]
    #[strum(to_string = "HKEY_LOCAL_MACHINE", serialize = "HKLM")]
    #[serde(rename = "HKEY_LOCAL_MACHINE", alias = "HKLM")]
    LocalMachine,
    #[strum(to_string = "HKEY_USERS", serialize = "HKU")]
    #[serde(rename = "HKEY_USERS", alias = "HKU")]
    Users,
    #[strum(to_string = "HKEY_CURRENT_CONFIG", serialize = "HKCC")]
    #[serde(rename = "HKEY_CURRENT_CONFIG", alias = "HKCC")]
    CurrentConfig,
}

/// Registry view (WOW64 redirection) to open.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Default,
    Registry32,
    #[default]
    Registry64,
}

/// Identifies which physical store and view to open.
///
/// Opaque to the enumerator; only backends interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StoreLocator {
    /// Hive to open.
    #[serde(default)]
    pub hive: Hive,
    /// Registry view.
    #[serde(default)]
    pub view: View,
}

impl StoreLocator {
    /// Create a locator for a hive and view.
    pub fn new(hive: Hive, view: View) -> Self {
        Self { hive, view }
    }

    /// Locator for a hive in the default 64-bit view.
    pub fn hive(hive: Hive) -> Self {
        Self {
            hive,
            view: View::default(),
        }
    }
}

impl std::fmt::Display for StoreLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.hive, self.view)
    }
}

/// Read-only access to a hierarchical key store.
///
/// A key handle is closed by dropping it, so the enumerator only holds
/// handles for the keys on the current walk path.
pub trait KeyStore {
    /// Open key handle.
    type Key<'a>
    where
        Self: 'a;

    /// Open `path` below the root of the store selected by `locator`.
    ///
    /// An empty path opens the top level of the hive.
    fn open_root<'a>(&'a self, locator: &StoreLocator, path: &str) -> Result<Self::Key<'a>, StoreError>;

    /// Open an immediate child of `parent`.
    ///
    /// Returns `None` when the child is missing or access is denied.
    fn open_child<'a>(&'a self, parent: &Self::Key<'a>, name: &str) -> Option<Self::Key<'a>>;

    /// Names of the immediate children of `key`, in store order.
    fn child_names(&self, key: &Self::Key<'_>) -> Result<Vec<String>, StoreError>;

    /// Read a named value of `key`.
    fn value(&self, key: &Self::Key<'_>, name: &str) -> Option<KeyValue>;

    /// Separator used when joining key names into paths.
    fn separator(&self) -> char {
        DEFAULT_SEPARATOR
    }
}

/// Join a parent path and a child name with `separator`.
///
/// An empty parent yields the bare name.
pub fn join_path(parent: &str, name: &str, separator: char) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        let mut path = String::with_capacity(parent.len() + name.len() + 1);
        path.push_str(parent);
        path.push(separator);
        path.push_str(name);
        path
    }
}

/// Split a store path into its non-empty segments.
///
/// Both `\` and `/` are accepted as separators.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split(['\\', '/']).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hive_parse_aliases() {
        assert_eq!("HKEY_USERS".parse::<Hive>().unwrap(), Hive::Users);
        assert_eq!("hku".parse::<Hive>().unwrap(), Hive::Users);
        assert_eq!("HKLM".parse::<Hive>().unwrap(), Hive::LocalMachine);
        assert_eq!(Hive::CurrentUser.to_string(), "HKEY_CURRENT_USER");
    }

    #[test]
    fn test_view_parse() {
        assert_eq!("registry32".parse::<View>().unwrap(), View::Registry32);
        assert_eq!(View::Registry64.to_string(), "registry64");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "SOFTWARE", '\\'), "SOFTWARE");
        assert_eq!(join_path("SOFTWARE", "Microsoft", '\\'), r"SOFTWARE\Microsoft");
    }

    #[test]
    fn test_split_path() {
        let parts: Vec<_> = split_path(r"SOFTWARE\\Microsoft/Windows\").collect();
        assert_eq!(parts, vec!["SOFTWARE", "Microsoft", "Windows"]);
        assert_eq!(split_path("").count(), 0);
    }
}
