//! Enumeration configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::store::StoreLocator;

/// Options controlling how far and what an enumeration walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct EnumerationOptions {
    /// Descend below the direct children of the root.
    #[builder(default = "false")]
    #[serde(default)]
    pub recursive: bool,

    /// Deepest depth to emit when recursive (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Keep keys without children.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_empty: bool,
}

fn default_true() -> bool {
    true
}

impl EnumerationOptions {
    /// Create a new options builder.
    pub fn builder() -> EnumerationOptionsBuilder {
        EnumerationOptionsBuilder::default()
    }

    /// Recursive options with an optional depth limit.
    pub fn recursive(max_depth: Option<u32>) -> Self {
        Self {
            recursive: true,
            max_depth,
            include_empty: true,
        }
    }

    /// Set the depth limit using the `-1 = unlimited` convention.
    pub fn with_signed_max_depth(mut self, max_depth: i64) -> Self {
        self.max_depth = u32::try_from(max_depth).ok();
        self
    }

    /// Whether children of a key at `depth` should be walked.
    pub fn descends_from(&self, depth: u32) -> bool {
        self.recursive && self.max_depth.is_none_or(|max| depth + 1 <= max)
    }
}

impl Default for EnumerationOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            max_depth: None,
            include_empty: true,
        }
    }
}

/// A complete enumeration request.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EnumerateConfig {
    /// Path below the hive root ("" = top level).
    pub root_path: String,

    /// Report title.
    #[builder(default)]
    #[serde(default)]
    pub title: Option<String>,

    /// Store to open.
    #[builder(default)]
    #[serde(default)]
    pub locator: StoreLocator,

    /// Walk options.
    #[builder(default)]
    #[serde(default)]
    pub options: EnumerationOptions,
}

impl EnumerateConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.root_path {
            None => Err("Root path is required".to_string()),
            Some(path) if path.contains('\0') => Err("Root path cannot contain NUL".to_string()),
            Some(_) => Ok(()),
        }
    }
}

impl EnumerateConfig {
    /// Create a new config builder.
    pub fn builder() -> EnumerateConfigBuilder {
        EnumerateConfigBuilder::default()
    }

    /// Non-recursive enumeration of `root_path` in the default store.
    pub fn new(root_path: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            title: None,
            locator: StoreLocator::default(),
            options: EnumerationOptions::default(),
        }
    }

    /// Title shown in reports.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) => title,
            None if self.root_path.is_empty() => "Registry Enumerate Export",
            None => &self.root_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Hive;

    #[test]
    fn test_options_builder() {
        let options = EnumerationOptions::builder()
            .recursive(true)
            .max_depth(3u32)
            .include_empty(false)
            .build()
            .unwrap();

        assert!(options.recursive);
        assert_eq!(options.max_depth, Some(3));
        assert!(!options.include_empty);
    }

    #[test]
    fn test_options_defaults() {
        let options = EnumerationOptions::default();
        assert!(!options.recursive);
        assert_eq!(options.max_depth, None);
        assert!(options.include_empty);
    }

    #[test]
    fn test_signed_max_depth() {
        let options = EnumerationOptions::recursive(Some(2)).with_signed_max_depth(-1);
        assert_eq!(options.max_depth, None);
        let options = options.with_signed_max_depth(0);
        assert_eq!(options.max_depth, Some(0));
    }

    #[test]
    fn test_descends_from() {
        assert!(!EnumerationOptions::default().descends_from(0));
        assert!(EnumerationOptions::recursive(None).descends_from(40));

        let limited = EnumerationOptions::recursive(Some(1));
        assert!(limited.descends_from(0));
        assert!(!limited.descends_from(1));

        assert!(!EnumerationOptions::recursive(Some(0)).descends_from(0));
    }

    #[test]
    fn test_config_builder() {
        let config = EnumerateConfig::builder()
            .root_path("")
            .title("USERS tree".to_string())
            .locator(StoreLocator::hive(Hive::Users))
            .options(EnumerationOptions::recursive(Some(3)))
            .build()
            .unwrap();

        assert_eq!(config.locator.hive, Hive::Users);
        assert_eq!(config.display_title(), "USERS tree");
    }

    #[test]
    fn test_config_requires_root_path() {
        assert!(EnumerateConfig::builder().build().is_err());
    }

    #[test]
    fn test_config_rejects_nul_in_path() {
        let result = EnumerateConfig::builder().root_path("SOFT\0WARE").build();
        assert!(result.is_err());
    }
}
