//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hivescope_core::ValueQuery;
use hivescope_filter::FilterSpec;

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory relative report paths resolve against.
    pub output_dir: PathBuf,

    /// Directory holding `registry.log`.
    pub log_dir: PathBuf,

    /// Groups read by the `values` command.
    pub value_groups: Vec<ValueQuery>,

    /// Filter applied by `tree` when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_filter: Option<FilterSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hivescope");

        Self {
            output_dir: data_dir.join("reports"),
            log_dir: data_dir.join("logs"),
            value_groups: default_value_groups(),
            tree_filter: None,
        }
    }
}

impl AppConfig {
    /// Default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hivescope").join("config.toml"))
    }

    /// Load from `explicit`, or from the default location when present.
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Built-in value groups.
pub fn default_value_groups() -> Vec<ValueQuery> {
    vec![
        ValueQuery::new(
            r"SOFTWARE\Microsoft\Windows\CurrentVersion\Policies\System",
            [
                "EnableLUA",
                "ConsentPromptBehaviorAdmin",
                "ConsentPromptBehaviorUser",
                "PromptOnSecureDesktop",
            ],
        )
        .with_title("UAC Settings"),
        ValueQuery::new(
            r"SOFTWARE\Microsoft\Windows NT\CurrentVersion",
            [
                "ProductName",
                "CurrentBuild",
                "DisplayVersion",
                "RegisteredOwner",
                "ReleaseId",
                "BuildLabEx",
            ],
        )
        .with_title("Windows Version Info"),
        ValueQuery::new(
            r"SYSTEM\CurrentControlSet\Control\TimeZoneInformation",
            ["TimeZoneKeyName", "Bias"],
        )
        .with_title("Time Zone Info"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use hivescope_core::Hive;
    use hivescope_filter::FilterMode;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        let titles: Vec<_> = config.value_groups.iter().map(|g| g.display_title()).collect();
        assert_eq!(titles, vec!["UAC Settings", "Windows Version Info", "Time Zone Info"]);
        assert!(config.output_dir.ends_with("reports"));
        assert!(config.tree_filter.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(r#"output_dir = "/tmp/reports""#).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(config.value_groups.len(), 3);
    }

    #[test]
    fn test_groups_and_filter() {
        let text = r#"
            [tree_filter]
            mode = "wildcard"
            pattern = "S-1-5-21-*"
            exclude_patterns = ["_Classes$"]

            [[value_groups]]
            title = "Shell"
            path = 'SOFTWARE\Microsoft\Windows\CurrentVersion\Explorer'
            value_names = ["ShellState"]
            hive = "HKCU"
        "#;
        let config: AppConfig = toml::from_str(text).unwrap();

        let group = &config.value_groups[0];
        assert_eq!(group.display_title(), "Shell");
        assert_eq!(group.locator.hive, Hive::CurrentUser);

        let filter = config.tree_filter.unwrap();
        assert!(matches!(filter.mode, FilterMode::Wildcard { .. }));
        assert_eq!(filter.exclude_patterns, vec!["_Classes$"]);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(AppConfig::load(Some(&missing)), Err(ConfigError::Read { .. })));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "value_groups = 3").unwrap();
        assert!(matches!(AppConfig::from_file(&bad), Err(ConfigError::Parse { .. })));
    }
}
