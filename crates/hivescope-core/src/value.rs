//! Typed key values and value-read requests.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::store::StoreLocator;

/// A typed scalar value stored under a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyValue {
    /// `REG_SZ`.
    String(String),
    /// `REG_EXPAND_SZ`, unexpanded.
    ExpandString(String),
    /// `REG_MULTI_SZ`.
    MultiString(Vec<String>),
    /// `REG_DWORD`.
    Dword(u32),
    /// `REG_QWORD`.
    Qword(u64),
    /// `REG_BINARY`.
    Binary(Vec<u8>),
}

impl KeyValue {
    /// String payload, if this is a string-typed value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeyValue::String(s) | KeyValue::ExpandString(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::String(s) | KeyValue::ExpandString(s) => f.write_str(s),
            KeyValue::MultiString(items) => f.write_str(&items.join("; ")),
            KeyValue::Dword(v) => write!(f, "{v}"),
            KeyValue::Qword(v) => write!(f, "{v}"),
            KeyValue::Binary(bytes) => {
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// A request to read a set of named values from one key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueQuery {
    /// Key path below the hive root.
    pub path: String,

    /// Value names to read, in report order.
    pub value_names: Vec<String>,

    /// Report title (defaults to the path).
    #[serde(default)]
    pub title: Option<String>,

    /// Store to read from.
    #[serde(flatten)]
    pub locator: StoreLocator,
}

impl ValueQuery {
    /// Create a query against the default locator.
    pub fn new<I, S>(path: impl Into<String>, value_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            value_names: value_names.into_iter().map(Into::into).collect(),
            title: None,
            locator: StoreLocator::default(),
        }
    }

    /// Set the report title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the store locator.
    pub fn with_locator(mut self, locator: StoreLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Title shown in reports.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.path)
    }
}

/// Outcome of reading one value group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValueGroupOutcome {
    /// The key was opened; missing values are `None`.
    Read {
        entries: IndexMap<String, Option<KeyValue>>,
    },
    /// The key could not be opened.
    Failed { reason: String },
    /// The store failed while reading.
    Error { reason: String },
}

/// Values read for one [`ValueQuery`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueGroup {
    /// Report title.
    pub title: String,
    /// Key path that was read.
    pub path: String,
    /// What happened.
    pub outcome: ValueGroupOutcome,
}

impl ValueGroup {
    /// Whether the key was opened.
    pub fn is_read(&self) -> bool {
        matches!(self.outcome, ValueGroupOutcome::Read { .. })
    }
}
