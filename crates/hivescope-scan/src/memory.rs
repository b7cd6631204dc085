//! In-memory key store, loadable from JSON snapshots.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use hivescope_core::{Hive, KeyStore, KeyValue, StoreError, StoreLocator, join_path, split_path};

/// One key of a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryKey {
    /// Named values, in insertion order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub values: IndexMap<String, KeyValue>,

    /// Child keys, in store order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub keys: IndexMap<String, MemoryKey>,

    /// Opening this key is refused.
    #[serde(default, skip_serializing_if = "is_false")]
    pub denied: bool,

    /// Listing this key's children fails with a backend error.
    #[serde(default, skip_serializing_if = "is_false")]
    pub corrupt: bool,

    /// Opening succeeds but listing children is refused.
    #[serde(default, skip_serializing_if = "is_false")]
    pub unlistable: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl MemoryKey {
    /// Create an empty key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child key.
    pub fn with_key(mut self, name: impl Into<String>, key: MemoryKey) -> Self {
        self.keys.insert(name.into(), key);
        self
    }

    /// Add an empty child key.
    pub fn with_empty(self, name: impl Into<String>) -> Self {
        self.with_key(name, MemoryKey::new())
    }

    /// Add a value.
    pub fn with_value(mut self, name: impl Into<String>, value: KeyValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Mark the key as access-denied.
    pub fn denied(mut self) -> Self {
        self.denied = true;
        self
    }

    /// Mark the key as unreadable.
    pub fn corrupt(mut self) -> Self {
        self.corrupt = true;
        self
    }

    /// Allow opening but refuse listing.
    pub fn unlistable(mut self) -> Self {
        self.unlistable = true;
        self
    }

    /// Child by name, ignoring ASCII case when there is no exact match.
    pub fn child(&self, name: &str) -> Option<&MemoryKey> {
        self.keys.get(name).or_else(|| {
            self.keys
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
    }

    /// Value by name, ignoring ASCII case when there is no exact match.
    pub fn value(&self, name: &str) -> Option<&KeyValue> {
        self.values.get(name).or_else(|| {
            self.values
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
    }

    /// Get or create the key at `path` below this one.
    pub fn ensure_path(&mut self, path: &str) -> &mut MemoryKey {
        let mut key = self;
        for segment in split_path(path) {
            key = key.keys.entry(segment.to_string()).or_default();
        }
        key
    }
}

/// Open handle into a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryHandle<'a> {
    key: &'a MemoryKey,
    path: String,
}

impl<'a> MemoryHandle<'a> {
    /// Path of the opened key, hive name first.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The underlying key.
    pub fn key(&self) -> &'a MemoryKey {
        self.key
    }
}

/// A key store held entirely in memory.
///
/// Views are not modeled; every view of a hive sees the same tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    /// Hive roots.
    #[serde(default)]
    pub hives: IndexMap<Hive, MemoryKey>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a hive.
    pub fn with_hive(mut self, hive: Hive, root: MemoryKey) -> Self {
        self.hives.insert(hive, root);
        self
    }

    /// Mutable root of `hive`, created if missing.
    pub fn hive_mut(&mut self, hive: Hive) -> &mut MemoryKey {
        self.hives.entry(hive).or_default()
    }

    /// Parse a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError::backend("<snapshot>", e.to_string()))
    }

    /// Load a JSON snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| StoreError::io(&display, e))?;
        serde_json::from_str(&json).map_err(|e| StoreError::backend(display, e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::backend("<snapshot>", e.to_string()))
    }
}

impl KeyStore for MemoryStore {
    type Key<'a>
        = MemoryHandle<'a>
    where
        Self: 'a;

    fn open_root<'a>(&'a self, locator: &StoreLocator, path: &str) -> Result<Self::Key<'a>, StoreError> {
        let hive_name = locator.hive.to_string();
        let mut key = self.hives.get(&locator.hive).ok_or_else(|| StoreError::NotFound {
            path: hive_name.clone(),
        })?;
        let mut current = hive_name;

        if key.denied {
            return Err(StoreError::AccessDenied { path: current });
        }

        for segment in split_path(path) {
            current = join_path(&current, segment, self.separator());
            key = match key.child(segment) {
                Some(child) if child.denied => return Err(StoreError::AccessDenied { path: current }),
                Some(child) => child,
                None => return Err(StoreError::NotFound { path: current }),
            };
        }

        Ok(MemoryHandle { key, path: current })
    }

    fn open_child<'a>(&'a self, parent: &Self::Key<'a>, name: &str) -> Option<Self::Key<'a>> {
        let key = parent.key.child(name).filter(|k| !k.denied)?;
        Some(MemoryHandle {
            key,
            path: join_path(&parent.path, name, self.separator()),
        })
    }

    fn child_names(&self, key: &Self::Key<'_>) -> Result<Vec<String>, StoreError> {
        if key.key.corrupt {
            return Err(StoreError::backend(&key.path, "key data is corrupt"));
        }
        if key.key.unlistable {
            return Err(StoreError::AccessDenied { path: key.path.clone() });
        }
        Ok(key.key.keys.keys().cloned().collect())
    }

    fn value(&self, key: &Self::Key<'_>, name: &str) -> Option<KeyValue> {
        key.key.value(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new().with_hive(
            Hive::LocalMachine,
            MemoryKey::new().with_key(
                "SOFTWARE",
                MemoryKey::new()
                    .with_key("Microsoft", MemoryKey::new().with_value("Version", KeyValue::Dword(10)))
                    .with_key("Locked", MemoryKey::new().denied()),
            ),
        )
    }

    #[test]
    fn test_open_root_paths() {
        let store = store();
        let locator = StoreLocator::default();

        let key = store.open_root(&locator, r"software\MICROSOFT").unwrap();
        assert_eq!(key.path(), r"HKEY_LOCAL_MACHINE\software\MICROSOFT");
        assert_eq!(store.value(&key, "version"), Some(KeyValue::Dword(10)));

        let top = store.open_root(&locator, "").unwrap();
        assert_eq!(store.child_names(&top).unwrap(), vec!["SOFTWARE"]);
    }

    #[test]
    fn test_open_root_errors() {
        let store = store();
        let locator = StoreLocator::default();

        assert!(matches!(
            store.open_root(&locator, r"SOFTWARE\Missing"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.open_root(&locator, r"SOFTWARE\Locked"),
            Err(StoreError::AccessDenied { .. })
        ));
        assert!(matches!(
            store.open_root(&StoreLocator::hive(Hive::Users), ""),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_open_child_skips_denied() {
        let store = store();
        let software = store.open_root(&StoreLocator::default(), "SOFTWARE").unwrap();
        assert!(store.open_child(&software, "Microsoft").is_some());
        assert!(store.open_child(&software, "Locked").is_none());
        assert!(store.open_child(&software, "Nope").is_none());
    }

    #[test]
    fn test_ensure_path() {
        let mut store = MemoryStore::new();
        store
            .hive_mut(Hive::Users)
            .ensure_path(r"S-1-5-21-1-2-3-1001\SOFTWARE\Vendor")
            .values
            .insert("Installed".into(), KeyValue::Dword(1));

        let key = store
            .open_root(&StoreLocator::hive(Hive::Users), r"S-1-5-21-1-2-3-1001\SOFTWARE\Vendor")
            .unwrap();
        assert_eq!(store.value(&key, "Installed"), Some(KeyValue::Dword(1)));
    }

    #[test]
    fn test_json_snapshot() {
        let json = r#"{
            "hives": {
                "HKU": {
                    "keys": {
                        ".DEFAULT": {},
                        "S-1-5-18": { "denied": true }
                    }
                }
            }
        }"#;
        let store = MemoryStore::from_json(json).unwrap();
        let users = store.open_root(&StoreLocator::hive(Hive::Users), "").unwrap();
        assert_eq!(store.child_names(&users).unwrap(), vec![".DEFAULT", "S-1-5-18"]);

        let round_trip = MemoryStore::from_json(&store.to_json().unwrap()).unwrap();
        assert_eq!(round_trip, store);
    }
}
