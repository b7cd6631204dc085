//! Key store backed by a directory tree.
//!
//! Layout: `<root>/<HIVE NAME>/<key>/<key>/...`. Directories are keys and
//! regular files are string values whose contents are the value data.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::trace;

use hivescope_core::{KeyStore, KeyValue, StoreError, StoreLocator, split_path};

/// A read-only key store over a directory tree.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

/// Open handle into a [`DirectoryStore`].
#[derive(Debug, Clone)]
pub struct DirectoryKey {
    path: PathBuf,
}

impl DirectoryKey {
    /// Directory backing this key.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DirectoryStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Whether `name` names an entry directly inside its parent directory.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl KeyStore for DirectoryStore {
    type Key<'a>
        = DirectoryKey
    where
        Self: 'a;

    fn open_root<'a>(&'a self, locator: &StoreLocator, path: &str) -> Result<Self::Key<'a>, StoreError> {
        let mut dir = self.root.join(locator.hive.to_string());
        for segment in split_path(path) {
            if !is_plain_name(segment) {
                return Err(StoreError::NotFound { path: display(&dir.join(segment)) });
            }
            dir.push(segment);
        }

        let metadata = fs::metadata(&dir).map_err(|e| StoreError::io(display(&dir), e))?;
        if !metadata.is_dir() {
            return Err(StoreError::NotFound { path: display(&dir) });
        }
        Ok(DirectoryKey { path: dir })
    }

    fn open_child<'a>(&'a self, parent: &Self::Key<'a>, name: &str) -> Option<Self::Key<'a>> {
        if !is_plain_name(name) {
            return None;
        }
        let path = parent.path.join(name);
        match fs::metadata(&path) {
            Ok(m) if m.is_dir() => Some(DirectoryKey { path }),
            Ok(_) => None,
            Err(err) => {
                trace!(path = %path.display(), error = %err, "cannot open key directory");
                None
            }
        }
    }

    fn child_names(&self, key: &Self::Key<'_>) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&key.path).map_err(|e| StoreError::io(display(&key.path), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(display(&key.path), e))?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        // read_dir order is platform-defined
        names.sort();
        Ok(names)
    }

    fn value(&self, key: &Self::Key<'_>, name: &str) -> Option<KeyValue> {
        if !is_plain_name(name) {
            return None;
        }
        let path = key.path.join(name);
        if !path.is_file() {
            return None;
        }
        let data = fs::read_to_string(&path).ok()?;
        Some(KeyValue::String(data.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hivescope_core::Hive;
    use tempfile::TempDir;

    fn layout() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("HKEY_LOCAL_MACHINE").join("SOFTWARE");
        fs::create_dir_all(base.join("Zeta")).unwrap();
        fs::create_dir_all(base.join("Alpha").join("Inner")).unwrap();
        fs::write(base.join("Alpha").join("Version"), "1.2.3\n").unwrap();
        dir
    }

    #[test]
    fn test_children_sorted_and_files_skipped() {
        let dir = layout();
        let store = DirectoryStore::new(dir.path());
        let key = store.open_root(&StoreLocator::default(), "SOFTWARE").unwrap();
        assert_eq!(store.child_names(&key).unwrap(), vec!["Alpha", "Zeta"]);

        let alpha = store.open_child(&key, "Alpha").unwrap();
        assert_eq!(store.child_names(&alpha).unwrap(), vec!["Inner"]);
        assert_eq!(store.value(&alpha, "Version"), Some(KeyValue::String("1.2.3".into())));
        assert!(store.open_child(&alpha, "Version").is_none());
        assert!(store.value(&alpha, "Missing").is_none());
    }

    #[test]
    fn test_missing_root() {
        let dir = layout();
        let store = DirectoryStore::new(dir.path());
        assert!(matches!(
            store.open_root(&StoreLocator::hive(Hive::Users), ""),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.open_root(&StoreLocator::default(), r"SOFTWARE\Alpha\Version"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_relative_segments_stay_inside_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("store");
        fs::create_dir_all(root.join("HKEY_LOCAL_MACHINE").join("SOFTWARE")).unwrap();
        fs::create_dir_all(dir.path().join("Outside")).unwrap();
        fs::write(dir.path().join("secret"), "x").unwrap();

        let store = DirectoryStore::new(&root);
        let locator = StoreLocator::default();
        for path in [r"..\..\Outside", r"SOFTWARE\..\..\..\Outside", r".\SOFTWARE"] {
            assert!(
                matches!(store.open_root(&locator, path), Err(StoreError::NotFound { .. })),
                "{path}"
            );
        }

        let key = store.open_root(&locator, "SOFTWARE").unwrap();
        assert!(store.open_child(&key, "..").is_none());
        assert!(store.value(&key, "../../../secret").is_none());
    }
}
