//! Error types for store access and enumeration.

use thiserror::Error;

/// Errors reported by a [`KeyStore`](crate::KeyStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key does not exist.
    #[error("Key not found: {path}")]
    NotFound { path: String },

    /// Access to the key was denied.
    #[error("Access denied: {path}")]
    AccessDenied { path: String },

    /// I/O error while reading a file-backed store.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Any other backend failure.
    #[error("Store error at {path}: {message}")]
    Backend { path: String, message: String },
}

impl StoreError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create a backend error.
    pub fn backend(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the walk may silently skip past this error.
    ///
    /// Missing and inaccessible keys are expected at node granularity.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::AccessDenied { .. })
    }

    /// Path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path }
            | Self::AccessDenied { path }
            | Self::Io { path, .. }
            | Self::Backend { path, .. } => path,
        }
    }
}

/// Errors that abort a single enumeration.
#[derive(Debug, Error)]
pub enum EnumerateError {
    /// The root path could not be opened.
    #[error("Unable to open registry path: {path} ({source})")]
    RootUnavailable {
        path: String,
        #[source]
        source: StoreError,
    },

    /// The store failed in a way that cannot be skipped.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_io() {
        let err = StoreError::io(
            r"SOFTWARE\Locked",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, StoreError::AccessDenied { .. }));
        assert!(err.is_skippable());

        let err = StoreError::io(
            "SOFTWARE",
            std::io::Error::new(std::io::ErrorKind::InvalidData, "corrupt"),
        );
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!err.is_skippable());
        assert_eq!(err.path(), "SOFTWARE");
    }

    #[test]
    fn test_root_unavailable_message() {
        let err = EnumerateError::RootUnavailable {
            path: r"SOFTWARE\Missing".to_string(),
            source: StoreError::NotFound {
                path: r"SOFTWARE\Missing".to_string(),
            },
        };
        assert!(err.to_string().starts_with(r"Unable to open registry path: SOFTWARE\Missing"));
    }
}
