//! Writing rendered reports to disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use thiserror::Error;
use tracing::info;

/// Errors raised while writing reports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The report or its directory could not be written.
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

const FILE_STAMP: &str = "%Y-%m-%d_%H%M%S";

/// Resolves report paths below an output directory and writes reports.
#[derive(Debug, Clone)]
pub struct ReportSink {
    output_dir: PathBuf,
}

impl ReportSink {
    /// Create a sink writing below `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory relative paths are resolved against.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Resolve a suggested report path and create its parent directories.
    ///
    /// An empty suggestion becomes `{timestamp}_log.txt`, a leading `@/` or
    /// `@\` is dropped, and a path without an extension gets `.txt`.
    pub fn resolve(&self, suggested: &str) -> Result<PathBuf, ExportError> {
        self.resolve_at(suggested, Local::now().naive_local())
    }

    /// [`resolve`](Self::resolve) with an explicit clock.
    pub fn resolve_at(&self, suggested: &str, now: NaiveDateTime) -> Result<PathBuf, ExportError> {
        let suggested = suggested.trim();
        let name = if suggested.is_empty() {
            format!("{}_log.txt", now.format(FILE_STAMP))
        } else {
            suggested
                .strip_prefix("@/")
                .or_else(|| suggested.strip_prefix("@\\"))
                .unwrap_or(suggested)
                .to_string()
        };

        let mut path = PathBuf::from(name);
        if path.is_relative() {
            path = self.output_dir.join(path);
        }
        if path.extension().is_none() {
            path.set_extension("txt");
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
        }
        Ok(path)
    }

    /// `{base}_{yyyy-MM-dd_HHmmss}.txt` for the current time.
    pub fn export_name(base: &str) -> String {
        Self::export_name_at(base, Local::now().naive_local())
    }

    /// [`export_name`](Self::export_name) with an explicit clock.
    pub fn export_name_at(base: &str, now: NaiveDateTime) -> String {
        format!("{base}_{}.txt", now.format(FILE_STAMP))
    }

    /// Write `text` as UTF-8 to the resolved path and return that path.
    pub fn write(&self, suggested: &str, text: &str) -> Result<PathBuf, ExportError> {
        let path = self.resolve(suggested)?;
        fs::write(&path, text).map_err(|e| ExportError::io(&path, e))?;
        info!(path = %path.display(), bytes = text.len(), "report written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 2)
            .unwrap()
            .and_hms_opt(13, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_export_name() {
        assert_eq!(
            ReportSink::export_name_at("registry_enumerate", at()),
            "registry_enumerate_2024-11-02_130405.txt"
        );
    }

    #[test]
    fn test_resolve_rules() {
        let dir = TempDir::new().unwrap();
        let sink = ReportSink::new(dir.path());

        assert_eq!(
            sink.resolve_at("", at()).unwrap(),
            dir.path().join("2024-11-02_130405_log.txt")
        );
        assert_eq!(sink.resolve_at("@/reports/tree", at()).unwrap(), dir.path().join("reports/tree.txt"));
        assert_eq!(sink.resolve_at("out.log", at()).unwrap(), dir.path().join("out.log"));
        assert!(dir.path().join("reports").is_dir());

        let absolute = dir.path().join("abs").join("x.txt");
        assert_eq!(sink.resolve_at(absolute.to_str().unwrap(), at()).unwrap(), absolute);
    }
}
