//! Persistent build counter.
//!
//! The counter lives in a plain text file holding a single decimal number
//! with no trailing newline. There is no locking: two builds running at once
//! against the same file can lose an update.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Error type for build number operations.
#[derive(Debug, thiserror::Error)]
pub enum BuildNumberError {
    /// The counter file exists but could not be read.
    #[error("Error opening input file {}", path.display())]
    Read {
        /// Counter file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The counter file does not contain an unsigned integer.
    #[error("Invalid build number {content:?} in {}", path.display())]
    Parse {
        /// Counter file path.
        path: PathBuf,
        /// The offending file content.
        content: String,
    },
    /// Incrementing would exceed the counter range.
    #[error("Build number in {} cannot be incremented past {}", path.display(), u64::MAX)]
    Overflow {
        /// Counter file path.
        path: PathBuf,
    },
    /// The counter file could not be written.
    #[error("Error opening output file {}", path.display())]
    Write {
        /// Counter file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A build counter stored in a single file.
#[derive(Debug, Clone)]
pub struct BuildNumberStore {
    path: PathBuf,
}

impl BuildNumberStore {
    /// Create a store backed by `path`. Nothing is read until asked.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the counter file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored value without side effects.
    ///
    /// Returns `None` when the file does not exist.
    pub fn current(&self) -> Result<Option<u64>, BuildNumberError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(BuildNumberError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        content
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| BuildNumberError::Parse {
                path: self.path.clone(),
                content,
            })
    }

    /// Get the build number for this build.
    ///
    /// With `increment` the stored value (0 when the file is missing) is
    /// bumped, written back and returned. Without it the stored value is
    /// returned untouched, except that a missing file yields 1 and stays
    /// missing.
    pub fn next(&self, increment: bool) -> Result<u64, BuildNumberError> {
        let stored = self.current()?;

        if !increment {
            let number = stored.unwrap_or(1);
            debug!(path = %self.path.display(), number, "using build number without increment");
            return Ok(number);
        }

        let number = stored
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| BuildNumberError::Overflow {
                path: self.path.clone(),
            })?;

        fs::write(&self.path, number.to_string()).map_err(|source| BuildNumberError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), number, "stored incremented build number");

        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> BuildNumberStore {
        BuildNumberStore::new(temp.path().join("build_number"))
    }

    #[test]
    fn test_missing_file_without_increment_returns_one() {
        // Long-standing behaviour: a first build that does not count still
        // reports 1, and nothing is persisted.
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        assert_eq!(store.next(false).unwrap(), 1);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_missing_file_with_increment_creates_one() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        assert_eq!(store.next(true).unwrap(), 1);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "1");
    }

    #[test]
    fn test_increment_is_monotonic() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        let mut previous = store.next(true).unwrap();
        for _ in 0..5 {
            let next = store.next(true).unwrap();
            assert_eq!(next, previous + 1);
            previous = next;
        }
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "6");
    }

    #[test]
    fn test_without_increment_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        fs::write(store.path(), "41").unwrap();

        assert_eq!(store.next(false).unwrap(), 41);
        assert_eq!(fs::read(store.path()).unwrap(), b"41");
    }

    #[test]
    fn test_increment_rewrites_without_newline() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        fs::write(store.path(), "99\n").unwrap();

        assert_eq!(store.next(true).unwrap(), 100);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "100");
    }

    #[test]
    fn test_non_numeric_content_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        fs::write(store.path(), "twelve").unwrap();

        let err = store.next(true).unwrap_err();
        assert!(matches!(err, BuildNumberError::Parse { .. }));
        assert!(err.to_string().contains("twelve"));
        // Failed parse must not clobber the file
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "twelve");
    }

    #[test]
    fn test_empty_and_negative_content_rejected() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        fs::write(store.path(), "").unwrap();
        assert!(matches!(
            store.next(false),
            Err(BuildNumberError::Parse { .. })
        ));

        fs::write(store.path(), "-3").unwrap();
        assert!(matches!(
            store.next(false),
            Err(BuildNumberError::Parse { .. })
        ));
    }

    #[test]
    fn test_overflow_is_reported() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        fs::write(store.path(), u64::MAX.to_string()).unwrap();

        assert!(matches!(
            store.next(true),
            Err(BuildNumberError::Overflow { .. })
        ));
    }

    #[test]
    fn test_write_failure_names_path() {
        let temp = TempDir::new().unwrap();
        let store = BuildNumberStore::new(temp.path().join("missing_dir/build_number"));

        let err = store.next(true).unwrap_err();
        assert!(matches!(err, BuildNumberError::Write { .. }));
        assert!(err.to_string().contains("missing_dir"));
    }

    #[test]
    fn test_current_reports_absence() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);
        assert_eq!(store.current().unwrap(), None);

        fs::write(store.path(), "7").unwrap();
        assert_eq!(store.current().unwrap(), Some(7));
    }
}
