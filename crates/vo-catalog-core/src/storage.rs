//! Local filesystem access for saved table folders.
//!
//! Everything that touches the disk goes through the helpers here so that the
//! rest of the crate deals in typed [`StorageError`]s instead of raw
//! `io::Error`s. The catalog is a plain local directory; reads are blocking
//! and sequential, matching the streaming walk in [`crate::catalog`].
//!
//! Writes use a write-then-rename sequence so a crash mid-save never leaves a
//! half-written `metadata.json` or `data.parquet` where a reader would pick
//! it up.

pub mod layout;

use std::{
    error::Error,
    fmt, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use snafu::{Backtrace, prelude::*};

/// General result type used by storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors produced by the storage backend implementation.
///
/// Only the local filesystem is supported; backend-specific I/O errors are
/// wrapped here so [`StorageError`] variants can add path context.
#[derive(Debug)]
pub enum BackendError {
    /// A local filesystem I/O error.
    Local(io::Error),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Local(e) => write!(f, "local I/O error: {e}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BackendError::Local(e) => Some(e),
        }
    }
}

/// Errors that can occur during storage operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    /// The specified path was not found.
    #[snafu(display("Path not found: {path}"))]
    NotFound {
        /// The path that was not found.
        path: String,
        /// Underlying backend error that caused the failure.
        source: BackendError,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// An I/O error occurred on the local filesystem.
    #[snafu(display("Local I/O error at {path}: {source}"))]
    OtherIo {
        /// The path where the I/O error occurred.
        path: String,
        /// Underlying backend I/O error with platform-specific details.
        source: BackendError,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },
}

impl StorageError {
    /// True when the error means "the file is simply not there".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

fn classify(path: &Path, e: io::Error) -> StorageError {
    let path = path.display().to_string();
    if e.kind() == io::ErrorKind::NotFound {
        StorageError::NotFound {
            path,
            source: BackendError::Local(e),
            backtrace: Backtrace::capture(),
        }
    } else {
        StorageError::OtherIo {
            path,
            source: BackendError::Local(e),
            backtrace: Backtrace::capture(),
        }
    }
}

/// Create `dir` and any missing parents.
pub fn create_dir_all(dir: &Path) -> StorageResult<()> {
    fs::create_dir_all(dir)
        .map_err(BackendError::Local)
        .context(OtherIoSnafu {
            path: dir.display().to_string(),
        })
}

/// Read the file at `path` into a `String`.
///
/// A missing file is reported as [`StorageError::NotFound`] so callers can
/// treat absence differently from corruption.
pub fn read_to_string(path: &Path) -> StorageResult<String> {
    fs::read_to_string(path).map_err(|e| classify(path, e))
}

/// Read the full contents of the file at `path`.
pub fn read_all_bytes(path: &Path) -> StorageResult<Vec<u8>> {
    fs::read(path).map_err(|e| classify(path, e))
}

/// Guard that removes a temporary file on drop unless disarmed.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            // Best-effort cleanup; we're likely already handling another error.
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Write `contents` to `path` atomically.
///
/// The payload goes to a sibling temporary file which is synced and then
/// renamed over `path`. Parent directories are created as needed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut guard = TempFileGuard::new(tmp_path.clone());

    {
        let mut file = fs::File::create(&tmp_path)
            .map_err(BackendError::Local)
            .context(OtherIoSnafu {
                path: tmp_path.display().to_string(),
            })?;

        file.write_all(contents)
            .map_err(BackendError::Local)
            .context(OtherIoSnafu {
                path: tmp_path.display().to_string(),
            })?;

        file.sync_all()
            .map_err(BackendError::Local)
            .context(OtherIoSnafu {
                path: tmp_path.display().to_string(),
            })?;
    }

    fs::rename(&tmp_path, path)
        .map_err(BackendError::Local)
        .context(OtherIoSnafu {
            path: path.display().to_string(),
        })?;

    guard.disarm();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_tmp() -> TestResult {
        let tmp = TempDir::new()?;
        let target = tmp.path().join("a/b/metadata.json");

        write_atomic(&target, b"{}")?;

        assert_eq!(read_to_string(&target)?, "{}");
        assert!(!target.with_extension("tmp").exists());
        Ok(())
    }

    #[test]
    fn write_atomic_replaces_existing_file() -> TestResult {
        let tmp = TempDir::new()?;
        let target = tmp.path().join("data.parquet");

        write_atomic(&target, b"first")?;
        write_atomic(&target, b"second")?;

        assert_eq!(read_all_bytes(&target)?, b"second");
        Ok(())
    }

    #[test]
    fn missing_file_is_not_found() -> TestResult {
        let tmp = TempDir::new()?;
        let err = read_to_string(&tmp.path().join("nope.json")).unwrap_err();
        assert!(err.is_not_found(), "unexpected error: {err:?}");

        let err = read_all_bytes(&tmp.path().join("nope.parquet")).unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }

    #[test]
    fn reading_a_directory_is_other_io() -> TestResult {
        let tmp = TempDir::new()?;
        let err = read_all_bytes(tmp.path()).unwrap_err();
        assert!(matches!(err, StorageError::OtherIo { .. }), "got {err:?}");
        Ok(())
    }
}
