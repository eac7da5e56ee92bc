//! Temporary file management module
//!
//! This module provides RAII-based temporary file handling with automatic cleanup.

use std::fs::OpenOptions;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Guard for a temporary file that is deleted on drop
#[derive(Debug)]
pub(crate) struct TempGuard {
    path: PathBuf,
}

impl TempGuard {
    /// Get the path to the temporary file
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        // Silently ignore errors during cleanup
        let _ = std::fs::remove_file(&self.path);
    }
}

impl Deref for TempGuard {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        self.path()
    }
}

/// Creates a new empty file inside `dir` and returns a guard that removes it
///
/// The file name is `.<prefix>_<ULID>` so it is hidden and never collides with
/// an existing file. Creation fails if the directory is not writable.
///
/// # Examples
///
/// ```ignore
/// let scratch = create_temp_file_in(Path::new("/srv/tv"), "write_check")?;
/// // The file is deleted when scratch goes out of scope
/// ```
pub(crate) fn create_temp_file_in(dir: &Path, prefix: &str) -> io::Result<TempGuard> {
    let ulid = ulid::Ulid::new();
    let path = dir.join(format!(".{}_{}", prefix, ulid));

    OpenOptions::new().write(true).create_new(true).open(&path)?;

    Ok(TempGuard { path })
}
