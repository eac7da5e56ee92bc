//! Run configuration
//!
//! Holds the validated download directory. Validation happens once, before
//! any show is processed.

use crate::temp::create_temp_file_in;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while validating the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The download path does not exist
    #[error("Download path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// The download path is not a directory
    #[error("Download path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The download path cannot be written to
    #[error("Download path is not writable: {path}: {source}")]
    NotWritable { path: PathBuf, source: io::Error },
}

/// A download directory that existed and was writable when validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPath(PathBuf);

impl DownloadPath {
    /// Checks that `path` is an existing, writable directory
    ///
    /// Writability is tested by creating and removing a hidden scratch file,
    /// which also covers ACLs and read-only mounts.
    pub fn validate(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();

        if !path.exists() {
            return Err(ConfigError::PathNotFound(path));
        }
        if !path.is_dir() {
            return Err(ConfigError::NotADirectory(path));
        }

        create_temp_file_in(&path, "episode_courier_write_check")
            .map_err(|source| ConfigError::NotWritable {
                path: path.clone(),
                source,
            })?;

        Ok(Self(path))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl Deref for DownloadPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
