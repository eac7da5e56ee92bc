//! Local library scanner
//!
//! This module walks the download directory tree to find out whether an
//! episode is already on disk. Files are matched by their full path only;
//! no file is ever opened.

use crate::episode_matcher::EpisodePattern;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that can occur while scanning the library
#[derive(Debug, Error)]
pub enum LibraryScanError {
    /// Path is not a directory
    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to read a directory or one of its entries
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectoryFailed { path: PathBuf, source: io::Error },
}

impl From<walkdir::Error> for LibraryScanError {
    fn from(error: walkdir::Error) -> Self {
        let path = error
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let source = error
            .into_io_error()
            .unwrap_or_else(|| io::Error::other("filesystem loop detected"));

        LibraryScanError::ReadDirectoryFailed { path, source }
    }
}

/// Finds every file below `download_path` whose path matches `pattern`
///
/// The directory tree is walked recursively and symbolic links are followed,
/// so a link pointing at a video file counts like the file itself. An
/// unreadable directory or a link loop anywhere in the tree aborts the scan
/// with an error.
///
/// # Arguments
///
/// * `download_path` - The root of the download directory tree
/// * `pattern` - The pattern identifying the episode
///
/// # Returns
///
/// All matching file paths, possibly none.
pub fn find_existing(
    download_path: &Path,
    pattern: &EpisodePattern,
) -> Result<Vec<PathBuf>, LibraryScanError> {
    if !download_path.is_dir() {
        return Err(LibraryScanError::NotADirectory(download_path.to_path_buf()));
    }

    let mut matches = Vec::new();

    for entry in WalkDir::new(download_path)
        .follow_links(true)
        .sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        if pattern.is_match(&entry.path().to_string_lossy()) {
            matches.push(entry.into_path());
        }
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    fn pattern(season: u32, episode: u32) -> EpisodePattern {
        EpisodePattern::new("Show Title", season, episode).unwrap()
    }

    #[test]
    fn test_finds_matching_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Show Title S01E02.mkv");
        File::create(&file).unwrap();

        let found = find_existing(dir.path(), &pattern(1, 2)).unwrap();
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn test_other_episode_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("Show Title S01E02.mkv")).unwrap();

        let found = find_existing(dir.path(), &pattern(1, 3)).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_scans_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("Show.Title.S01E03.720p").join("video");
        fs::create_dir_all(&nested).unwrap();
        let file = nested.join("episode.mkv");
        File::create(&file).unwrap();
        File::create(dir.path().join("unrelated.txt")).unwrap();

        let found = find_existing(dir.path(), &pattern(1, 3)).unwrap();
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn test_directories_alone_do_not_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Show Title S01E04")).unwrap();

        let found = find_existing(dir.path(), &pattern(1, 4)).unwrap();
        assert!(found.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_finds_symlinked_file() {
        let storage = tempfile::tempdir().unwrap();
        let target = storage.path().join("stored.mkv");
        File::create(&target).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("Show Title S01E02.mkv");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let found = find_existing(dir.path(), &pattern(1, 2)).unwrap();
        assert_eq!(found, vec![link]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scans_symlinked_directory() {
        let storage = tempfile::tempdir().unwrap();
        File::create(storage.path().join("Show.Title.S02E01.mkv")).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("archive");
        std::os::unix::fs::symlink(storage.path(), &link).unwrap();

        let found = find_existing(dir.path(), &pattern(2, 1)).unwrap();
        assert_eq!(found, vec![link.join("Show.Title.S02E01.mkv")]);
    }

    #[test]
    fn test_returns_all_matches() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("Show Title S01E05.mkv")).unwrap();
        File::create(dir.path().join("Show Title S01E05.srt")).unwrap();

        let found = find_existing(dir.path(), &pattern(1, 5)).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_scan_nonexistent_directory() {
        let result = find_existing(Path::new("/nonexistent/path/that/does/not/exist"), &pattern(1, 1));
        assert!(matches!(result, Err(LibraryScanError::NotADirectory(_))));
    }

    #[test]
    fn test_scan_file_instead_of_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("test_file.txt");
        File::create(&file).unwrap();

        let result = find_existing(&file, &pattern(1, 1));
        assert!(result.is_err());
    }
}
