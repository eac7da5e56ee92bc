//! Torrent index module
//!
//! This module provides the trait implemented by torrent search clients and
//! the resolver that picks the torrent for a specific episode out of a result
//! list.

mod apibay;
mod apibay_types;

pub use apibay::ApiBayIndex;

use crate::episode_matcher::EpisodeRef;
use thiserror::Error;

/// Errors that can occur while searching for torrents
#[derive(Debug, Error)]
pub enum TorrentIndexError {
    /// Request to the torrent index failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Failed to parse the index's response
    #[error("Failed to parse index response: {0}")]
    ParseError(String),

    /// The episode pattern could not be built
    #[error("Invalid episode pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// A single search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentResult {
    /// The release name as listed by the index
    pub name: String,
    /// Magnet URI of the torrent
    pub magnet_link: String,
}

/// Trait for torrent indexes that can be searched by free text
pub trait TorrentIndex {
    /// Searches the index for the given term
    ///
    /// # Returns
    ///
    /// The results in the order the index returned them, possibly empty
    fn search(&self, term: &str) -> Result<Vec<TorrentResult>, TorrentIndexError>;
}

/// Searches the index for an episode and picks the first fitting result
///
/// The search term only narrows the index query; every result is checked
/// against the episode pattern and the first one that matches wins. The
/// index's ordering is kept as is, seeders and size are not considered.
///
/// # Returns
///
/// `Ok(None)` when the index returns nothing or nothing matches the episode.
pub fn resolve_torrent(
    index: &dyn TorrentIndex,
    episode: &EpisodeRef,
) -> Result<Option<TorrentResult>, TorrentIndexError> {
    let pattern = episode.pattern()?;
    let results = index.search(&episode.search_term())?;

    Ok(results
        .into_iter()
        .find(|result| pattern.is_match(&result.name)))
}
