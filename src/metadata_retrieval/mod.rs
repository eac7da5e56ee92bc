/// Data structures and traits for TV series metadata retrieval.
///
/// This module provides structures to describe what a metadata provider knows
/// about a tracked show (its title and where its newest episode is), as well as
/// the trait implemented by metadata providers.
mod tvmaze;
mod tvmaze_types;

pub use tvmaze::TvMazeProvider;

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during metadata retrieval operations.
#[derive(Debug, Error)]
pub enum MetadataRetrievalError {
    /// Request to the metadata provider failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Failed to parse the provider's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The requested series was not found
    #[error("Series not found: {0}")]
    SeriesNotFound(String),

    /// The API returned invalid or unexpected data
    #[error("API returned invalid data: {0}")]
    InvalidData(String),
}

/// Where the newest episode of a show can be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatestEpisode {
    /// The provider knows the newest aired episode directly
    Episode { season: u32, episode: u32 },
    /// Only the newest season is known; its episode list has to be
    /// filtered by air date to find the newest aired episode
    Season(u32),
}

/// Basic information about a tracked show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowInfo {
    /// The title of the show
    pub title: String,
    /// The newest episode, or the season that contains it
    pub latest: LatestEpisode,
}

/// A single entry of a season's episode list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEpisode {
    /// Air date as human readable text, e.g. `Jan 5, 2024`
    pub airdate: String,
}

/// Episodes of one season keyed by episode number.
pub type EpisodeListing = BTreeMap<u32, ListedEpisode>;

/// Trait for metadata providers that can fetch TV series information.
///
/// Implementors of this trait can retrieve show metadata from various sources
/// such as IMDb, TVMaze or TMDB.
pub trait MetadataProvider {
    /// Fetches the title of a show and the location of its newest episode.
    ///
    /// # Arguments
    ///
    /// * `show_id` - The provider specific identifier of the show
    fn show_info(&self, show_id: &str) -> Result<ShowInfo, MetadataRetrievalError>;

    /// Fetches the episode list of one season of a show.
    ///
    /// # Arguments
    ///
    /// * `show_id` - The provider specific identifier of the show
    /// * `season` - The season whose episodes should be listed
    ///
    /// # Returns
    ///
    /// The episodes of the season keyed by episode number
    fn season_episodes(
        &self,
        show_id: &str,
        season: u32,
    ) -> Result<EpisodeListing, MetadataRetrievalError>;
}
