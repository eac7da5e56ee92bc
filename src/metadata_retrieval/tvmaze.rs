/// TVMaze metadata provider implementation.
use super::tvmaze_types::{TvMazeEpisode, TvMazeShow};
use super::{
    EpisodeListing, LatestEpisode, ListedEpisode, MetadataProvider, MetadataRetrievalError,
    ShowInfo,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

/// Metadata provider for the TVMaze API.
///
/// This provider fetches show information from https://api.tvmaze.com.
/// Shows are identified either by their TVMaze id (`82`) or by their IMDb
/// id (`tt0944947`), which is resolved through the lookup endpoint.
pub struct TvMazeProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TvMazeProvider {
    /// Creates a new TVMaze provider instance.
    pub fn new() -> Self {
        Self::with_base_url("https://api.tvmaze.com")
    }

    /// Creates a provider talking to a different TVMaze compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Performs a GET request and decodes the JSON body.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        show_id: &str,
    ) -> Result<T, MetadataRetrievalError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Querying TVMaze");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| MetadataRetrievalError::RequestError(e.to_string()))?;

        // Check if the series was found
        if response.status() == 404 {
            return Err(MetadataRetrievalError::SeriesNotFound(show_id.to_string()));
        }

        if !response.status().is_success() {
            return Err(MetadataRetrievalError::RequestError(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json()
            .map_err(|e| MetadataRetrievalError::ParseError(e.to_string()))
    }

    /// Maps a configured show identifier to a TVMaze show id.
    fn resolve_show_id(&self, show_id: &str) -> Result<u64, MetadataRetrievalError> {
        if let Ok(id) = show_id.parse::<u64>() {
            return Ok(id);
        }

        if is_imdb_id(show_id) {
            let show: TvMazeShow =
                self.get_json("/lookup/shows", &[("imdb", show_id)], show_id)?;
            return Ok(show.id);
        }

        Err(MetadataRetrievalError::InvalidData(format!(
            "Unsupported show identifier {:?}, expected a TVMaze or IMDb id",
            show_id
        )))
    }

    /// Converts TVMaze show data to our ShowInfo structure.
    ///
    /// The newest season is the highest season with at least one numbered
    /// episode; the episode itself is left to air date filtering.
    fn convert_to_show_info(show: TvMazeShow) -> Result<ShowInfo, MetadataRetrievalError> {
        let episodes = show
            .embedded
            .ok_or_else(|| {
                MetadataRetrievalError::InvalidData("No episodes found in API response".to_string())
            })?
            .episodes;

        let latest_season = episodes
            .iter()
            .filter(|episode| episode.number.is_some())
            .map(|episode| episode.season)
            .max()
            .ok_or_else(|| {
                MetadataRetrievalError::InvalidData(format!("Show '{}' has no episodes", show.name))
            })?;

        Ok(ShowInfo {
            title: show.name,
            latest: LatestEpisode::Season(latest_season),
        })
    }

    /// Builds the episode listing of one season, skipping unnumbered specials.
    fn convert_to_listing(episodes: Vec<TvMazeEpisode>, season: u32) -> EpisodeListing {
        episodes
            .into_iter()
            .filter(|episode| episode.season == season)
            .filter_map(|episode| {
                let number = episode.number?;
                let airdate = episode
                    .airdate
                    .map(|raw| normalize_airdate(&raw))
                    .unwrap_or_default();
                Some((number, ListedEpisode { airdate }))
            })
            .collect()
    }
}

impl Default for TvMazeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataProvider for TvMazeProvider {
    fn show_info(&self, show_id: &str) -> Result<ShowInfo, MetadataRetrievalError> {
        let id = self.resolve_show_id(show_id)?;
        let show: TvMazeShow =
            self.get_json(&format!("/shows/{}", id), &[("embed", "episodes")], show_id)?;

        Self::convert_to_show_info(show)
    }

    fn season_episodes(
        &self,
        show_id: &str,
        season: u32,
    ) -> Result<EpisodeListing, MetadataRetrievalError> {
        let id = self.resolve_show_id(show_id)?;
        let episodes: Vec<TvMazeEpisode> =
            self.get_json(&format!("/shows/{}/episodes", id), &[], show_id)?;

        Ok(Self::convert_to_listing(episodes, season))
    }
}

/// Returns true for identifiers shaped like `tt0944947`.
fn is_imdb_id(show_id: &str) -> bool {
    show_id
        .strip_prefix("tt")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Rewrites a TVMaze `YYYY-MM-DD` date into the `Jan 5, 2024` listing format.
///
/// Anything that is not an ISO date is returned unchanged.
fn normalize_airdate(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_JSON: &str = r#"{
        "id": 82,
        "name": "Game of Thrones",
        "_embedded": {
            "episodes": [
                {"season": 1, "number": 1, "airdate": "2011-04-17"},
                {"season": 2, "number": 1, "airdate": "2012-04-01"},
                {"season": 2, "number": 2, "airdate": "2012-04-08"},
                {"season": 3, "number": null, "airdate": "2013-03-01"}
            ]
        }
    }"#;

    #[test]
    fn test_latest_season_ignores_specials() {
        let show: TvMazeShow = serde_json::from_str(SHOW_JSON).unwrap();
        let info = TvMazeProvider::convert_to_show_info(show).unwrap();

        assert_eq!(info.title, "Game of Thrones");
        assert_eq!(info.latest, LatestEpisode::Season(2));
    }

    #[test]
    fn test_show_without_episodes_is_invalid() {
        let show: TvMazeShow =
            serde_json::from_str(r#"{"id": 1, "name": "Empty", "_embedded": {"episodes": []}}"#)
                .unwrap();
        assert!(matches!(
            TvMazeProvider::convert_to_show_info(show),
            Err(MetadataRetrievalError::InvalidData(_))
        ));

        let show: TvMazeShow = serde_json::from_str(r#"{"id": 1, "name": "Bare"}"#).unwrap();
        assert!(TvMazeProvider::convert_to_show_info(show).is_err());
    }

    #[test]
    fn test_listing_for_season() {
        let episodes: Vec<TvMazeEpisode> = serde_json::from_str(
            r#"[
                {"season": 1, "number": 1, "airdate": "2011-04-17"},
                {"season": 2, "number": 1, "airdate": "2012-04-01"},
                {"season": 2, "number": 2, "airdate": ""},
                {"season": 2, "number": 3, "airdate": null},
                {"season": 2, "number": null, "airdate": "2012-05-01"}
            ]"#,
        )
        .unwrap();

        let listing = TvMazeProvider::convert_to_listing(episodes, 2);

        assert_eq!(listing.len(), 3);
        assert_eq!(listing[&1].airdate, "Apr 1, 2012");
        assert_eq!(listing[&2].airdate, "");
        assert_eq!(listing[&3].airdate, "");
    }

    #[test]
    fn test_normalize_airdate() {
        assert_eq!(normalize_airdate("2024-01-05"), "Jan 5, 2024");
        assert_eq!(normalize_airdate("2024-11-23"), "Nov 23, 2024");
        assert_eq!(normalize_airdate("TBA"), "TBA");
    }

    #[test]
    fn test_is_imdb_id() {
        assert!(is_imdb_id("tt0944947"));
        assert!(!is_imdb_id("tt"));
        assert!(!is_imdb_id("82"));
        assert!(!is_imdb_id("ttabc"));
    }
}
