/// Pirate Bay JSON API client.
use super::apibay_types::ApiBayTorrent;
use super::{TorrentIndex, TorrentIndexError, TorrentResult};

/// Id the API uses for its "No results returned" placeholder entry
const NO_RESULTS_ID: &str = "0";

/// Torrent index backed by the apibay.org search API.
///
/// Searches go to `<base_url>/q.php?q=<term>&cat=<category>`. Category `0`
/// searches everything, `205`/`208` restrict to TV shows.
pub struct ApiBayIndex {
    client: reqwest::blocking::Client,
    base_url: String,
    category: u32,
}

impl ApiBayIndex {
    /// Creates a client for https://apibay.org searching all categories.
    pub fn new() -> Self {
        Self::with_base_url("https://apibay.org", 0)
    }

    /// Creates a client for a different apibay compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>, category: u32) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            category,
        }
    }

    /// Converts raw API entries to search results, keeping their order.
    fn convert_results(torrents: Vec<ApiBayTorrent>) -> Vec<TorrentResult> {
        torrents
            .into_iter()
            .filter(|torrent| torrent.id != NO_RESULTS_ID)
            .map(|torrent| TorrentResult {
                magnet_link: magnet_link(&torrent.info_hash, &torrent.name),
                name: torrent.name,
            })
            .collect()
    }
}

impl Default for ApiBayIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TorrentIndex for ApiBayIndex {
    fn search(&self, term: &str) -> Result<Vec<TorrentResult>, TorrentIndexError> {
        let url = format!("{}/q.php", self.base_url);
        let category = self.category.to_string();
        tracing::debug!(url = %url, term = %term, "Searching torrent index");

        let response = self
            .client
            .get(&url)
            .query(&[("q", term), ("cat", category.as_str())])
            .send()
            .map_err(|e| TorrentIndexError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TorrentIndexError::RequestError(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let torrents: Vec<ApiBayTorrent> = response
            .json()
            .map_err(|e| TorrentIndexError::ParseError(e.to_string()))?;

        Ok(Self::convert_results(torrents))
    }
}

/// Builds a magnet URI from an info hash and a display name.
fn magnet_link(info_hash: &str, name: &str) -> String {
    format!(
        "magnet:?xt=urn:btih:{}&dn={}",
        info_hash,
        urlencoding::encode(name)
    )
}
