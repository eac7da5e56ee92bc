/// apibay.org response types for deserialization.
///
/// The API encodes every field, numbers included, as a JSON string.
use serde::Deserialize;

/// A single entry of a `q.php` search response.
#[derive(Debug, Deserialize)]
pub(super) struct ApiBayTorrent {
    /// Torrent id, `"0"` for the "No results returned" placeholder
    pub id: String,
    /// Release name
    pub name: String,
    /// Hex encoded BitTorrent info hash
    pub info_hash: String,
}
