//! Download manager module
//!
//! This module provides the trait for remote download managers that accept
//! magnet links, as well as a Transmission RPC implementation.

mod transmission;

pub use transmission::{DEFAULT_RPC_URL, TransmissionRemote};

use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while talking to the download manager
#[derive(Debug, Error)]
pub enum DownloadManagerError {
    /// The download manager could not be reached
    #[error("Download manager unreachable: {0}")]
    Unreachable(String),

    /// The RPC endpoint is not a valid URL
    #[error("Invalid RPC URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The runtime driving the RPC client could not be created
    #[error("Failed to start the RPC runtime: {0}")]
    RuntimeFailed(#[source] io::Error),

    /// Failed to parse the download manager's response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The RPC call reached the download manager but was not successful
    #[error("RPC call {method} failed: {reason}")]
    RpcFailed { method: String, reason: String },
}

/// Trait for remote download managers
///
/// A run calls `set_download_path` and `start` once, `add_torrent` for every
/// episode to fetch, and finally `start_torrents` once.
pub trait DownloadManager {
    /// Sets the directory new downloads are stored in
    fn set_download_path(&mut self, path: &Path) -> Result<(), DownloadManagerError>;

    /// Connects to the download manager so torrents can be added
    fn start(&mut self) -> Result<(), DownloadManagerError>;

    /// Queues a torrent given by its magnet link without starting it
    fn add_torrent(&mut self, magnet_link: &str) -> Result<(), DownloadManagerError>;

    /// Starts downloading every torrent queued through `add_torrent`
    fn start_torrents(&mut self) -> Result<(), DownloadManagerError>;
}
