/// Transmission RPC download manager implementation.
use super::{DownloadManager, DownloadManagerError};
use reqwest::Url;
use std::path::Path;
use tokio::runtime::{Builder, Runtime};
use transmission_rpc::TransClient;
use transmission_rpc::types::{BasicAuth, Id, TorrentAction, TorrentAddArgs, TorrentAddedOrDuplicate};

/// Default RPC endpoint of a local transmission-daemon
pub const DEFAULT_RPC_URL: &str = "http://localhost:9091/transmission/rpc";

/// Download manager talking to a Transmission daemon over JSON-RPC.
///
/// The RPC client is asynchronous; every call is driven to completion on a
/// private single-threaded runtime so the trait stays blocking like the other
/// services. The session-id handshake is handled by the client.
///
/// Torrents are added paused and remembered; `start_torrents` starts exactly
/// those torrents and leaves everything else in the daemon untouched.
pub struct TransmissionRemote {
    client: TransClient,
    runtime: Runtime,
    url: Url,
    download_dir: Option<String>,
    queued: Vec<i64>,
}

impl TransmissionRemote {
    /// Creates a remote for the given RPC endpoint.
    ///
    /// No request is sent until `start` is called.
    pub fn new(url: &str) -> Result<Self, DownloadManagerError> {
        let url = Url::parse(url).map_err(|e| DownloadManagerError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(DownloadManagerError::RuntimeFailed)?;

        Ok(Self {
            client: TransClient::new(url.clone()),
            runtime,
            url,
            download_dir: None,
            queued: Vec::new(),
        })
    }

    /// Uses HTTP basic auth for every request.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        let basic_auth = BasicAuth {
            user: user.into(),
            password: password.into(),
        };
        self.client = TransClient::with_auth(self.url.clone(), basic_auth);
        self
    }

    /// Ids of the torrents added but not yet started.
    pub fn queued(&self) -> &[i64] {
        &self.queued
    }

    fn remember(&mut self, id: i64) {
        if !self.queued.contains(&id) {
            self.queued.push(id);
        }
    }
}

impl DownloadManager for TransmissionRemote {
    fn set_download_path(&mut self, path: &Path) -> Result<(), DownloadManagerError> {
        self.download_dir = Some(path.to_string_lossy().into_owned());
        Ok(())
    }

    fn start(&mut self) -> Result<(), DownloadManagerError> {
        tracing::debug!(url = %self.url, "Connecting to Transmission");

        let response = self
            .runtime
            .block_on(self.client.session_get())
            .map_err(|e| DownloadManagerError::Unreachable(e.to_string()))?;
        ensure_success("session-get", &response.result)?;

        tracing::debug!("Transmission session opened");
        Ok(())
    }

    fn add_torrent(&mut self, magnet_link: &str) -> Result<(), DownloadManagerError> {
        let add = add_args(magnet_link, self.download_dir.as_deref());

        let response = self
            .runtime
            .block_on(self.client.torrent_add(add))
            .map_err(|e| DownloadManagerError::Unreachable(e.to_string()))?;
        ensure_success("torrent-add", &response.result)?;

        let id = torrent_id(response.arguments)?;
        tracing::debug!(id, "Torrent queued in Transmission");
        self.remember(id);

        Ok(())
    }

    fn start_torrents(&mut self) -> Result<(), DownloadManagerError> {
        // An empty id list would start every torrent in the daemon
        if self.queued.is_empty() {
            tracing::debug!("No queued torrents to start");
            return Ok(());
        }

        let ids = self.queued.iter().copied().map(Id::Id).collect();
        let response = self
            .runtime
            .block_on(self.client.torrent_action(TorrentAction::Start, ids))
            .map_err(|e| DownloadManagerError::Unreachable(e.to_string()))?;
        ensure_success("torrent-start", &response.result)?;

        tracing::debug!(count = self.queued.len(), "Started queued torrents");
        self.queued.clear();

        Ok(())
    }
}

/// Arguments adding a magnet link paused, optionally into `download_dir`.
fn add_args(magnet_link: &str, download_dir: Option<&str>) -> TorrentAddArgs {
    TorrentAddArgs {
        filename: Some(magnet_link.to_string()),
        paused: Some(true),
        download_dir: download_dir.map(str::to_string),
        ..TorrentAddArgs::default()
    }
}

/// Turns an RPC result other than `"success"` into an error.
fn ensure_success(method: &str, result: &str) -> Result<(), DownloadManagerError> {
    if result == "success" {
        return Ok(());
    }

    Err(DownloadManagerError::RpcFailed {
        method: method.to_string(),
        reason: result.to_string(),
    })
}

/// Picks the torrent id out of a `torrent-add` response.
fn torrent_id(added: TorrentAddedOrDuplicate) -> Result<i64, DownloadManagerError> {
    #[allow(unreachable_patterns)]
    let torrent = match added {
        TorrentAddedOrDuplicate::TorrentAdded(torrent) => torrent,
        TorrentAddedOrDuplicate::TorrentDuplicate(torrent) => torrent,
        _ => {
            return Err(DownloadManagerError::ParseError(
                "torrent-add response names no torrent".to_string(),
            ));
        }
    };

    torrent.id.ok_or_else(|| {
        DownloadManagerError::ParseError("torrent-add response carries no torrent id".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, any RPC would fail.
    const DEAD_URL: &str = "http://127.0.0.1:9/transmission/rpc";

    #[test]
    fn test_success_result() {
        assert!(ensure_success("torrent-add", "success").is_ok());
    }

    #[test]
    fn test_failed_result() {
        match ensure_success("torrent-add", "invalid or corrupt torrent file") {
            Err(DownloadManagerError::RpcFailed { method, reason }) => {
                assert_eq!(method, "torrent-add");
                assert_eq!(reason, "invalid or corrupt torrent file");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_add_args_are_paused() {
        let add = add_args("magnet:?xt=urn:btih:ABC", Some("/srv/tv"));

        assert_eq!(add.filename.as_deref(), Some("magnet:?xt=urn:btih:ABC"));
        assert_eq!(add.paused, Some(true));
        assert_eq!(add.download_dir.as_deref(), Some("/srv/tv"));
    }

    #[test]
    fn test_add_args_without_download_dir() {
        let add = add_args("magnet:?xt=urn:btih:ABC", None);

        assert!(add.download_dir.is_none());
        assert_eq!(add.paused, Some(true));
    }

    #[test]
    fn test_invalid_url() {
        let result = TransmissionRemote::new("not a url");
        assert!(matches!(result, Err(DownloadManagerError::InvalidUrl { .. })));
    }

    #[test]
    fn test_queue_ignores_duplicates() {
        let mut remote = TransmissionRemote::new(DEAD_URL).unwrap();
        remote.remember(7);
        remote.remember(3);
        remote.remember(7);

        assert_eq!(remote.queued(), &[7, 3]);
    }

    #[test]
    fn test_start_without_queue_sends_nothing() {
        let mut remote = TransmissionRemote::new(DEAD_URL).unwrap();
        assert!(remote.start_torrents().is_ok());
        assert!(remote.queued().is_empty());
    }

    #[test]
    fn test_start_against_dead_endpoint_is_unreachable() {
        let mut remote = TransmissionRemote::new(DEAD_URL)
            .unwrap()
            .with_credentials("alice", "secret");

        assert!(matches!(
            remote.start(),
            Err(DownloadManagerError::Unreachable(_))
        ));
    }
}
