//! Episode Courier - Keep tracked tv series up to date
//!
//! This library provides the core functionality for finding the newest aired
//! episode of each tracked show, checking whether it is already on disk and,
//! if not, queueing a matching torrent in a remote download manager.

mod air_date;
mod config;
mod download_manager;
mod episode_matcher;
mod library_scanner;
mod metadata_retrieval;
mod temp;
mod torrent_index;

use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use thiserror::Error;

// Re-export error types
pub use air_date::AirDateError;
pub use config::ConfigError;
pub use download_manager::DownloadManagerError;
pub use library_scanner::LibraryScanError;
pub use metadata_retrieval::MetadataRetrievalError;
pub use torrent_index::TorrentIndexError;

// Re-export the building blocks
pub use air_date::{has_aired, latest_aired_episode, parse_air_date};
pub use config::DownloadPath;
pub use download_manager::{DEFAULT_RPC_URL, DownloadManager, TransmissionRemote};
pub use episode_matcher::{EpisodePattern, EpisodeRef, search_term};
pub use library_scanner::find_existing;
pub use metadata_retrieval::{
    EpisodeListing, LatestEpisode, ListedEpisode, MetadataProvider, ShowInfo, TvMazeProvider,
};
pub use torrent_index::{ApiBayIndex, TorrentIndex, TorrentResult, resolve_torrent};

/// Progress event emitted during a run
///
/// Every step of processing a show is reported through these events, allowing
/// library users to log progress or remain silent.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started, the download manager is being prepared
    Started {
        download_path: PathBuf,
        show_count: usize,
    },

    /// Fetching show information from the metadata provider
    FetchingShowInfo { show_id: String },

    /// Fetching the episode list of the newest season
    FetchingEpisodes { title: String, season: u32 },

    /// No episode of the newest season has aired yet
    NoAiredEpisode { title: String, season: u32 },

    /// Checking the download directory for the episode
    CheckingLibrary { episode: EpisodeRef },

    /// The episode is already on disk
    AlreadyPresent { episode: EpisodeRef, path: PathBuf },

    /// Searching the torrent index
    SearchingTorrent { episode: EpisodeRef, term: String },

    /// The torrent index had no matching result
    NoTorrentFound { episode: EpisodeRef },

    /// Adding the selected torrent to the download queue
    AddingTorrent {
        episode: EpisodeRef,
        name: String,
        magnet_link: String,
    },

    /// Processing a show failed, the run continues with the next show
    ShowFailed { show_id: String, error: String },

    /// Telling the download manager to start the queued torrents
    StartingDownloads { queued: usize },

    /// Run complete
    Complete { queued: usize },
}

/// What happened to a single show during a run
#[derive(Debug)]
pub enum ShowOutcome {
    /// A torrent for the newest episode was queued
    Queued {
        episode: EpisodeRef,
        name: String,
        magnet_link: String,
    },

    /// The newest episode already exists in the download directory
    AlreadyPresent { episode: EpisodeRef, path: PathBuf },

    /// No episode of the newest season has aired yet
    NoAiredEpisode,

    /// The torrent index had nothing matching the newest episode
    NoTorrentFound { episode: EpisodeRef },

    /// Processing failed; the error did not affect other shows
    Failed(ShowError),
}

/// Result of a complete run, one outcome per tracked show in processing order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<(String, ShowOutcome)>,
}

impl RunSummary {
    /// Number of torrents queued during the run
    pub fn queued_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ShowOutcome::Queued { .. }))
            .count()
    }
}

/// Errors confined to the processing of a single show
#[derive(Debug, Error)]
pub enum ShowError {
    /// Error during metadata retrieval
    #[error("Metadata retrieval error: {0}")]
    MetadataRetrieval(#[from] MetadataRetrievalError),

    /// Error while scanning the download directory
    #[error("Library scan error: {0}")]
    LibraryScan(#[from] LibraryScanError),

    /// Error while searching the torrent index
    #[error("Torrent index error: {0}")]
    TorrentIndex(#[from] TorrentIndexError),

    /// Error while adding the torrent to the download manager
    #[error("Download manager error: {0}")]
    DownloadManager(#[from] DownloadManagerError),

    /// The episode pattern could not be built
    #[error("Invalid episode pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Top-level error type for Episode Courier operations
#[derive(Debug, Error)]
pub enum EpisodeCourierError {
    /// The configuration is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The download manager could not be prepared or told to start
    #[error("Download manager error: {0}")]
    DownloadManager(#[from] DownloadManagerError),
}

/// Queues the newest aired episode of every tracked show for download
///
/// The download manager is prepared once, then every show is processed in
/// order: its newest aired episode is resolved, skipped if a matching file
/// already exists below `download_path`, and otherwise searched on the torrent
/// index and added to the download manager. Finally the download manager is
/// told once to start all queued torrents.
///
/// Failures while processing a single show are reported through
/// `ProgressEvent::ShowFailed` and recorded in the summary; they never stop the
/// run. Failing to prepare or start the download manager aborts the run.
///
/// # Arguments
///
/// * `shows` - Identifiers of the tracked shows
/// * `download_path` - The validated download directory
/// * `metadata` - Provider resolving shows to their newest episode
/// * `index` - Torrent index searched for missing episodes
/// * `remote` - Download manager receiving the magnet links
/// * `progress_callback` - Closure called with progress events
///
/// # Examples
///
/// ```no_run
/// use episode_courier::{
///     fetch_latest_episodes, ApiBayIndex, DownloadPath, TransmissionRemote, TvMazeProvider,
///     DEFAULT_RPC_URL,
/// };
///
/// let download_path = DownloadPath::validate("/srv/tv").unwrap();
/// let mut remote = TransmissionRemote::new(DEFAULT_RPC_URL).unwrap();
///
/// let summary = fetch_latest_episodes(
///     &["tt0944947".to_string()],
///     &download_path,
///     &TvMazeProvider::new(),
///     &ApiBayIndex::new(),
///     &mut remote,
///     |event| println!("{:?}", event),
/// )
/// .unwrap();
///
/// println!("Queued {} episode(s)", summary.queued_count());
/// ```
pub fn fetch_latest_episodes<F>(
    shows: &[String],
    download_path: &DownloadPath,
    metadata: &dyn MetadataProvider,
    index: &dyn TorrentIndex,
    remote: &mut dyn DownloadManager,
    progress_callback: F,
) -> Result<RunSummary, EpisodeCourierError>
where
    F: FnMut(ProgressEvent),
{
    let run = Run {
        download_path,
        metadata,
        index,
        remote,
        today: Local::now().date_naive(),
        progress: progress_callback,
    };

    run.execute(shows)
}

/// State of a single run
struct Run<'a, F> {
    download_path: &'a DownloadPath,
    metadata: &'a dyn MetadataProvider,
    index: &'a dyn TorrentIndex,
    remote: &'a mut dyn DownloadManager,
    /// Episodes airing on this day or later count as not yet aired
    today: NaiveDate,
    progress: F,
}

impl<F> Run<'_, F>
where
    F: FnMut(ProgressEvent),
{
    fn execute(mut self, shows: &[String]) -> Result<RunSummary, EpisodeCourierError> {
        (self.progress)(ProgressEvent::Started {
            download_path: self.download_path.to_path_buf(),
            show_count: shows.len(),
        });

        self.remote.set_download_path(self.download_path)?;
        self.remote.start()?;

        let mut summary = RunSummary::default();

        for show_id in shows {
            let outcome = match self.process_show(show_id) {
                Ok(outcome) => outcome,
                Err(error) => {
                    (self.progress)(ProgressEvent::ShowFailed {
                        show_id: show_id.clone(),
                        error: error.to_string(),
                    });
                    ShowOutcome::Failed(error)
                }
            };
            summary.outcomes.push((show_id.clone(), outcome));
        }

        let queued = summary.queued_count();
        (self.progress)(ProgressEvent::StartingDownloads { queued });
        self.remote.start_torrents()?;

        (self.progress)(ProgressEvent::Complete { queued });

        Ok(summary)
    }

    fn process_show(&mut self, show_id: &str) -> Result<ShowOutcome, ShowError> {
        let Some(episode) = self.resolve_latest_episode(show_id)? else {
            return Ok(ShowOutcome::NoAiredEpisode);
        };

        (self.progress)(ProgressEvent::CheckingLibrary {
            episode: episode.clone(),
        });
        let pattern = episode.pattern()?;
        let existing = library_scanner::find_existing(self.download_path, &pattern)?;

        if let Some(path) = existing.into_iter().next() {
            (self.progress)(ProgressEvent::AlreadyPresent {
                episode: episode.clone(),
                path: path.clone(),
            });
            return Ok(ShowOutcome::AlreadyPresent { episode, path });
        }

        (self.progress)(ProgressEvent::SearchingTorrent {
            episode: episode.clone(),
            term: episode.search_term(),
        });
        let Some(torrent) = torrent_index::resolve_torrent(self.index, &episode)? else {
            (self.progress)(ProgressEvent::NoTorrentFound {
                episode: episode.clone(),
            });
            return Ok(ShowOutcome::NoTorrentFound { episode });
        };

        (self.progress)(ProgressEvent::AddingTorrent {
            episode: episode.clone(),
            name: torrent.name.clone(),
            magnet_link: torrent.magnet_link.clone(),
        });
        self.remote.add_torrent(&torrent.magnet_link)?;

        Ok(ShowOutcome::Queued {
            episode,
            name: torrent.name,
            magnet_link: torrent.magnet_link,
        })
    }

    /// Finds the newest aired episode of a show
    ///
    /// Returns `None` when the provider only names a season and none of its
    /// episodes has aired before today.
    fn resolve_latest_episode(&mut self, show_id: &str) -> Result<Option<EpisodeRef>, ShowError> {
        (self.progress)(ProgressEvent::FetchingShowInfo {
            show_id: show_id.to_string(),
        });
        let info = self.metadata.show_info(show_id)?;

        let (season, episode) = match info.latest {
            LatestEpisode::Episode { season, episode } => (season, episode),
            LatestEpisode::Season(season) => {
                (self.progress)(ProgressEvent::FetchingEpisodes {
                    title: info.title.clone(),
                    season,
                });
                let listing = self.metadata.season_episodes(show_id, season)?;

                match air_date::latest_aired_episode(&listing, self.today) {
                    Some(episode) => (season, episode),
                    None => {
                        (self.progress)(ProgressEvent::NoAiredEpisode {
                            title: info.title,
                            season,
                        });
                        return Ok(None);
                    }
                }
            }
        };

        Ok(Some(EpisodeRef::new(info.title, season, episode)))
    }
}
