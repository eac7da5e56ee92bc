use clap::Parser;
use episode_courier::{
    ApiBayIndex, DEFAULT_RPC_URL, DownloadPath, EpisodeCourierError, ProgressEvent, RunSummary,
    ShowOutcome, TransmissionRemote, TvMazeProvider, fetch_latest_episodes,
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Queue the newest aired episode of your tracked shows in Transmission
#[derive(Parser)]
#[command(name = "episode-courier")]
#[command(author, version, about)]
struct Cli {
    /// Directory downloads are stored in; scanned for existing episodes
    #[arg(short, long)]
    download_path: PathBuf,

    /// Show to track, as TVMaze id or IMDb id (repeatable)
    #[arg(short, long = "show", required = true)]
    shows: Vec<String>,

    /// Transmission RPC endpoint
    #[arg(long, default_value = DEFAULT_RPC_URL)]
    transmission_url: String,

    /// Transmission RPC user name
    #[arg(long, requires = "transmission_password")]
    transmission_user: Option<String>,

    /// Transmission RPC password
    #[arg(
        long,
        env = "TRANSMISSION_PASSWORD",
        hide_env_values = true,
        requires = "transmission_user"
    )]
    transmission_password: Option<String>,

    /// TVMaze API base URL
    #[arg(long, default_value = "https://api.tvmaze.com")]
    tvmaze_url: String,

    /// Torrent index (apibay compatible) base URL
    #[arg(long, default_value = "https://apibay.org")]
    index_url: String,

    /// Torrent index category, 0 searches everything
    #[arg(long, default_value_t = 0)]
    index_category: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Handles progress events and turns them into log lines
fn handle_progress_event(event: ProgressEvent) {
    match event {
        ProgressEvent::Started {
            download_path,
            show_count,
        } => {
            tracing::info!(
                "Checking {} show(s), downloading to {}",
                show_count,
                download_path.display()
            );
        }
        ProgressEvent::FetchingShowInfo { show_id } => {
            tracing::debug!("Fetching show info for ID {}", show_id);
        }
        ProgressEvent::FetchingEpisodes { title, season } => {
            tracing::debug!("Fetching episodes for \"{}\" season {}", title, season);
        }
        ProgressEvent::NoAiredEpisode { title, season } => {
            tracing::debug!(
                "No aired episode of \"{}\" season {} found, skipping",
                title,
                season
            );
        }
        ProgressEvent::CheckingLibrary { episode } => {
            tracing::debug!("Checking if {} has already been downloaded", episode);
        }
        ProgressEvent::AlreadyPresent { episode, path } => {
            tracing::debug!("Skipping {}, found episode at {}", episode, path.display());
        }
        ProgressEvent::SearchingTorrent { term, .. } => {
            tracing::debug!("Searching for episode torrent with \"{}\"", term);
        }
        ProgressEvent::NoTorrentFound { episode } => {
            tracing::debug!("Skipping {}, no results found", episode);
        }
        ProgressEvent::AddingTorrent {
            name, magnet_link, ..
        } => {
            tracing::debug!(
                "Adding torrent \"{}\" with link \"{}\" to download queue",
                name,
                magnet_link
            );
        }
        ProgressEvent::ShowFailed { show_id, error } => {
            tracing::warn!("Skipping show {}: {}", show_id, error);
        }
        ProgressEvent::StartingDownloads { queued } => {
            tracing::debug!("Starting torrent downloads ({} queued)", queued);
        }
        ProgressEvent::Complete { queued } => {
            tracing::info!("Run complete, queued {} episode(s)", queued);
        }
    }
}

/// Prints one line per show describing what happened to it
fn print_summary(summary: &RunSummary) {
    for (show_id, outcome) in &summary.outcomes {
        match outcome {
            ShowOutcome::Queued { episode, name, .. } => {
                println!("{}: queued {} ({})", show_id, episode, name);
            }
            ShowOutcome::AlreadyPresent { episode, path } => {
                println!("{}: {} already at {}", show_id, episode, path.display());
            }
            ShowOutcome::NoAiredEpisode => {
                println!("{}: no aired episode yet", show_id);
            }
            ShowOutcome::NoTorrentFound { episode } => {
                println!("{}: no torrent found for {}", show_id, episode);
            }
            ShowOutcome::Failed(error) => {
                println!("{}: failed: {}", show_id, error);
            }
        }
    }
}

fn run(cli: Cli) -> Result<RunSummary, EpisodeCourierError> {
    // Validate before touching any external service
    let download_path = DownloadPath::validate(&cli.download_path)?;

    let metadata = TvMazeProvider::with_base_url(cli.tvmaze_url);
    let index = ApiBayIndex::with_base_url(cli.index_url, cli.index_category);
    let mut remote = TransmissionRemote::new(&cli.transmission_url)?;
    if let (Some(user), Some(password)) = (cli.transmission_user, cli.transmission_password) {
        remote = remote.with_credentials(user, password);
    }

    fetch_latest_episodes(
        &cli.shows,
        &download_path,
        &metadata,
        &index,
        &mut remote,
        handle_progress_event,
    )
}

fn main() {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("episode_courier=debug")
        } else {
            EnvFilter::new("episode_courier=info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            tracing::error!("{}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    const BASE: [&str; 5] = ["episode-courier", "-d", "/srv/tv", "-s", "tt0001"];

    fn parse(extra: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(BASE.iter().chain(extra))
    }

    #[test]
    fn test_credentials_are_optional() {
        if std::env::var_os("TRANSMISSION_PASSWORD").is_some() {
            return;
        }
        let cli = parse(&[]).unwrap();
        assert!(cli.transmission_user.is_none());
        assert_eq!(cli.shows, vec!["tt0001".to_string()]);
        assert_eq!(cli.transmission_url, DEFAULT_RPC_URL);
    }

    #[test]
    fn test_user_and_password_together() {
        let cli = parse(&["--transmission-user", "alice", "--transmission-password", "secret"])
            .unwrap();
        assert_eq!(cli.transmission_user.as_deref(), Some("alice"));
        assert_eq!(cli.transmission_password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_password_without_user_is_rejected() {
        let error = parse(&["--transmission-password", "secret"]).err().unwrap();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_user_without_password_is_rejected() {
        if std::env::var_os("TRANSMISSION_PASSWORD").is_some() {
            return;
        }
        let error = parse(&["--transmission-user", "alice"]).err().unwrap();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_show_is_required() {
        let error = Cli::try_parse_from(["episode-courier", "-d", "/srv/tv"])
            .err()
            .unwrap();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }
}
