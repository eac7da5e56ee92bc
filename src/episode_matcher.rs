//! Episode matching module
//!
//! This module turns a show title plus season/episode numbers into the two
//! things needed to find an episode: a case-insensitive pattern deciding whether
//! a file path or torrent name belongs to exactly that episode, and the search
//! term sent to the torrent index.

use regex::{Regex, RegexBuilder};
use std::fmt;

/// One specific episode of one show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRef {
    /// The show title as reported by the metadata provider
    pub title: String,
    /// The season number (1-based)
    pub season: u32,
    /// The episode number within the season (1-based)
    pub episode: u32,
}

impl EpisodeRef {
    pub fn new(title: impl Into<String>, season: u32, episode: u32) -> Self {
        Self {
            title: title.into(),
            season,
            episode,
        }
    }

    /// Builds the pattern identifying files and torrents of this episode
    pub fn pattern(&self) -> Result<EpisodePattern, regex::Error> {
        EpisodePattern::new(&self.title, self.season, self.episode)
    }

    /// Builds the torrent index search term for this episode
    pub fn search_term(&self) -> String {
        search_term(&self.title, self.season, self.episode)
    }
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} S{:02}E{:02}", self.title, self.season, self.episode)
    }
}

/// Matching rule for a single episode
///
/// A candidate matches when it contains the title (each whitespace run in the
/// title may stand for any non-empty gap), followed later by an `S<season>E<episode>`
/// token with optional zero-padding, which must not be followed by another digit.
/// The token may also end the candidate, so `Show Title S01E02` matches on its own.
/// Matching ignores case. The same rule is applied to file paths and torrent names.
#[derive(Debug, Clone)]
pub struct EpisodePattern {
    regex: Regex,
}

impl EpisodePattern {
    /// Builds the pattern for the given title, season and episode
    ///
    /// The title is quoted literally, so characters like `.` or `(` only ever
    /// match themselves. An empty title degenerates to matching the
    /// season/episode token alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use episode_courier::EpisodePattern;
    ///
    /// let pattern = EpisodePattern::new("Show Title", 1, 2).unwrap();
    /// assert!(pattern.is_match("Show.Title.S01E02.720p.mkv"));
    /// assert!(!pattern.is_match("Show.Title.S01E12.720p.mkv"));
    /// ```
    pub fn new(title: &str, season: u32, episode: u32) -> Result<Self, regex::Error> {
        let title = title
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".+");

        let source = format!(r"{title}.+s0?{season}e0?{episode}(?:[^0-9]|$)");
        let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;

        Ok(Self { regex })
    }

    /// Returns true if the candidate names this episode
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// Builds the search term sent to the torrent index
///
/// Season and episode are zero-padded to two digits: `"Show Title S01E02"`.
/// The term is only used for querying, never for matching results.
pub fn search_term(title: &str, season: u32, episode: u32) -> String {
    format!("{} S{:02}E{:02}", title, season, episode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_zero_padded_filename() {
        let pattern = EpisodePattern::new("Show Title", 1, 2).unwrap();
        assert!(pattern.is_match("Show Title S01E02.mkv"));
        assert!(pattern.is_match("/media/tv/Show Title/Show Title S01E02 - Pilot.mkv"));
    }

    #[test]
    fn test_matches_unpadded_and_case_insensitive() {
        let pattern = EpisodePattern::new("Show Title", 1, 2).unwrap();
        assert!(pattern.is_match("show.title.s1e2.hdtv.avi"));
        assert!(pattern.is_match("SHOW_TITLE_S01E2_x264"));
    }

    #[test]
    fn test_rejects_other_episode() {
        let pattern = EpisodePattern::new("Show Title", 1, 2).unwrap();
        assert!(!pattern.is_match("Show Title S01E03.mkv"));
        assert!(!pattern.is_match("Show Title S02E02.mkv"));
    }

    #[test]
    fn test_rejects_trailing_digit() {
        let pattern = EpisodePattern::new("Show Title", 1, 1).unwrap();
        assert!(!pattern.is_match("Show Title S01E10.mkv"));
        assert!(!pattern.is_match("Show Title S01E011.mkv"));
        assert!(pattern.is_match("Show Title S01E01.mkv"));
    }

    #[test]
    fn test_matches_token_at_end_of_name() {
        let pattern = EpisodePattern::new("Show Title", 1, 2).unwrap();
        assert!(pattern.is_match("Show Title S01E02"));
    }

    #[test]
    fn test_whitespace_is_a_gap_wildcard() {
        let pattern = EpisodePattern::new("The   Long Show", 3, 4).unwrap();
        assert!(pattern.is_match("The.Long.Show.S03E04.WEB"));
        assert!(pattern.is_match("The - Long - Show - S03E04 -"));
        assert!(!pattern.is_match("TheLongShow S03E04 "));
    }

    #[test]
    fn test_title_metacharacters_are_quoted() {
        let pattern = EpisodePattern::new("Agents of S.H.I.E.L.D. (2013)", 7, 13).unwrap();
        assert!(pattern.is_match("Agents of S.H.I.E.L.D. (2013) S07E13 final.mkv"));
        assert!(!pattern.is_match("Agents of SxHxIxExLxDx (2013) S07E13 final.mkv"));
        assert!(!pattern.is_match("Agents of S.H.I.E.L.D. 2013 S07E13 final.mkv"));
    }

    #[test]
    fn test_requires_title() {
        let pattern = EpisodePattern::new("Show Title", 1, 2).unwrap();
        assert!(!pattern.is_match("Other Show S01E02"));
    }

    #[test]
    fn test_empty_title_matches_token_only() {
        let pattern = EpisodePattern::new("", 1, 2).unwrap();
        assert!(pattern.is_match("anything S01E02.mkv"));
        assert!(!pattern.is_match("anything S01E03.mkv"));
    }

    #[test]
    fn test_double_digit_numbers() {
        let pattern = EpisodePattern::new("Show", 12, 10).unwrap();
        assert!(pattern.is_match("Show S12E10 1080p"));
        assert!(!pattern.is_match("Show S12E100 1080p"));
        assert!(!pattern.is_match("Show S12E01 1080p"));
    }

    #[test]
    fn test_search_term_padding() {
        assert_eq!(search_term("Show Title", 1, 2), "Show Title S01E02");
        assert_eq!(search_term("Show Title", 11, 123), "Show Title S11E123");
    }

    #[test]
    fn test_episode_ref_display_and_term() {
        let episode = EpisodeRef::new("Example", 1, 3);
        assert_eq!(episode.to_string(), "Example S01E03");
        assert_eq!(episode.search_term(), "Example S01E03");
        assert!(episode.pattern().unwrap().is_match("Example.S01E03.mkv"));
    }
}
