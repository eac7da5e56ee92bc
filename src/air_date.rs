//! Air date handling
//!
//! Episode listings carry their air date as human readable text like
//! `Jan 5, 2024` or `Jan. 5, 2024`. All assumptions about that format live
//! in this module.

use crate::metadata_retrieval::EpisodeListing;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Three-letter month, optional period, day, comma, four-digit year
static AIR_DATE_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z]{3}\.? [0-9]{1,2}, [0-9]{4}$").expect("air date format regex is valid")
});

/// Errors that can occur while reading an air date
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AirDateError {
    /// The text does not have the `Mon D, YYYY` shape
    #[error("Air date does not match the expected format: {0:?}")]
    UnexpectedFormat(String),

    /// The text has the right shape but names no real calendar day
    #[error("Air date is not a valid calendar date: {0:?}")]
    InvalidDate(String),
}

/// Parses an air date such as `Jan 5, 2024` or `Jan. 5, 2024`
///
/// Only English month abbreviations are understood.
pub fn parse_air_date(raw: &str) -> Result<NaiveDate, AirDateError> {
    if !AIR_DATE_FORMAT.is_match(raw) {
        return Err(AirDateError::UnexpectedFormat(raw.to_string()));
    }

    let normalized = raw.replacen('.', "", 1);
    NaiveDate::parse_from_str(&normalized, "%b %d, %Y")
        .map_err(|_| AirDateError::InvalidDate(raw.to_string()))
}

/// Returns true if the air date parses and lies strictly before `today`
pub fn has_aired(raw: &str, today: NaiveDate) -> bool {
    parse_air_date(raw).is_ok_and(|date| date < today)
}

/// Finds the highest episode number in the listing that has already aired
///
/// Entries whose air date cannot be parsed never count as aired. Returns
/// `None` when no entry qualifies.
pub fn latest_aired_episode(listing: &EpisodeListing, today: NaiveDate) -> Option<u32> {
    listing
        .iter()
        .filter(|(_, entry)| has_aired(&entry.airdate, today))
        .map(|(number, _)| *number)
        .max()
}
