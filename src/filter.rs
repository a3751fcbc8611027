//! Publish-date parsing and since-cutoff filtering
//!
//! A `pubDate` is tried first as RFC 1123 with a named zone
//! (`Mon, 02 Jan 2006 15:04:05 GMT`), then as RFC 1123 with a numeric zone
//! (`Mon, 02 Jan 2006 15:04:05 -0700`). Feeds are parsed with
//! [`parse_pub_date`] up front; the cutoff is then applied to episodes in
//! feed order.

use crate::types::{Episode, SkipReason};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use thiserror::Error;

/// Date/time layout shared by both accepted formats, minus weekday and zone
const DATE_TIME_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// `pubDate` matched neither accepted format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized publish date '{raw}': {reason}")]
pub struct DateParseError {
    /// Raw date text
    pub raw: String,
    /// Error from the numeric-zone attempt
    pub reason: String,
}

/// Filter verdict for one episode
#[derive(Debug, Clone, PartialEq)]
pub enum FilterDecision {
    /// Download the episode; carries the parsed publish date
    Accept(DateTime<FixedOffset>),
    /// Do not download the episode
    Skip(SkipReason),
}

/// Parse a `pubDate` value
///
/// The leading weekday, when present, is not checked against the date.
///
/// # Examples
///
/// ```
/// use podcast_dl::filter::parse_pub_date;
///
/// let named = parse_pub_date("Fri, 05 Jan 2024 10:00:00 GMT").unwrap();
/// let numeric = parse_pub_date("Fri, 05 Jan 2024 10:00:00 +0000").unwrap();
/// assert_eq!(named, numeric);
/// ```
pub fn parse_pub_date(raw: &str) -> Result<DateTime<FixedOffset>, DateParseError> {
    let trimmed = raw.trim();
    let without_weekday = match trimmed.split_once(',') {
        Some((_, rest)) => rest.trim_start(),
        None => trimmed,
    };

    if let Some(parsed) = parse_named_zone(without_weekday) {
        return Ok(parsed);
    }

    DateTime::parse_from_str(without_weekday, &format!("{} %z", DATE_TIME_FORMAT)).map_err(|e| {
        DateParseError {
            raw: raw.to_string(),
            reason: e.to_string(),
        }
    })
}

/// RFC 1123 with an alphabetic zone abbreviation
fn parse_named_zone(value: &str) -> Option<DateTime<FixedOffset>> {
    let (date_time, zone) = value.rsplit_once(' ')?;
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(date_time.trim_end(), DATE_TIME_FORMAT).ok()?;
    let offset = FixedOffset::east_opt(zone_offset_secs(zone))?;
    offset.from_local_datetime(&naive).single()
}

/// Offset for a zone abbreviation; unknown abbreviations read as UTC
fn zone_offset_secs(zone: &str) -> i32 {
    const HOUR: i32 = 3600;
    match zone.to_ascii_uppercase().as_str() {
        "EST" => -5 * HOUR,
        "EDT" => -4 * HOUR,
        "CST" => -6 * HOUR,
        "CDT" => -5 * HOUR,
        "MST" => -7 * HOUR,
        "MDT" => -6 * HOUR,
        "PST" => -8 * HOUR,
        "PDT" => -7 * HOUR,
        // UT, UTC, GMT, Z and anything unrecognized
        _ => 0,
    }
}

/// Decide whether `episode` should be downloaded under `since`
///
/// An episode published exactly at the cutoff is accepted.
pub fn evaluate(episode: &Episode, since: Option<DateTime<FixedOffset>>) -> FilterDecision {
    let Some(published) = episode.published else {
        return FilterDecision::Skip(SkipReason::UnparsableDate {
            raw: episode.pub_date.clone(),
        });
    };

    match since {
        Some(cutoff) if published < cutoff => {
            FilterDecision::Skip(SkipReason::BeforeCutoff { published })
        }
        _ => FilterDecision::Accept(published),
    }
}

/// Evaluate every episode in feed order
pub fn select_episodes<'a>(
    episodes: &'a [Episode],
    since: Option<DateTime<FixedOffset>>,
) -> impl Iterator<Item = (&'a Episode, FilterDecision)> + 'a {
    episodes
        .iter()
        .map(move |episode| (episode, evaluate(episode, since)))
}
