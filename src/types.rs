//! Core types for podcast-dl

use chrono::{DateTime, FixedOffset};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::Error;

/// Filename template used when none is configured
pub const DEFAULT_FILENAME_TEMPLATE: &str = "{channel}-{date}-{episode}.mp3";

/// Destination directory used when none is configured
pub const DEFAULT_DESTINATION: &str = ".";

/// One feed-to-destination download job
///
/// A task is immutable once built. Defaults (current directory, default
/// template, no cutoff) are applied by [`Task::new`]; the `with_*` methods
/// consume and return the task so construction reads as a chain.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    feed_url: Url,
    destination: PathBuf,
    since: Option<DateTime<FixedOffset>>,
    filename_template: String,
}

impl Task {
    /// Create a task for `feed_url` with default destination and template
    pub fn new(feed_url: Url) -> Self {
        Self {
            feed_url,
            destination: PathBuf::from(DEFAULT_DESTINATION),
            since: None,
            filename_template: DEFAULT_FILENAME_TEMPLATE.to_string(),
        }
    }

    /// Set the destination directory
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Only download episodes published at or after `since`
    pub fn with_since(mut self, since: Option<DateTime<FixedOffset>>) -> Self {
        self.since = since;
        self
    }

    /// Set the filename template
    pub fn with_filename_template(mut self, template: impl Into<String>) -> Self {
        self.filename_template = template.into();
        self
    }

    /// Feed URL
    pub fn feed_url(&self) -> &Url {
        &self.feed_url
    }

    /// Destination directory
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Since-cutoff, if any
    pub fn since(&self) -> Option<DateTime<FixedOffset>> {
        self.since
    }

    /// Filename template
    pub fn filename_template(&self) -> &str {
        &self.filename_template
    }
}

/// A parsed feed: channel title plus episodes in feed order
#[derive(Clone, Debug, PartialEq)]
pub struct Feed {
    /// Channel title
    pub title: String,
    /// Episodes in document order
    pub episodes: Vec<Episode>,
}

/// A single feed item
#[derive(Clone, Debug, PartialEq)]
pub struct Episode {
    /// Item title
    pub title: String,
    /// Raw `pubDate` text
    pub pub_date: String,
    /// Parsed `pubDate`; `None` when it matched neither accepted format
    pub published: Option<DateTime<FixedOffset>>,
    /// Enclosure URL
    pub media_url: Option<String>,
    /// Declared duration as written in the feed
    pub duration: Option<String>,
}

/// Outcome of comparing probed and declared durations
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidationResult {
    /// Declared duration in seconds; `None` when the feed declared none
    pub expected_secs: Option<f64>,
    /// Probed duration in seconds
    pub actual_secs: f64,
    /// Whether the actual duration is inside the tolerance band
    pub within_tolerance: bool,
}

impl ValidationResult {
    /// True when there was nothing to compare against
    pub fn is_skipped(&self) -> bool {
        self.expected_secs.is_none()
    }
}

/// Processing stage of a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStage {
    /// Not started yet
    Pending,
    /// Creating the destination and retrieving the feed
    Fetching,
    /// Parsing publish dates and applying the cutoff
    Filtering,
    /// Rendering the destination filename
    Templating,
    /// Streaming the media file to disk
    Downloading,
    /// Probing and comparing the file duration
    Validating,
    /// All episodes processed
    Done,
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStage::Pending => "pending",
            TaskStage::Fetching => "fetching",
            TaskStage::Filtering => "filtering",
            TaskStage::Templating => "templating",
            TaskStage::Downloading => "downloading",
            TaskStage::Validating => "validating",
            TaskStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// An episode that was written to disk
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadedEpisode {
    /// Episode title
    pub title: String,
    /// Where the file was written
    pub path: PathBuf,
    /// Bytes written
    pub bytes: u64,
    /// Validation outcome when validation ran and did not error
    pub validation: Option<ValidationResult>,
}

/// Why an episode was not downloaded
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// Published strictly before the task's cutoff
    BeforeCutoff {
        /// Parsed publish date
        published: DateTime<FixedOffset>,
    },
    /// `pubDate` matched neither accepted format
    UnparsableDate {
        /// Raw `pubDate` text
        raw: String,
    },
}

/// An episode the filter stage passed over
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedEpisode {
    /// Episode title
    pub title: String,
    /// Reason for skipping
    pub reason: SkipReason,
}

/// A per-episode failure; processing continued with the next episode
#[derive(Debug)]
pub struct EpisodeFailure {
    /// Episode title
    pub title: String,
    /// Stage that failed
    pub stage: TaskStage,
    /// The failure
    pub error: Error,
}

/// Summary of one completed task
#[derive(Debug)]
pub struct TaskReport {
    /// Zero-based position of the task in the batch
    pub index: usize,
    /// Feed URL
    pub feed_url: Url,
    /// Channel title from the feed
    pub channel_title: String,
    /// Episodes written to disk, in feed order
    pub downloaded: Vec<DownloadedEpisode>,
    /// Episodes skipped by the filter, in feed order
    pub skipped: Vec<SkippedEpisode>,
    /// Episodes that failed after passing the filter, in feed order
    pub failures: Vec<EpisodeFailure>,
}

impl TaskReport {
    pub(crate) fn new(index: usize, feed_url: Url, channel_title: String) -> Self {
        Self {
            index,
            feed_url,
            channel_title,
            downloaded: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        }
    }
}

/// Result of running several tasks concurrently
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Reports of tasks that completed, ordered by task index
    pub reports: Vec<TaskReport>,
    /// Task-level errors, ordered by task index
    pub errors: Vec<Error>,
}

impl BatchReport {
    /// True when every task completed
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_defaults() {
        let url = Url::parse("https://example.com/feed.xml").unwrap();
        let task = Task::new(url.clone());

        assert_eq!(task.feed_url(), &url);
        assert_eq!(task.destination(), Path::new("."));
        assert_eq!(task.filename_template(), "{channel}-{date}-{episode}.mp3");
        assert!(task.since().is_none());
    }

    #[test]
    fn task_builder_overrides() {
        let since = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
        let task = Task::new(Url::parse("https://example.com/feed.xml").unwrap())
            .with_destination("/tmp/podcasts")
            .with_since(Some(since))
            .with_filename_template("{episode}.mp3");

        assert_eq!(task.destination(), Path::new("/tmp/podcasts"));
        assert_eq!(task.since(), Some(since));
        assert_eq!(task.filename_template(), "{episode}.mp3");
    }

    #[test]
    fn stage_display() {
        assert_eq!(TaskStage::Fetching.to_string(), "fetching");
        assert_eq!(TaskStage::Validating.to_string(), "validating");
    }
}
