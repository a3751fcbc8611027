//! # podcast-dl
//!
//! Download podcast episodes from RSS feeds.
//!
//! A [`Task`] names a feed, a destination directory, an optional cutoff
//! date and a filename template. Running a task fetches the feed, skips
//! episodes published before the cutoff, writes every remaining episode's
//! media file under a templated name and, on request, checks each file's
//! duration with `ffprobe` against the duration the feed declared.
//!
//! Several tasks can be run concurrently from a batch [`Config`] document;
//! a failing task never affects the others.
//!
//! ## Quick Start
//!
//! ```no_run
//! use podcast_dl::{RunOptions, Task, TaskRunner};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let task = Task::new(Url::parse("https://example.com/feed.xml")?)
//!         .with_destination("./downloads");
//!
//!     let runner = TaskRunner::new(&RunOptions::default())?;
//!     let report = runner.run_task(0, &task).await?;
//!
//!     for episode in &report.downloaded {
//!         println!("{} -> {}", episode.title, episode.path.display());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Media file download
pub mod downloader;
/// Error types
pub mod error;
/// RSS feed retrieval and parsing
pub mod feed;
/// Publish-date parsing and cutoff filtering
pub mod filter;
/// Task execution
pub mod runner;
/// Filename templating
pub mod template;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;
/// Duration validation
pub mod validation;

pub use config::{Config, RunOptions};
pub use error::{DownloadError, Error, Result, ValidationError};
pub use runner::TaskRunner;
pub use types::{
    BatchReport, DownloadedEpisode, Episode, Feed, Task, TaskReport, TaskStage, ValidationResult,
};
pub use validation::DurationValidator;
