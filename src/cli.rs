//! Command-line arguments

use chrono::{DateTime, FixedOffset};
use clap::{ArgAction, ArgGroup, Parser};
use podcast_dl::types::{DEFAULT_DESTINATION, DEFAULT_FILENAME_TEMPLATE};
use podcast_dl::{RunOptions, Task};
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use url::Url;

fn parse_since(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s)
        .map_err(|e| format!("expected an RFC 3339 timestamp such as 2024-01-01T00:00:00Z ({e})"))
}

/// Download podcast episodes from RSS feeds.
#[derive(Parser, Debug)]
#[command(name = "podcast-dl", version)]
#[command(group(ArgGroup::new("source").required(true).args(["config", "url"])))]
pub struct Cli {
    /// Batch configuration file (YAML, or TOML with a .toml extension).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Feed URL for a single ad-hoc task.
    #[arg(short, long, value_name = "URL")]
    pub url: Option<Url>,

    /// Destination directory for the single task.
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_DESTINATION)]
    pub dest: PathBuf,

    /// Skip episodes published before this RFC 3339 timestamp.
    #[arg(short, long, value_name = "RFC3339", value_parser = parse_since)]
    pub since: Option<DateTime<FixedOffset>>,

    /// Filename template; {channel}, {date} and {episode} are substituted.
    #[arg(short, long, value_name = "TEMPLATE", default_value = DEFAULT_FILENAME_TEMPLATE)]
    pub format: String,

    /// Check each downloaded file's duration with ffprobe.
    #[arg(long)]
    pub validate: bool,

    /// Per-request timeout in seconds (default: none).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to the ffprobe binary (default: search PATH).
    #[arg(long, value_name = "PATH")]
    pub ffprobe: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Options shared by every task of this run
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            validate: self.validate,
            request_timeout: self.timeout.map(Duration::from_secs),
            ffprobe_path: self.ffprobe.clone(),
        }
    }

    /// The ad-hoc task described by `--url` and its companion flags
    pub fn single_task(&self) -> Option<Task> {
        self.url.as_ref().map(|url| {
            Task::new(url.clone())
                .with_destination(self.dest.clone())
                .with_since(self.since)
                .with_filename_template(self.format.clone())
        })
    }

    /// Default log level; `RUST_LOG` directives are applied on top
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
