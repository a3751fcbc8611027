//! Configuration types for podcast-dl
//!
//! Two kinds of configuration exist:
//! - [`Config`]: the batch document listing tasks, read from YAML (default)
//!   or TOML (`.toml` extension)
//! - [`RunOptions`]: settings that apply to every task in a run, built by the
//!   caller (the CLI) and passed to the runner explicitly

use crate::error::{Error, Result};
use crate::types::Task;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// The only batch document version this build understands
pub const SUPPORTED_API_VERSION: &str = "v1";

/// Batch configuration document
///
/// ```yaml
/// apiVersion: v1
/// tasks:
///   - url: https://example.com/feed.xml
///     destination: ./downloads
///     since: 2024-01-01T00:00:00Z
///     format: "{channel}-{date}-{episode}.mp3"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Document version; must equal [`SUPPORTED_API_VERSION`]
    #[serde(default)]
    pub api_version: String,

    /// Task entries in execution order
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

/// One task entry in the batch document
///
/// Empty strings are treated the same as absent fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Feed URL (required)
    #[serde(default)]
    pub url: String,

    /// Destination directory (default: ".")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,

    /// RFC 3339 cutoff; older episodes are skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,

    /// Filename template (default: "{channel}-{date}-{episode}.mp3")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Document syntax, chosen from the file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (any extension other than `.toml`)
    Yaml,
    /// TOML
    Toml,
}

impl ConfigFormat {
    /// Pick the format for `path`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

impl Config {
    /// Read, parse and version-check the document at `path`
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the file cannot be read, is malformed, or
    /// declares an unsupported version.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&content, ConfigFormat::from_path(path))
    }

    /// Parse and version-check a document
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: Config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| Error::config(format!("malformed YAML config: {}", e)))?,
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| Error::config(format!("malformed TOML config: {}", e)))?,
        };

        config.check_version()?;
        Ok(config)
    }

    fn check_version(&self) -> Result<()> {
        if self.api_version != SUPPORTED_API_VERSION {
            return Err(Error::config_key(
                format!(
                    "unsupported API version '{}' (expected '{}')",
                    self.api_version, SUPPORTED_API_VERSION
                ),
                "apiVersion",
            ));
        }
        Ok(())
    }

    /// Convert every entry into a [`Task`], applying defaults
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first entry with an invalid `url`
    /// or `since`.
    pub fn tasks(&self) -> Result<Vec<Task>> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(i, entry)| entry.to_task(i))
            .collect()
    }
}

impl TaskConfig {
    /// Build a task from this entry; `index` is used in error keys
    pub fn to_task(&self, index: usize) -> Result<Task> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Error::config_key(
                "task has no feed URL",
                format!("tasks[{}].url", index),
            ));
        }
        let feed_url = Url::parse(url).map_err(|e| {
            Error::config_key(
                format!("invalid feed URL '{}': {}", url, e),
                format!("tasks[{}].url", index),
            )
        })?;

        let since = match non_empty(self.since.as_deref()) {
            Some(raw) => Some(DateTime::parse_from_rfc3339(raw).map_err(|e| {
                Error::config_key(
                    format!("invalid RFC 3339 timestamp '{}': {}", raw, e),
                    format!("tasks[{}].since", index),
                )
            })?),
            None => None,
        };

        let mut task = Task::new(feed_url).with_since(since);
        if let Some(destination) = self
            .destination
            .as_ref()
            .filter(|d| !d.as_os_str().is_empty())
        {
            task = task.with_destination(destination.clone());
        }
        if let Some(format) = non_empty(self.format.as_deref()) {
            task = task.with_filename_template(format);
        }
        Ok(task)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Settings shared by every task of a run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunOptions {
    /// Probe each downloaded file and compare with the declared duration
    pub validate: bool,

    /// Per-request timeout (None = wait indefinitely)
    pub request_timeout: Option<Duration>,

    /// Explicit ffprobe binary (None = search PATH)
    pub ffprobe_path: Option<PathBuf>,
}
