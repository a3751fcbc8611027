//! Error types for podcast-dl
//!
//! This module provides the error taxonomy for the download pipeline:
//! - Configuration errors, which abort a run before any task starts
//! - Task errors, which wrap a stage failure and never affect sibling tasks
//! - Stage errors (fetch, parse, download, validation, missing tools), which
//!   are scoped to one task or one episode
//! - Machine-readable error codes for summaries and logs

use crate::types::TaskStage;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for podcast-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for podcast-dl
///
/// Each variant carries enough context (URL, path, task index) to produce a
/// useful message without the caller re-attaching it.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "tasks[1].since")
        key: Option<String>,
    },

    /// A task failed at the given stage
    #[error("task {} failed while {stage}: {source}", .index + 1)]
    Task {
        /// Zero-based position of the task in the batch
        index: usize,
        /// Stage the task was in when it failed
        stage: TaskStage,
        /// Underlying failure
        source: Box<Error>,
    },

    /// A task's unit of execution panicked or was aborted
    #[error("task {} did not finish: {message}", .index + 1)]
    TaskPanicked {
        /// Zero-based position of the task in the batch
        index: usize,
        /// Join error description
        message: String,
    },

    /// Feed could not be retrieved
    #[error("failed to fetch feed {url}: {reason}")]
    Fetch {
        /// Feed URL
        url: String,
        /// What went wrong (network failure or HTTP status)
        reason: String,
    },

    /// Feed content is not a valid RSS document
    #[error("failed to parse feed {url}: {reason}")]
    Parse {
        /// Feed URL
        url: String,
        /// Parser error message
        reason: String,
    },

    /// Episode download failed
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Downloaded file failed duration validation
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Required external tool is not installed
    #[error("required tool '{tool}' was not found")]
    ToolMissing {
        /// Binary name that could not be located
        tool: String,
    },

    /// External tool execution failed (ffprobe)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Download-related errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Episode has no enclosure to download
    #[error("episode '{title}' has no enclosure URL")]
    MissingEnclosure {
        /// Episode title
        title: String,
    },

    /// Request could not be sent or no response arrived
    #[error("request to {url} failed: {reason}")]
    Request {
        /// Media URL
        url: String,
        /// Transport error message
        reason: String,
    },

    /// Server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    HttpStatus {
        /// Media URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Response body stream broke off
    #[error("reading body from {url} failed after {bytes_written} bytes: {reason}")]
    Body {
        /// Media URL
        url: String,
        /// Bytes already written to disk
        bytes_written: u64,
        /// Transport error message
        reason: String,
    },

    /// Target file could not be created
    #[error("failed to create {path}: {source}")]
    CreateFile {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Writing to the target file failed
    #[error("failed to write {path}: {source}")]
    Write {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Duration validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Actual duration is outside the tolerance band
    #[error(
        "duration mismatch for {path}: expected {expected_secs:.1}s ± {tolerance_secs:.1}s, got {actual_secs:.1}s"
    )]
    DurationMismatch {
        /// Validated file
        path: PathBuf,
        /// Declared duration in seconds
        expected_secs: f64,
        /// Probed duration in seconds
        actual_secs: f64,
        /// Allowed deviation in seconds
        tolerance_secs: f64,
    },

    /// Declared duration is neither seconds, MM:SS nor HH:MM:SS
    #[error("invalid declared duration '{0}'")]
    InvalidDeclaredDuration(String),
}

impl Error {
    /// Build a configuration error without a key
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: None,
        }
    }

    /// Build a configuration error pointing at a specific key
    pub fn config_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Zero-based task index for task-level errors
    pub fn task_index(&self) -> Option<usize> {
        match self {
            Error::Task { index, .. } | Error::TaskPanicked { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Get the machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Task { source, .. } => source.error_code(),
            Error::TaskPanicked { .. } => "task_panicked",
            Error::Fetch { .. } => "fetch_error",
            Error::Parse { .. } => "parse_error",
            Error::Download(e) => match e {
                DownloadError::MissingEnclosure { .. } => "missing_enclosure",
                DownloadError::Request { .. } => "download_request_failed",
                DownloadError::HttpStatus { .. } => "download_http_status",
                DownloadError::Body { .. } => "download_body_failed",
                DownloadError::CreateFile { .. } => "file_create_failed",
                DownloadError::Write { .. } => "file_write_failed",
            },
            Error::Validation(e) => match e {
                ValidationError::DurationMismatch { .. } => "duration_mismatch",
                ValidationError::InvalidDeclaredDuration(_) => "invalid_declared_duration",
            },
            Error::ToolMissing { .. } => "tool_missing",
            Error::ExternalTool(_) => "external_tool_error",
            Error::Io(_) => "io_error",
        }
    }
}
