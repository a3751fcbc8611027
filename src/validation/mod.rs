//! Post-download duration validation
//!
//! The probed duration of a downloaded file is compared against the duration
//! the feed declared for the episode, allowing a ±5% band.
//!
//! ## Architecture
//!
//! - [`DurationProbe`]: trait for anything that can read a file's duration
//! - [`FfprobeHandler`]: probe backed by the external `ffprobe` binary
//! - [`DurationValidator`]: combines a probe with the declared-duration rules
//!
//! A validator built without a probe reports [`Error::ToolMissing`] for every
//! file instead of failing at construction, so one missing binary only
//! affects the episodes that asked for validation.

mod duration;
mod ffprobe;
mod traits;

pub use duration::{
    DURATION_TOLERANCE_RATIO, compare_durations, parse_declared_duration, tolerance_for,
};
pub use ffprobe::{FFPROBE_BINARY, FfprobeHandler};
pub use traits::DurationProbe;

use crate::error::{Error, Result, ValidationError};
use crate::types::ValidationResult;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Validates downloaded files against their declared duration
#[derive(Clone)]
pub struct DurationValidator {
    probe: Option<Arc<dyn DurationProbe>>,
}

impl fmt::Debug for DurationValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DurationValidator")
            .field("probe", &self.probe.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl DurationValidator {
    /// Create a validator backed by `probe`
    pub fn new(probe: Arc<dyn DurationProbe>) -> Self {
        Self { probe: Some(probe) }
    }

    /// Validator with no probe; every validation fails with [`Error::ToolMissing`]
    pub fn unavailable() -> Self {
        Self { probe: None }
    }

    /// Use ffprobe from `binary` if given, otherwise from PATH
    pub fn ffprobe(binary: Option<&Path>) -> Self {
        let located = match binary {
            Some(path) => which::which(path).ok().map(FfprobeHandler::new),
            None => FfprobeHandler::from_path(),
        };

        match located {
            Some(handler) => Self::new(Arc::new(handler)),
            None => Self::unavailable(),
        }
    }

    /// Whether a probe is available
    pub fn is_available(&self) -> bool {
        self.probe.is_some()
    }

    /// Probe `path` and compare with the `declared` duration
    ///
    /// Returns a skipped result when nothing was declared.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolMissing`] when no probe is available
    /// - probe errors (usually [`Error::ExternalTool`])
    /// - [`ValidationError::InvalidDeclaredDuration`] for an unreadable declaration
    /// - [`ValidationError::DurationMismatch`] when outside the tolerance band
    pub async fn validate(&self, path: &Path, declared: Option<&str>) -> Result<ValidationResult> {
        let probe = self.probe.as_ref().ok_or_else(|| Error::ToolMissing {
            tool: FFPROBE_BINARY.to_string(),
        })?;

        let actual_secs = probe.probe_duration(path).await?;
        let expected_secs = match declared {
            Some(raw) => parse_declared_duration(raw)?,
            None => None,
        };

        let result = compare_durations(expected_secs, actual_secs);
        debug!(
            probe = probe.name(),
            ?path,
            ?expected_secs,
            actual_secs,
            within_tolerance = result.within_tolerance,
            "duration probed"
        );

        match expected_secs {
            Some(expected_secs) if !result.within_tolerance => {
                Err(ValidationError::DurationMismatch {
                    path: path.to_path_buf(),
                    expected_secs,
                    actual_secs,
                    tolerance_secs: tolerance_for(expected_secs),
                }
                .into())
            }
            _ => Ok(result),
        }
    }
}
