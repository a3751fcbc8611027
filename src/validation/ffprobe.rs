//! Duration probe using the external ffprobe binary

use super::traits::DurationProbe;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Binary looked up on `PATH`
pub const FFPROBE_BINARY: &str = "ffprobe";

/// Probe that runs `ffprobe` and reads `format.duration` from its JSON output
///
/// # Examples
///
/// ```no_run
/// use podcast_dl::validation::FfprobeHandler;
/// use std::path::PathBuf;
///
/// // Explicit path
/// let probe = FfprobeHandler::new(PathBuf::from("/usr/bin/ffprobe"));
///
/// // Or auto-discover from PATH
/// let probe = FfprobeHandler::from_path().expect("ffprobe not found in PATH");
/// ```
#[derive(Clone, Debug)]
pub struct FfprobeHandler {
    binary_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

impl FfprobeHandler {
    /// Create a handler with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find ffprobe in PATH
    ///
    /// Returns `None` when the binary is not installed.
    pub fn from_path() -> Option<Self> {
        which::which(FFPROBE_BINARY).ok().map(Self::new)
    }

    /// Path of the binary this handler runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }
}

/// Extract the duration in seconds from ffprobe's JSON output
fn parse_ffprobe_output(stdout: &[u8]) -> crate::Result<f64> {
    let output: FfprobeOutput = serde_json::from_slice(stdout).map_err(|e| {
        crate::Error::ExternalTool(format!("Unexpected ffprobe output: {}", e))
    })?;

    let raw = output.format.duration.ok_or_else(|| {
        crate::Error::ExternalTool("ffprobe reported no duration".to_string())
    })?;

    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .ok_or_else(|| {
            crate::Error::ExternalTool(format!("ffprobe reported invalid duration '{}'", raw))
        })
}

#[async_trait]
impl DurationProbe for FfprobeHandler {
    async fn probe_duration(&self, path: &Path) -> crate::Result<f64> {
        let output = Command::new(&self.binary_path)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-print_format",
                "json",
            ])
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(crate::Error::ExternalTool(format!(
                "ffprobe failed on {}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        parse_ffprobe_output(&output.stdout)
    }

    fn name(&self) -> &'static str {
        "ffprobe"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_duration() {
        let json = br#"{"format": {"duration": "620.048000"}}"#;
        let secs = parse_ffprobe_output(json).unwrap();
        assert!((secs - 620.048).abs() < 1e-9);
    }

    #[test]
    fn test_parse_output_missing_duration() {
        let json = br#"{"format": {}}"#;
        let err = parse_ffprobe_output(json).unwrap_err();
        assert!(matches!(err, crate::Error::ExternalTool(_)));
    }

    #[test]
    fn test_parse_output_not_a_number() {
        let json = br#"{"format": {"duration": "N/A"}}"#;
        let err = parse_ffprobe_output(json).unwrap_err();
        assert!(err.to_string().contains("N/A"));
    }

    #[test]
    fn test_parse_output_garbage() {
        assert!(parse_ffprobe_output(b"not json").is_err());
    }

    #[test]
    fn test_from_path_consistency_with_which_crate() {
        // Both should agree on whether the binary exists
        let which_result = which::which(FFPROBE_BINARY);
        let from_path_result = FfprobeHandler::from_path();

        assert_eq!(which_result.is_ok(), from_path_result.is_some());
        if let (Ok(expected), Some(handler)) = (which_result, from_path_result) {
            assert_eq!(handler.binary_path(), expected.as_path());
        }
    }

    #[tokio::test]
    async fn test_probe_with_invalid_binary_path() {
        let handler = FfprobeHandler::new(PathBuf::from("/nonexistent/path/to/ffprobe"));

        let result = handler.probe_duration(Path::new("episode.mp3")).await;

        match result {
            Err(crate::Error::ExternalTool(msg)) => {
                assert!(msg.contains("Failed to execute ffprobe"))
            }
            other => panic!("Expected ExternalTool error, got: {:?}", other),
        }
    }

    #[tokio::test]
    #[ignore] // Requires ffprobe binary in PATH
    async fn test_probe_nonexistent_file() {
        let Some(handler) = FfprobeHandler::from_path() else {
            println!("Skipping test: ffprobe binary not found in PATH");
            return;
        };

        let result = handler
            .probe_duration(Path::new("/tmp/nonexistent-episode.mp3"))
            .await;
        assert!(result.is_err());
    }
}
