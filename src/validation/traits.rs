//! Trait for duration probing

use async_trait::async_trait;
use std::path::Path;

/// Reads the playback duration of a media file
///
/// [`FfprobeHandler`](super::FfprobeHandler) is the production implementation.
///
/// # Examples
///
/// ```no_run
/// use podcast_dl::validation::{DurationProbe, FfprobeHandler};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let probe = FfprobeHandler::from_path().expect("ffprobe not found in PATH");
/// let seconds = probe.probe_duration(Path::new("episode.mp3")).await?;
/// println!("{seconds:.1}s");
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Duration of the file at `path` in seconds
    ///
    /// # Errors
    ///
    /// Returns an error if the probe cannot run or its output has no duration.
    async fn probe_duration(&self, path: &Path) -> crate::Result<f64>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
