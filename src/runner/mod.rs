//! Task execution pipeline.
//!
//! A task moves through `pending → fetching → filtering → (per episode:
//! templating → downloading → [validating]) → done`. Failures before the
//! per-episode loop abort the task and come back as [`Error::Task`]. Failures
//! inside the loop are recorded in the [`TaskReport`] and the loop moves on to
//! the next episode.
//!
//! Batch execution lives in [`batch`](self::batch): every task gets its own
//! tokio task and nothing is shared between them except the error channel.

mod batch;

use crate::config::RunOptions;
use crate::downloader::Downloader;
use crate::error::{DownloadError, Error, Result};
use crate::feed::FeedFetcher;
use crate::filter::{self, FilterDecision};
use crate::template;
use crate::types::{
    DownloadedEpisode, Episode, EpisodeFailure, SkipReason, SkippedEpisode, Task, TaskReport,
    TaskStage,
};
use crate::utils::build_http_client;
use crate::validation::DurationValidator;
use chrono::{DateTime, FixedOffset};
use tracing::{Instrument, debug, info, info_span, warn};

/// Runs tasks through the fetch → filter → download → validate pipeline
///
/// The runner is cheap to clone; clones share the HTTP connection pool and
/// the duration probe.
#[derive(Clone, Debug)]
pub struct TaskRunner {
    fetcher: FeedFetcher,
    downloader: Downloader,
    /// Present only when validation was requested
    validator: Option<DurationValidator>,
}

impl TaskRunner {
    /// Build a runner from run options
    ///
    /// When validation is requested but ffprobe cannot be found, the runner
    /// is still built; each validation then reports the missing tool.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(options: &RunOptions) -> Result<Self> {
        let http_client = build_http_client(options.request_timeout)?;

        let validator = if options.validate {
            let validator = DurationValidator::ffprobe(options.ffprobe_path.as_deref());
            if !validator.is_available() {
                warn!("ffprobe was not found; downloaded episodes cannot be validated");
            }
            Some(validator)
        } else {
            None
        };

        Ok(Self::with_components(
            FeedFetcher::new(http_client.clone()),
            Downloader::new(http_client),
            validator,
        ))
    }

    /// Assemble a runner from explicit components
    pub fn with_components(
        fetcher: FeedFetcher,
        downloader: Downloader,
        validator: Option<DurationValidator>,
    ) -> Self {
        Self {
            fetcher,
            downloader,
            validator,
        }
    }

    /// Run one task to completion
    ///
    /// `index` is the task's zero-based position, used for error keys and
    /// log context.
    ///
    /// # Errors
    /// Returns [`Error::Task`] if the destination cannot be created or the
    /// feed cannot be fetched or parsed. Per-episode failures are reported in
    /// the returned [`TaskReport`] instead.
    pub async fn run_task(&self, index: usize, task: &Task) -> Result<TaskReport> {
        self.execute(index, task)
            .instrument(info_span!("task", number = index + 1))
            .await
    }

    async fn execute(&self, index: usize, task: &Task) -> Result<TaskReport> {
        let task_error = |stage: TaskStage, source: Error| Error::Task {
            index,
            stage,
            source: Box::new(source),
        };

        info!(
            url = %task.feed_url(),
            destination = %task.destination().display(),
            "starting task"
        );

        tokio::fs::create_dir_all(task.destination())
            .await
            .map_err(|e| {
                let source = std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to create destination {}: {}",
                        task.destination().display(),
                        e
                    ),
                );
                task_error(TaskStage::Fetching, Error::Io(source))
            })?;

        let feed = self
            .fetcher
            .fetch(task.feed_url())
            .await
            .map_err(|e| task_error(TaskStage::Fetching, e))?;

        debug!(stage = %TaskStage::Filtering, items = feed.episodes.len(), "filtering episodes");
        let mut report = TaskReport::new(index, task.feed_url().clone(), feed.title.clone());

        for (episode, decision) in filter::select_episodes(&feed.episodes, task.since()) {
            match decision {
                FilterDecision::Accept(published) => {
                    self.process_episode(task, &feed.title, episode, published, &mut report)
                        .await;
                }
                FilterDecision::Skip(reason) => {
                    match &reason {
                        SkipReason::UnparsableDate { raw } => warn!(
                            episode = %episode.title,
                            pub_date = %raw,
                            "unparsable publish date, skipping episode"
                        ),
                        SkipReason::BeforeCutoff { published } => info!(
                            episode = %episode.title,
                            published = %published.to_rfc3339(),
                            "published before cutoff, skipping episode"
                        ),
                    }
                    report.skipped.push(SkippedEpisode {
                        title: episode.title.clone(),
                        reason,
                    });
                }
            }
        }

        info!(
            stage = %TaskStage::Done,
            downloaded = report.downloaded.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "task finished"
        );
        Ok(report)
    }

    /// Template, download and optionally validate one accepted episode
    async fn process_episode(
        &self,
        task: &Task,
        channel_title: &str,
        episode: &Episode,
        published: DateTime<FixedOffset>,
        report: &mut TaskReport,
    ) {
        let path = template::destination_path(
            task.destination(),
            task.filename_template(),
            channel_title,
            &episode.title,
            published,
        );
        debug!(
            stage = %TaskStage::Templating,
            episode = %episode.title,
            path = %path.display(),
            "rendered filename"
        );

        let Some(media_url) = episode.media_url.as_deref() else {
            warn!(episode = %episode.title, "episode has no enclosure, skipping download");
            report.failures.push(EpisodeFailure {
                title: episode.title.clone(),
                stage: TaskStage::Downloading,
                error: DownloadError::MissingEnclosure {
                    title: episode.title.clone(),
                }
                .into(),
            });
            return;
        };

        info!(episode = %episode.title, url = media_url, "downloading episode");
        let bytes = match self.downloader.download(media_url, &path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(episode = %episode.title, error = %e, "download failed");
                report.failures.push(EpisodeFailure {
                    title: episode.title.clone(),
                    stage: TaskStage::Downloading,
                    error: e,
                });
                return;
            }
        };
        info!(path = %path.display(), bytes, "download complete");

        let validation = match &self.validator {
            Some(validator) => {
                match validator.validate(&path, episode.duration.as_deref()).await {
                    Ok(result) => {
                        if result.is_skipped() {
                            info!(
                                path = %path.display(),
                                "no declared duration, skipping validation"
                            );
                        } else {
                            info!(
                                path = %path.display(),
                                actual_secs = result.actual_secs,
                                "validation passed"
                            );
                        }
                        Some(result)
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "validation failed");
                        report.failures.push(EpisodeFailure {
                            title: episode.title.clone(),
                            stage: TaskStage::Validating,
                            error: e,
                        });
                        None
                    }
                }
            }
            None => None,
        };

        report.downloaded.push(DownloadedEpisode {
            title: episode.title.clone(),
            path,
            bytes,
            validation,
        });
    }
}
