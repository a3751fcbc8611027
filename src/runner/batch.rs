//! Concurrent execution of several tasks

use super::TaskRunner;
use crate::error::Error;
use crate::types::{BatchReport, Task, TaskReport};
use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{Instrument, info, info_span};

impl TaskRunner {
    /// Run every task concurrently and wait for all of them
    ///
    /// Each task runs in its own tokio task. Task-level errors are sent over a
    /// channel that is drained only after every task has finished, so no task
    /// observes another's outcome. Reports and errors come back ordered by
    /// task index regardless of completion order.
    pub async fn run_all(&self, tasks: Vec<Task>) -> BatchReport {
        let total = tasks.len();
        let (error_tx, mut error_rx) = mpsc::unbounded_channel::<Error>();

        let handles: Vec<_> = tasks
            .into_iter()
            .enumerate()
            .map(|(index, task)| {
                let runner = self.clone();
                let error_tx = error_tx.clone();
                tokio::spawn(
                    async move {
                        info!("running task {}/{}", index + 1, total);
                        match runner.run_task(index, &task).await {
                            Ok(report) => Some(report),
                            Err(e) => {
                                // Receiver outlives every task
                                error_tx.send(e).ok();
                                None
                            }
                        }
                    }
                    .instrument(info_span!("batch")),
                )
            })
            .collect();
        drop(error_tx);

        let mut batch = BatchReport::default();
        for (index, joined) in join_all(handles).await.into_iter().enumerate() {
            match joined {
                Ok(Some(report)) => batch.reports.push(report),
                Ok(None) => {}
                Err(e) => batch.errors.push(Error::TaskPanicked {
                    index,
                    message: e.to_string(),
                }),
            }
        }

        while let Some(err) = error_rx.recv().await {
            batch.errors.push(err);
        }

        batch.reports.sort_by_key(|r: &TaskReport| r.index);
        batch
            .errors
            .sort_by_key(|e| e.task_index().unwrap_or(usize::MAX));

        info!(
            total,
            succeeded = batch.reports.len(),
            failed = batch.errors.len(),
            "all tasks finished"
        );
        batch
    }
}
