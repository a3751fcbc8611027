use clap::Parser;
use podcast_dl::{BatchReport, Config, Task, TaskReport, TaskRunner};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
use cli::Cli;

/// How a run ended, mapped to the process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(cli.log_level().into())
                .from_env_lossy(),
        )
        .init();

    let runner = match TaskRunner::new(&cli.run_options()) {
        Ok(runner) => runner,
        Err(e) => {
            error!(error = %e, "failed to initialise");
            return ExitCode::FAILURE;
        }
    };

    let outcome = if let Some(path) = &cli.config {
        run_batch(&runner, path).await
    } else if let Some(task) = cli.single_task() {
        run_single(&runner, &task).await
    } else {
        error!("either --config or --url is required");
        Outcome::Failure
    };

    outcome.into()
}

/// Single ad-hoc task; a task-level error fails the run
async fn run_single(runner: &TaskRunner, task: &Task) -> Outcome {
    match runner.run_task(0, task).await {
        Ok(report) => {
            print_report(&report);
            Outcome::Success
        }
        Err(e) => {
            error!(code = e.error_code(), "{}", e);
            Outcome::Failure
        }
    }
}

/// Batch from a config file; only an unusable config fails the run
async fn run_batch(runner: &TaskRunner, path: &Path) -> Outcome {
    let tasks = match Config::load(path).and_then(|config| config.tasks()) {
        Ok(tasks) => tasks,
        Err(e) => {
            error!(code = e.error_code(), "{}", e);
            return Outcome::Failure;
        }
    };

    info!(config = %path.display(), tasks = tasks.len(), "loaded config");
    let batch = runner.run_all(tasks).await;
    print_batch(&batch);

    // Failed tasks are reported but do not change the exit status
    Outcome::Success
}

fn print_batch(batch: &BatchReport) {
    for report in &batch.reports {
        print_report(report);
    }
    for e in &batch.errors {
        error!(code = e.error_code(), "{}", e);
    }
    if !batch.is_success() {
        warn!(failed = batch.errors.len(), "some tasks did not complete");
    }
}

fn print_report(report: &TaskReport) {
    println!(
        "task {}: {} ({}): {} downloaded, {} skipped, {} failed",
        report.index + 1,
        report.channel_title,
        report.feed_url,
        report.downloaded.len(),
        report.skipped.len(),
        report.failures.len()
    );
    for episode in &report.downloaded {
        println!("  + {} -> {}", episode.title, episode.path.display());
    }
    for failure in &report.failures {
        println!("  ! {} ({}): {}", failure.title, failure.stage, failure.error);
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use podcast_dl::RunOptions;
    use tempfile::TempDir;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel><title>Exit Codes</title><link>https://example.com</link><description>d</description>
<item><title>Ep 1</title><pubDate>Fri, 05 Jan 2024 10:00:00 GMT</pubDate></item>
</channel>
</rss>"#;

    fn runner() -> TaskRunner {
        TaskRunner::new(&RunOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn test_batch_with_failed_task_succeeds() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("podcasts.yaml");
        std::fs::write(
            &config_path,
            format!(
                "apiVersion: v1\ntasks:\n  - url: \"{}\"\n    destination: \"{}\"\n",
                "http://127.0.0.1:1/feed.xml",
                dir.path().join("out").display()
            ),
        )
        .unwrap();

        assert_eq!(run_batch(&runner(), &config_path).await, Outcome::Success);
    }

    #[tokio::test]
    async fn test_batch_with_bad_config_fails() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("podcasts.yaml");
        std::fs::write(&config_path, "apiVersion: v2\ntasks: []\n").unwrap();

        assert_eq!(run_batch(&runner(), &config_path).await, Outcome::Failure);

        let missing = dir.path().join("missing.yaml");
        assert_eq!(run_batch(&runner(), &missing).await, Outcome::Failure);
    }

    #[tokio::test]
    async fn test_single_task_outcome_follows_task_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let ok = Task::new(Url::parse(&format!("{}/feed.xml", server.uri())).unwrap())
            .with_destination(dir.path());
        assert_eq!(run_single(&runner(), &ok).await, Outcome::Success);

        let unreachable = Task::new(Url::parse("http://127.0.0.1:1/feed.xml").unwrap())
            .with_destination(dir.path());
        assert_eq!(run_single(&runner(), &unreachable).await, Outcome::Failure);
    }
}
