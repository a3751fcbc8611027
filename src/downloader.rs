//! Media download stage
//!
//! Streams a response body into a newly created (truncating) file. A transfer
//! that fails midway leaves the partial file on disk; nothing is rolled back.

use crate::error::{DownloadError, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Streams remote resources to local files
#[derive(Clone, Debug)]
pub struct Downloader {
    http_client: reqwest::Client,
}

impl Downloader {
    /// Create a downloader using the given client
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Download `url` to `target`, returning the number of bytes written
    ///
    /// The request is sent before the file is created, so a non-success status
    /// never touches an existing file at `target`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] (wrapped in [`crate::Error::Download`]) on a
    /// transport failure, a non-success status, or a local create/write failure.
    pub async fn download(&self, url: &str, target: &Path) -> Result<u64> {
        let mut response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let mut file = File::create(target)
            .await
            .map_err(|source| DownloadError::CreateFile {
                path: target.to_path_buf(),
                source,
            })?;

        let mut bytes_written: u64 = 0;
        loop {
            let chunk = response.chunk().await.map_err(|e| DownloadError::Body {
                url: url.to_string(),
                bytes_written,
                reason: e.to_string(),
            })?;
            let Some(chunk) = chunk else {
                break;
            };

            file.write_all(&chunk)
                .await
                .map_err(|source| DownloadError::Write {
                    path: target.to_path_buf(),
                    source,
                })?;
            bytes_written += chunk.len() as u64;
        }

        file.flush().await.map_err(|source| DownloadError::Write {
            path: target.to_path_buf(),
            source,
        })?;

        debug!(url, path = ?target, bytes = bytes_written, "download finished");
        Ok(bytes_written)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::utils::build_http_client;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn downloader() -> Downloader {
        Downloader::new(build_http_client(None).unwrap())
    }

    #[tokio::test]
    async fn test_download_writes_body() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server = MockServer::start().await;
        let body: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

        Mock::given(method("GET"))
            .and(path("/ep1.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&mock_server)
            .await;

        let target = temp_dir.path().join("ep1.mp3");
        let url = format!("{}/ep1.mp3", mock_server.uri());
        let written = downloader().download(&url, &target).await.unwrap();

        assert_eq!(written, body.len() as u64);
        assert_eq!(std::fs::read(&target).unwrap(), body);
    }

    #[tokio::test]
    async fn test_download_truncates_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/short.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
            .mount(&mock_server)
            .await;

        let target = temp_dir.path().join("short.mp3");
        std::fs::write(&target, b"much longer previous content").unwrap();

        let url = format!("{}/short.mp3", mock_server.uri());
        downloader().download(&url, &target).await.unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_download_http_404_leaves_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.mp3"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let target = temp_dir.path().join("gone.mp3");
        let url = format!("{}/gone.mp3", mock_server.uri());
        let result = downloader().download(&url, &target).await;

        match result {
            Err(Error::Download(DownloadError::HttpStatus { status, .. })) => {
                assert_eq!(status, 404)
            }
            other => panic!("Expected HttpStatus error, got: {:?}", other),
        }
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_download_into_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ep.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"audio".to_vec()))
            .mount(&mock_server)
            .await;

        let target = temp_dir.path().join("does-not-exist").join("ep.mp3");
        let url = format!("{}/ep.mp3", mock_server.uri());
        let result = downloader().download(&url, &target).await;

        assert!(
            matches!(
                result,
                Err(Error::Download(DownloadError::CreateFile { .. }))
            ),
            "Expected CreateFile error, got: {:?}",
            result
        );
    }

    #[tokio::test]
    async fn test_download_connection_refused() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("ep.mp3");

        let result = downloader()
            .download("http://127.0.0.1:1/ep.mp3", &target)
            .await;

        assert!(
            matches!(result, Err(Error::Download(DownloadError::Request { .. }))),
            "Expected Request error, got: {:?}",
            result
        );
    }
}
