//! Utility functions shared by the fetch and download stages

use crate::error::{Error, Result};
use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("podcast-dl/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client used for feeds and media
///
/// `timeout` bounds each whole request. `None` leaves requests unbounded, so a
/// stalled server blocks the calling task until the connection drops.
pub fn build_http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(|e| {
        Error::Io(std::io::Error::other(format!(
            "Failed to create HTTP client: {}",
            e
        )))
    })
}

/// Replace regular and full-width spaces with underscores
///
/// # Examples
///
/// ```
/// use podcast_dl::utils::underscore_spaces;
///
/// assert_eq!(underscore_spaces("My Show"), "My_Show");
/// assert_eq!(underscore_spaces("第1回\u{3000}はじめに"), "第1回_はじめに");
/// ```
#[must_use]
pub fn underscore_spaces(title: &str) -> String {
    title.replace([' ', '\u{3000}'], "_")
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_underscore_spaces_mixed() {
        assert_eq!(underscore_spaces("a b\u{3000}c  d"), "a_b_c__d");
        assert_eq!(underscore_spaces("no-spaces"), "no-spaces");
        assert_eq!(underscore_spaces(""), "");
    }

    #[test]
    fn test_underscore_spaces_keeps_tabs() {
        assert_eq!(underscore_spaces("a\tb"), "a\tb");
    }

    #[tokio::test]
    async fn test_client_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ua"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = build_http_client(None).unwrap();
        let response = client
            .get(format!("{}/ua", mock_server.uri()))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    #[test]
    fn test_client_with_timeout_builds() {
        assert!(build_http_client(Some(Duration::from_secs(5))).is_ok());
    }
}
