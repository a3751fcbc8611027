//! Feed retrieval and RSS parsing.
//!
//! A feed is fetched with a single HTTP GET, the whole body is read, and the
//! document is parsed with the `rss` crate into a [`Feed`]. There are no
//! retries: any failure is returned to the caller, which fails the task.

use crate::error::{Error, Result};
use crate::filter::parse_pub_date;
use crate::types::{Episode, Feed};
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;
use url::Url;

/// Retrieves feeds over HTTP
#[derive(Clone, Debug)]
pub struct FeedFetcher {
    /// HTTP client for fetching RSS feeds
    http_client: reqwest::Client,
}

impl FeedFetcher {
    /// Create a fetcher using the given client
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Fetch and parse the feed at `url`
    ///
    /// # Errors
    /// Returns [`Error::Fetch`] if the request fails, the server answers with a
    /// non-success status, or the body cannot be read; returns
    /// [`Error::Parse`] if the body is not a valid RSS document.
    pub async fn fetch(&self, url: &Url) -> Result<Feed> {
        debug!("Fetching RSS feed: {}", url);

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let content = response.bytes().await.map_err(|e| Error::Fetch {
            url: url.to_string(),
            reason: format!("failed to read body: {}", e),
        })?;

        let feed = parse_feed(&content, url.as_str())?;
        debug!(
            "Parsed feed '{}' with {} items",
            feed.title,
            feed.episodes.len()
        );
        Ok(feed)
    }
}

/// Parse RSS content into a [`Feed`]
///
/// `source` is only used for error messages.
pub fn parse_feed(content: &[u8], source: &str) -> Result<Feed> {
    let channel = rss::Channel::read_from(content).map_err(|e| Error::Parse {
        url: source.to_string(),
        reason: e.to_string(),
    })?;

    let plain_durations = plain_item_durations(content);
    let episodes = channel
        .items()
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let pub_date = item.pub_date().unwrap_or("").trim().to_string();
            Episode {
                title: item.title().unwrap_or("").to_string(),
                published: parse_pub_date(&pub_date).ok(),
                pub_date,
                media_url: item
                    .enclosure()
                    .map(|enc| enc.url().trim().to_string())
                    .filter(|url| !url.is_empty()),
                duration: declared_duration(item)
                    .or_else(|| plain_durations.get(position).cloned().flatten()),
            }
        })
        .collect();

    Ok(Feed {
        title: channel.title().to_string(),
        episodes,
    })
}

/// Declared duration: `itunes:duration`, else any prefixed `duration` element
fn declared_duration(item: &rss::Item) -> Option<String> {
    item.itunes_ext()
        .and_then(|ext| ext.duration())
        .or_else(|| {
            item.extensions()
                .values()
                .filter_map(|elements| elements.get("duration"))
                .flatten()
                .find_map(|ext| ext.value())
        })
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// Un-namespaced `<duration>` text per `<item>`, in document order
///
/// The `rss` crate drops unknown elements without a namespace prefix, so
/// these are read in a separate pass over the raw document.
fn plain_item_durations(content: &[u8]) -> Vec<Option<String>> {
    let mut reader = Reader::from_reader(content);
    let mut buf = Vec::new();
    let mut durations: Vec<Option<String>> = Vec::new();
    let mut in_item = false;
    let mut in_duration = false;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => {
                    in_item = true;
                    durations.push(None);
                }
                b"duration" if in_item => {
                    in_duration = true;
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_duration => {
                if let Ok(value) = t.unescape() {
                    text.push_str(&value);
                }
            }
            Ok(Event::CData(t)) if in_duration => {
                text.push_str(&String::from_utf8_lossy(&t));
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"duration" if in_duration => {
                    in_duration = false;
                    let value = text.trim();
                    if let Some(slot) = durations.last_mut().filter(|_| !value.is_empty()) {
                        *slot = Some(value.to_string());
                    }
                }
                b"item" => in_item = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                debug!("Stopped scanning for plain durations: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    durations
}
