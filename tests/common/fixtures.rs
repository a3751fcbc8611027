//! Feed fixtures and mock server helpers

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// One `<item>` in a generated feed
pub struct Item<'a> {
    pub title: &'a str,
    pub pub_date: &'a str,
    /// Path on the mock server serving the media file
    pub media_path: Option<&'a str>,
    pub duration: Option<&'a str>,
}

impl<'a> Item<'a> {
    pub fn new(title: &'a str, pub_date: &'a str, media_path: &'a str) -> Self {
        Self {
            title,
            pub_date,
            media_path: Some(media_path),
            duration: None,
        }
    }
}

/// Build an RSS 2.0 document whose enclosures point at `base`
pub fn rss_feed(base: &str, channel: &str, items: &[Item<'_>]) -> String {
    let mut body = String::new();
    for item in items {
        body.push_str("    <item>\n");
        body.push_str(&format!("      <title>{}</title>\n", item.title));
        body.push_str(&format!("      <pubDate>{}</pubDate>\n", item.pub_date));
        if let Some(media) = item.media_path {
            body.push_str(&format!(
                "      <enclosure url=\"{}{}\" length=\"0\" type=\"audio/mpeg\"/>\n",
                base, media
            ));
        }
        if let Some(duration) = item.duration {
            body.push_str(&format!(
                "      <itunes:duration>{}</itunes:duration>\n",
                duration
            ));
        }
        body.push_str("    </item>\n");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>{}</title>
    <link>https://example.com</link>
    <description>Integration test feed</description>
{}  </channel>
</rss>"#,
        channel, body
    )
}

/// Serve `body` with status 200 at `route`
pub async fn serve(server: &MockServer, route: &str, body: impl Into<Vec<u8>>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into()))
        .mount(server)
        .await;
}
