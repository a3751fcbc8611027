//! Destination filename rendering
//!
//! Templates use three tokens: `{channel}`, `{date}` (`YYYYMMDD`) and
//! `{episode}`. Substitution is plain sequential string replacement in that
//! order, so a channel title containing `{episode}` or `{date}` is expanded
//! again by the later passes.

use crate::utils::underscore_spaces;
use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};

/// Channel title token
pub const CHANNEL_TOKEN: &str = "{channel}";
/// Publish date token
pub const DATE_TOKEN: &str = "{date}";
/// Episode title token
pub const EPISODE_TOKEN: &str = "{episode}";

/// Format used for the `{date}` token
const DATE_FORMAT: &str = "%Y%m%d";

/// Render a filename from `template`
///
/// Spaces and full-width spaces in both titles become `_` before
/// substitution. The date is formatted in the publish date's own offset.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use podcast_dl::template::render_filename;
///
/// let published = DateTime::parse_from_rfc3339("2024-01-05T10:00:00Z").unwrap();
/// let name = render_filename("{channel}-{date}-{episode}.mp3", "My Show", "Ep 1", published);
/// assert_eq!(name, "My_Show-20240105-Ep_1.mp3");
/// ```
#[must_use]
pub fn render_filename(
    template: &str,
    channel_title: &str,
    episode_title: &str,
    published: DateTime<FixedOffset>,
) -> String {
    let channel = underscore_spaces(channel_title);
    let episode = underscore_spaces(episode_title);
    let date = published.format(DATE_FORMAT).to_string();

    template
        .replace(CHANNEL_TOKEN, &channel)
        .replace(DATE_TOKEN, &date)
        .replace(EPISODE_TOKEN, &episode)
}

/// Full destination path: `destination` joined with the rendered filename
#[must_use]
pub fn destination_path(
    destination: &Path,
    template: &str,
    channel_title: &str,
    episode_title: &str,
    published: DateTime<FixedOffset>,
) -> PathBuf {
    destination.join(render_filename(template, channel_title, episode_title, published))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_FILENAME_TEMPLATE;

    fn jan5() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-05T10:00:00Z").unwrap()
    }

    #[test]
    fn test_default_template() {
        let name = render_filename(DEFAULT_FILENAME_TEMPLATE, "My Show", "Ep 1", jan5());
        assert_eq!(name, "My_Show-20240105-Ep_1.mp3");
    }

    #[test]
    fn test_full_width_spaces_replaced() {
        let name = render_filename(
            "{channel}/{episode}",
            "ラジオ\u{3000}番組",
            "第1回\u{3000}開始 編",
            jan5(),
        );
        assert_eq!(name, "ラジオ_番組/第1回_開始_編");
    }

    #[test]
    fn test_repeated_tokens_all_replaced() {
        let name = render_filename("{date}_{date}_{episode}", "c", "e", jan5());
        assert_eq!(name, "20240105_20240105_e");
    }

    #[test]
    fn test_template_without_tokens() {
        assert_eq!(render_filename("fixed.mp3", "c", "e", jan5()), "fixed.mp3");
    }

    #[test]
    fn test_title_containing_token_is_substituted_again() {
        // Channel is substituted first, so its {episode} is expanded by the last pass
        let name = render_filename("{channel}.mp3", "Show {episode}", "Ep 1", jan5());
        assert_eq!(name, "Show_Ep_1.mp3");

        // Episode is substituted last, so its {channel} stays literal
        let name = render_filename("{episode}.mp3", "Show", "About {channel}", jan5());
        assert_eq!(name, "About_{channel}.mp3");
    }

    #[test]
    fn test_date_uses_publish_offset() {
        // 23:30 on Jan 5 in +0900 is still Jan 5 locally, Jan 5 14:30 UTC
        let published = DateTime::parse_from_rfc3339("2024-01-05T23:30:00+09:00").unwrap();
        assert_eq!(render_filename("{date}", "c", "e", published), "20240105");

        // 01:00 on Jan 6 in +0900 is Jan 5 in UTC, but the feed's own date wins
        let published = DateTime::parse_from_rfc3339("2024-01-06T01:00:00+09:00").unwrap();
        assert_eq!(render_filename("{date}", "c", "e", published), "20240106");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let a = render_filename(DEFAULT_FILENAME_TEMPLATE, "A B", "C D", jan5());
        let b = render_filename(DEFAULT_FILENAME_TEMPLATE, "A B", "C D", jan5());
        assert_eq!(a, b);
    }

    #[test]
    fn test_destination_path_joins_directory() {
        let path = destination_path(
            Path::new("/tmp/podcasts"),
            DEFAULT_FILENAME_TEMPLATE,
            "My Show",
            "Ep 1",
            jan5(),
        );
        assert_eq!(
            path,
            PathBuf::from("/tmp/podcasts/My_Show-20240105-Ep_1.mp3")
        );
    }
}
