//! Rendering of parsed feed groups for the terminal or as JSON.
use std::fmt::Write;

use serde::Deserialize;

use crate::config::Config;
use crate::opml::FeedGroup;
use crate::util::{sanitize_line, truncate_to_width};

/// Output rendering for parsed groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Options for [`render_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    /// Column budget for titles (0 = unlimited).
    pub title_width: usize,
    pub show_descriptions: bool,
}

impl From<&Config> for TextOptions {
    fn from(config: &Config) -> Self {
        Self {
            title_width: config.title_width,
            show_descriptions: config.show_descriptions,
        }
    }
}

/// Serializes groups as pretty-printed JSON with camelCase feed fields.
pub fn render_json(groups: &[FeedGroup]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(groups)
}

/// Renders groups as an indented listing followed by a summary line.
///
/// ```text
/// Blogs (2 feeds)
///   - Example <https://example.com/feed.xml>
///   - Other <https://other.test/rss>
///
/// Found 2 feeds in 1 group
/// ```
pub fn render_text(groups: &[FeedGroup], options: TextOptions) -> String {
    let mut out = String::new();

    for group in groups {
        let title = sanitize_line(&group.title);
        let _ = writeln!(
            out,
            "{} ({})",
            truncate_to_width(&title, options.title_width),
            plural(group.feeds.len(), "feed")
        );

        for feed in &group.feeds {
            let title = sanitize_line(&feed.title);
            let _ = writeln!(
                out,
                "  - {} <{}>",
                truncate_to_width(&title, options.title_width),
                sanitize_line(&feed.xml_url)
            );
            if options.show_descriptions {
                if let Some(description) = &feed.description {
                    let _ = writeln!(out, "      {}", sanitize_line(description));
                }
            }
        }
        out.push('\n');
    }

    let feeds: usize = groups.iter().map(|g| g.feeds.len()).sum();
    let _ = writeln!(
        out,
        "Found {} in {}",
        plural(feeds, "feed"),
        plural(groups.len(), "group")
    );
    out
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
