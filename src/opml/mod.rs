//! OPML parsing and feed-hierarchy normalization.
//!
//! Turning OPML text into feed groups happens in three steps:
//!
//! - [`xml`] - Generic XML node tree built with `quick-xml`
//! - [`outline`] - `<body>` outlines extracted into an [`OutlineItem`] tree
//! - [`group`] - Each root outline normalized into a two-level [`FeedGroup`]
//!
//! However deeply the source nests its folders, the output is always a list
//! of named groups, each holding a flat list of feeds.
//!
//! # Example
//!
//! ```
//! use opml_share::opml::parse_opml_str;
//!
//! let groups = parse_opml_str(
//!     r#"<opml><body><outline text="Blogs">
//!          <outline text="Example" xmlUrl="https://example.com/feed.xml"/>
//!        </outline></body></opml>"#,
//! )
//! .unwrap();
//! assert_eq!(groups[0].title, "Blogs");
//! assert_eq!(groups[0].feeds[0].xml_url, "https://example.com/feed.xml");
//! ```

mod export;
mod group;
mod outline;
pub mod xml;

use thiserror::Error;

pub use export::{export_opml, export_to_file};
pub use group::{convert, normalize, Feed, FeedGroup};
pub use outline::{parse_outlines, OutlineItem};

/// Errors that can occur during OPML parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpmlError {
    /// The input is not well-formed XML, or has no `body` element.
    #[error("Invalid OPML: {0}")]
    MalformedInput(String),
}

impl OpmlError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }
}

/// Parses OPML text into feed groups, one per root-level outline.
///
/// Deterministic: the same text always yields equal groups, so callers can
/// store only the raw text and re-parse it on every read.
///
/// # Errors
///
/// Returns [`OpmlError::MalformedInput`] if the content is not well-formed
/// XML or lacks a `body` element. No partial result is ever returned.
pub fn parse_opml_str(content: &str) -> Result<Vec<FeedGroup>, OpmlError> {
    let outlines = parse_outlines(content)?;
    let groups = normalize(outlines);

    tracing::debug!(
        bytes = content.len(),
        groups = groups.len(),
        feeds = groups.iter().map(|g| g.feeds.len()).sum::<usize>(),
        "Parsed OPML"
    );
    Ok(groups)
}

/// Async form of [`parse_opml_str`].
///
/// Yields to the scheduler once before parsing so callers in a cooperative
/// runtime can interleave other work; the parse itself runs to completion.
pub async fn parse_opml(content: &str) -> Result<Vec<FeedGroup>, OpmlError> {
    tokio::task::yield_now().await;
    parse_opml_str(content)
}
