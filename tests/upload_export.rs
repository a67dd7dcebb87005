//! Integration tests for the upload path: validate a file, keep its raw text,
//! re-parse the stored text, and export the normalized groups.

use opml_share::opml::{export_opml, parse_opml_str, FeedGroup};
use opml_share::render::{render_json, render_text, TextOptions};
use opml_share::upload::{validate_upload, validate_upload_file, UploadError, DEFAULT_MAX_UPLOAD_BYTES};
use pretty_assertions::assert_eq;
use std::path::Path;

const READER_FEEDS: &str = include_str!("fixtures/Reader_Feeds.opml");

#[tokio::test]
async fn test_fixture_upload_accepted() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/Reader_Feeds.opml");
    let validated = validate_upload_file(&path, DEFAULT_MAX_UPLOAD_BYTES)
        .await
        .unwrap();

    assert_eq!(validated.raw, READER_FEEDS);
    assert_eq!(validated.group_count(), 1);
    assert_eq!(validated.feed_count(), 6);
}

#[test]
fn test_stored_raw_text_reparses_identically() {
    let validated = validate_upload(Some(READER_FEEDS.as_bytes()), DEFAULT_MAX_UPLOAD_BYTES).unwrap();
    // Readers only ever see the stored raw text
    assert_eq!(parse_opml_str(&validated.raw).unwrap(), validated.groups);
}

#[test]
fn test_oversized_upload_rejected_before_parsing() {
    let mut content = String::from("<opml><body>");
    while content.len() <= DEFAULT_MAX_UPLOAD_BYTES as usize {
        content.push_str(r#"<outline text="x" xmlUrl="https://x.test/rss"/>"#);
    }
    content.push_str("</body></opml>");

    let err = validate_upload(Some(content.as_bytes()), DEFAULT_MAX_UPLOAD_BYTES).unwrap_err();
    assert!(matches!(err, UploadError::TooLarge { .. }));
}

#[test]
fn test_invalid_upload_reports_cause() {
    let err = validate_upload(Some(b"<opml><body>"), DEFAULT_MAX_UPLOAD_BYTES).unwrap_err();
    let report = format!("{:#}", anyhow::Error::from(err));
    assert!(report.starts_with("Invalid OPML file: Invalid OPML:"), "{}", report);
}

#[test]
fn test_export_of_fixture_round_trips() {
    let groups = parse_opml_str(READER_FEEDS).unwrap();
    let exported = export_opml(&groups, "Reader Feeds").unwrap();
    assert_eq!(parse_opml_str(&exported).unwrap(), groups);
}

#[test]
fn test_fixture_renders() {
    let groups = parse_opml_str(READER_FEEDS).unwrap();

    let text = render_text(
        &groups,
        TextOptions {
            title_width: 0,
            show_descriptions: true,
        },
    );
    assert!(text.starts_with("Feeds (6 feeds)\n"));
    assert!(text.contains("  - Simon Eskildsen <https://sirupsen.com/atom.xml>\n"));
    assert!(text.contains("      Computer things\n"));
    assert!(text.ends_with("Found 6 feeds in 1 group\n"));

    let json: serde_json::Value = serde_json::from_str(&render_json(&groups).unwrap()).unwrap();
    assert_eq!(json[0]["title"], "Feeds");
    assert_eq!(json[0]["feeds"][1]["xmlUrl"], "https://sirupsen.com/atom.xml");
}

#[test]
fn test_rendered_json_deserializes_back_to_groups() {
    let groups = parse_opml_str(READER_FEEDS).unwrap();
    let json = render_json(&groups).unwrap();
    let restored: Vec<FeedGroup> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, groups);
}

#[test]
fn test_json_without_optional_fields_deserializes() {
    let restored: Vec<FeedGroup> = serde_json::from_str(
        r#"[{ "title": "G", "feeds": [{ "title": "F", "xmlUrl": "https://f.test/rss" }] }]"#,
    )
    .unwrap();
    assert_eq!(restored[0].feeds[0].html_url, None);
    assert_eq!(restored[0].feeds[0].description, None);
}
