use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::group::FeedGroup;

/// Writes feed groups as an OPML 2.0 document.
///
/// Every group becomes a folder `<outline>` holding one `type="rss"` outline
/// per feed. A singleton group made from a root-level feed is written as a
/// folder around that feed, which parses back to the same group.
pub fn export_opml(groups: &[FeedGroup], title: &str) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("Failed to write XML declaration")?;

    let mut opml = BytesStart::new("opml");
    opml.push_attribute(("version", "2.0"));
    writer
        .write_event(Event::Start(opml))
        .context("Failed to write opml element")?;

    writer
        .write_event(Event::Start(BytesStart::new("head")))
        .context("Failed to write head element")?;
    writer
        .write_event(Event::Start(BytesStart::new("title")))
        .context("Failed to write title element")?;
    writer
        .write_event(Event::Text(BytesText::new(title)))
        .context("Failed to write title text")?;
    writer
        .write_event(Event::End(BytesEnd::new("title")))
        .context("Failed to write title end")?;
    writer
        .write_event(Event::End(BytesEnd::new("head")))
        .context("Failed to write head end")?;

    writer
        .write_event(Event::Start(BytesStart::new("body")))
        .context("Failed to write body element")?;

    for group in groups {
        let mut folder = BytesStart::new("outline");
        folder.push_attribute(("text", group.title.as_str()));
        folder.push_attribute(("title", group.title.as_str()));

        if group.feeds.is_empty() {
            writer
                .write_event(Event::Empty(folder))
                .context("Failed to write empty group")?;
            continue;
        }

        writer
            .write_event(Event::Start(folder))
            .with_context(|| format!("Failed to write group '{}'", group.title))?;

        for feed in &group.feeds {
            let mut outline = BytesStart::new("outline");
            outline.push_attribute(("type", "rss"));
            outline.push_attribute(("text", feed.title.as_str()));
            outline.push_attribute(("title", feed.title.as_str()));
            outline.push_attribute(("xmlUrl", feed.xml_url.as_str()));
            if let Some(ref html_url) = feed.html_url {
                outline.push_attribute(("htmlUrl", html_url.as_str()));
            }
            if let Some(ref description) = feed.description {
                outline.push_attribute(("description", description.as_str()));
            }
            writer
                .write_event(Event::Empty(outline))
                .context("Failed to write outline element")?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("outline")))
            .context("Failed to write group end")?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("body")))
        .context("Failed to write body end")?;
    writer
        .write_event(Event::End(BytesEnd::new("opml")))
        .context("Failed to write opml end")?;

    String::from_utf8(writer.into_inner()).context("Generated OPML contains invalid UTF-8")
}

/// Exports feed groups to an OPML file atomically.
///
/// The document is written to a temporary sibling file, synced, then renamed
/// over `path`, so the destination is never left half-written.
pub fn export_to_file(groups: &[FeedGroup], title: &str, path: &Path) -> Result<()> {
    use std::io::Write;
    use std::time::{SystemTime, UNIX_EPOCH};

    let content = export_opml(groups, title)?;

    // SEC-009: Randomized temp filename to prevent TOCTOU race conditions
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions",
                temp_path.display()
            )
        })?;

    let written = file
        .write_all(content.as_bytes())
        .and_then(|()| file.sync_all());
    drop(file);

    if let Err(e) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e).with_context(|| {
            format!("Failed to write OPML to '{}'", temp_path.display())
        });
    }

    std::fs::rename(&temp_path, path).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}'",
            temp_path.display(),
            path.display()
        )
    })?;

    tracing::info!(path = %path.display(), groups = groups.len(), "Exported OPML");
    Ok(())
}
