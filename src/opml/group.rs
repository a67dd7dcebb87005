use serde::{Deserialize, Serialize};

use super::outline::OutlineItem;

/// A single feed subscription in a [`FeedGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub title: String,
    pub xml_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named, flat collection of feeds: one per root-level outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedGroup {
    pub title: String,
    pub feeds: Vec<Feed>,
}

/// Converts root-level outlines into feed groups, preserving root order.
pub fn normalize(items: Vec<OutlineItem>) -> Vec<FeedGroup> {
    items.into_iter().map(convert).collect()
}

/// Converts one outline into a [`FeedGroup`].
///
/// A feed outline becomes a singleton group titled after the feed; its
/// children are ignored. A folder outline collects its direct feeds first,
/// then the flattened feeds of each nested folder in child order. Nested
/// folder titles are dropped, and folders without children contribute nothing.
pub fn convert(mut item: OutlineItem) -> FeedGroup {
    let title = std::mem::take(&mut item.text);

    match item.xml_url.take() {
        Some(xml_url) => FeedGroup {
            feeds: vec![Feed {
                title: title.clone(),
                xml_url,
                html_url: item.html_url.take(),
                description: item.description.take(),
            }],
            title,
        },
        None => FeedGroup {
            title,
            feeds: flatten(std::mem::take(&mut item.children)),
        },
    }
}

/// Flattens a folder's children with an explicit stack.
///
/// Each stack entry holds the nested folders of one level that are still to
/// be expanded, so a folder's direct feeds always precede its sub-folders'
/// feeds, and sub-folders expand depth-first in child order.
fn flatten(children: Vec<OutlineItem>) -> Vec<Feed> {
    let mut feeds = Vec::new();
    let mut stack: Vec<std::vec::IntoIter<OutlineItem>> = Vec::new();
    let mut level = Some(children);

    loop {
        if let Some(children) = level.take() {
            let mut nested = Vec::new();
            for mut child in children {
                match child.xml_url.take() {
                    Some(xml_url) => feeds.push(Feed {
                        title: std::mem::take(&mut child.text),
                        xml_url,
                        html_url: child.html_url.take(),
                        description: child.description.take(),
                    }),
                    None if !child.children.is_empty() => nested.push(child),
                    None => {}
                }
            }
            stack.push(nested.into_iter());
        }

        let Some(folders) = stack.last_mut() else {
            break;
        };
        match folders.next() {
            Some(mut folder) => level = Some(std::mem::take(&mut folder.children)),
            None => {
                stack.pop();
            }
        }
    }

    feeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feed_item(text: &str, xml_url: &str) -> OutlineItem {
        OutlineItem {
            text: text.to_string(),
            xml_url: Some(xml_url.to_string()),
            html_url: None,
            description: None,
            children: vec![],
        }
    }

    fn folder(text: &str, children: Vec<OutlineItem>) -> OutlineItem {
        OutlineItem {
            text: text.to_string(),
            xml_url: None,
            html_url: None,
            description: None,
            children,
        }
    }

    fn titles(group: &FeedGroup) -> Vec<&str> {
        group.feeds.iter().map(|f| f.title.as_str()).collect()
    }

    #[test]
    fn test_feed_becomes_singleton_group() {
        let item = OutlineItem {
            text: "Solo".to_string(),
            xml_url: Some("https://solo.test/rss".to_string()),
            html_url: Some("https://solo.test".to_string()),
            description: Some("A blog".to_string()),
            children: vec![feed_item("Ignored", "https://ignored.test/rss")],
        };

        assert_eq!(
            convert(item),
            FeedGroup {
                title: "Solo".to_string(),
                feeds: vec![Feed {
                    title: "Solo".to_string(),
                    xml_url: "https://solo.test/rss".to_string(),
                    html_url: Some("https://solo.test".to_string()),
                    description: Some("A blog".to_string()),
                }],
            }
        );
    }

    #[test]
    fn test_direct_feeds_precede_nested_groups() {
        let item = folder(
            "Root",
            vec![
                folder("Sub", vec![feed_item("S1", "https://s1.test")]),
                feed_item("A", "https://a.test"),
                feed_item("B", "https://b.test"),
            ],
        );

        let group = convert(item);
        assert_eq!(group.title, "Root");
        assert_eq!(titles(&group), vec!["A", "B", "S1"]);
    }

    #[test]
    fn test_deep_nesting_flattened() {
        let item = folder(
            "Root",
            vec![
                folder(
                    "L1",
                    vec![
                        folder("L2", vec![feed_item("Deep", "https://deep.test")]),
                        feed_item("Mid", "https://mid.test"),
                    ],
                ),
                folder("Other", vec![feed_item("Last", "https://last.test")]),
            ],
        );

        let group = convert(item);
        assert_eq!(titles(&group), vec!["Mid", "Deep", "Last"]);
        assert!(group
            .feeds
            .iter()
            .all(|f| !["L1", "L2", "Other"].contains(&f.title.as_str())));
    }

    #[test]
    fn test_empty_groups_dropped_from_parent() {
        let item = folder(
            "Root",
            vec![
                folder("Empty", vec![]),
                folder("Hollow", vec![folder("Inner", vec![])]),
                feed_item("Only", "https://only.test"),
            ],
        );

        let group = convert(item);
        assert_eq!(titles(&group), vec!["Only"]);
    }

    #[test]
    fn test_root_group_without_feeds_is_kept_empty() {
        let groups = normalize(vec![
            folder("Empty", vec![]),
            feed_item("Feed", "https://f.test"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].title, "Empty");
        assert!(groups[0].feeds.is_empty());
        assert_eq!(groups[1].title, "Feed");
    }

    #[test]
    fn test_nested_feed_children_not_followed() {
        let item = folder(
            "Root",
            vec![OutlineItem {
                text: "Visible".to_string(),
                xml_url: Some("https://visible.test".to_string()),
                html_url: None,
                description: None,
                children: vec![feed_item("Hidden", "https://hidden.test")],
            }],
        );
        assert_eq!(titles(&convert(item)), vec!["Visible"]);
    }

    #[test]
    fn test_deeply_nested_folders_flattened_in_order() {
        let depth = 50_000;
        let mut item = folder("Bottom", vec![feed_item("Deepest", "https://deepest.test")]);
        for level in (0..depth).rev() {
            let direct = feed_item(&format!("F{}", level), "https://level.test");
            item = folder("level", vec![item, direct]);
        }

        let group = convert(folder("Root", vec![item]));
        assert_eq!(group.feeds.len(), depth + 1);
        assert_eq!(group.feeds[0].title, "F0");
        assert_eq!(group.feeds[depth - 1].title, format!("F{}", depth - 1));
        assert_eq!(group.feeds[depth].title, "Deepest");
    }

    #[test]
    fn test_json_field_names() {
        let group = FeedGroup {
            title: "G".to_string(),
            feeds: vec![Feed {
                title: "F".to_string(),
                xml_url: "https://f.test/rss".to_string(),
                html_url: None,
                description: Some("d".to_string()),
            }],
        };
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "G",
                "feeds": [{ "title": "F", "xmlUrl": "https://f.test/rss", "description": "d" }]
            })
        );
    }
}
