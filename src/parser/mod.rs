pub mod category;
pub mod markup;

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{RaffleError, Result};
use crate::source;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Relative time as shown on the page, e.g. "3 days ago".
    pub timestamp_label: String,
    pub text: String,
    pub category: String,
}

impl Comment {
    #[cfg(test)]
    pub fn new(timestamp_label: &str, text: &str, category: &str) -> Self {
        Self {
            timestamp_label: timestamp_label.to_string(),
            text: text.to_string(),
            category: category.to_string(),
        }
    }
}

/// Read the saved page at `path` and extract its comments.
pub fn load_comments(path: &Path, keywords: &[String], verbose: bool) -> Result<Vec<Comment>> {
    let html = source::read_text(path)?;
    extract_comments(path, &html, keywords, verbose)
}

/// Two passes: markup → (text, time) node lists → categorized comments.
///
/// The i-th timestamp node belongs to the i-th comment node; a page where the
/// counts differ is rejected rather than zipped short.
pub fn extract_comments(
    path: &Path,
    html: &str,
    keywords: &[String],
    verbose: bool,
) -> Result<Vec<Comment>> {
    let nodes = markup::collect_nodes(html);
    if nodes.texts.len() != nodes.times.len() {
        return Err(RaffleError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: format!(
                "{} comment nodes but {} timestamp nodes",
                nodes.texts.len(),
                nodes.times.len()
            ),
        });
    }

    let comments: Vec<Comment> = nodes
        .times
        .into_iter()
        .zip(nodes.texts)
        .map(|(timestamp_label, text)| {
            let category = category::classify(&text, keywords);
            Comment {
                timestamp_label,
                text,
                category,
            }
        })
        .collect();

    for c in &comments {
        if verbose {
            info!(time = %c.timestamp_label, category = %c.category, "{}", c.text);
        } else {
            debug!(time = %c.timestamp_label, category = %c.category, "{}", c.text);
        }
    }
    info!(source = %path.display(), count = comments.len(), "Extracted comments");

    Ok(comments)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        vec!["지메일".to_string(), "네이버".to_string()]
    }

    fn parse(fixture: &str) -> Result<Vec<Comment>> {
        let path = format!("tests/fixtures/{}.html", fixture);
        let html = std::fs::read_to_string(&path).unwrap();
        extract_comments(Path::new(&path), &html, &keywords(), false)
    }

    #[test]
    fn fixture_comments_in_order() {
        let comments = parse("comments").unwrap();
        assert_eq!(comments.len(), 6);
        assert_eq!(comments[0].timestamp_label, "2일 전");
        assert_eq!(comments[0].text, "응모합니다 alice_01 지메일");
        assert_eq!(comments[0].category, "지메일");
        assert_eq!(comments[1].category, "네이버");
        assert_eq!(comments[2].category, category::OTHER);
    }

    #[test]
    fn fixture_multiline_text_collapsed() {
        let comments = parse("comments").unwrap();
        assert!(comments.iter().all(|c| !c.text.contains('\n')));
        assert!(comments.iter().all(|c| !c.text.contains("  ")));
        assert_eq!(comments[3].text, "12345 bob-99 네이버로 부탁드려요");
    }

    #[test]
    fn mismatched_node_counts_rejected() {
        let err = parse("mismatched").unwrap_err();
        match err {
            RaffleError::SourceUnreadable { reason, .. } => {
                assert!(reason.contains("2 comment nodes"));
                assert!(reason.contains("1 timestamp nodes"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_page_is_valid() {
        let comments =
            extract_comments(Path::new("empty.html"), "<html></html>", &keywords(), true).unwrap();
        assert!(comments.is_empty());
    }

    #[test]
    fn missing_source_propagates() {
        let err = load_comments(Path::new("tests/fixtures/nope.html"), &keywords(), false)
            .unwrap_err();
        assert!(matches!(err, RaffleError::SourceNotFound { .. }));
    }
}
