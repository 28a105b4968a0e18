use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static COMMENT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("yt-attributed-string#content-text").unwrap());
static TIME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span#published-time-text").unwrap());

/// Comment bodies and timestamp labels, each in document order.
#[derive(Debug, Default)]
pub struct RawNodes {
    pub texts: Vec<String>,
    pub times: Vec<String>,
}

pub fn collect_nodes(html: &str) -> RawNodes {
    let document = Html::parse_document(html);
    RawNodes {
        texts: document.select(&COMMENT_SEL).map(node_text).collect(),
        times: document.select(&TIME_SEL).map(node_text).collect(),
    }
}

fn node_text(element: ElementRef) -> String {
    let joined: String = element.text().collect();
    collapse_whitespace(&joined)
}

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_runs() {
        assert_eq!(collapse_whitespace("  a \n\n b\t\tc  "), "a b c");
        assert_eq!(collapse_whitespace("\n \t"), "");
    }

    #[test]
    fn selects_by_tag_and_id() {
        let html = r#"
            <div>
              <span id="published-time-text"><a>2 days ago</a></span>
              <yt-attributed-string id="content-text"><span>first
                 line</span></yt-attributed-string>
              <yt-attributed-string id="other">ignored</yt-attributed-string>
              <div id="content-text">also ignored</div>
            </div>"#;
        let nodes = collect_nodes(html);
        assert_eq!(nodes.texts, vec!["first line"]);
        assert_eq!(nodes.times, vec!["2 days ago"]);
    }

    #[test]
    fn empty_page() {
        let nodes = collect_nodes("<html><body></body></html>");
        assert!(nodes.texts.is_empty());
        assert!(nodes.times.is_empty());
    }
}
