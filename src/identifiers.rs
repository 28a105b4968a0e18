use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::parser::Comment;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9_-]+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IdentifierRecord {
    pub identifier: String,
    pub category: String,
}

impl IdentifierRecord {
    pub fn new(identifier: &str, category: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            category: category.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<IdentifierRecord>,
    pub count_identifier_like: usize,
    pub count_numeric_only: usize,
}

/// First token in `text` that is not purely digits, plus the digit-only
/// tokens passed over before it.
pub fn first_identifier(text: &str) -> (Option<&str>, Vec<&str>) {
    let mut numeric = Vec::new();
    for m in TOKEN_RE.find_iter(text) {
        let token = m.as_str();
        if token.bytes().all(|b| b.is_ascii_digit()) {
            numeric.push(token);
        } else {
            return (Some(token), numeric);
        }
    }
    (None, numeric)
}

/// At most one identifier per comment, tagged with the comment's category.
pub fn extract(comments: &[Comment], verbose: bool) -> Extraction {
    let mut out = Extraction::default();

    for comment in comments {
        let (found, numeric) = first_identifier(&comment.text);
        for token in &numeric {
            if verbose {
                info!("not an identifier: {}", token);
            } else {
                debug!("not an identifier: {}", token);
            }
        }
        out.count_numeric_only += numeric.len();
        match found {
            Some(id) => {
                if verbose {
                    info!(category = %comment.category, "identifier: {}", id);
                } else {
                    debug!(category = %comment.category, "identifier: {}", id);
                }
                out.count_identifier_like += 1;
                out.records.push(IdentifierRecord::new(id, &comment.category));
            }
            None => debug!("no identifier in: {}", comment.text),
        }
    }

    info!(
        identifiers = out.count_identifier_like,
        numeric_only = out.count_numeric_only,
        "Extracted identifiers"
    );
    out
}
