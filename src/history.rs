use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::identifiers::IdentifierRecord;
use crate::parser::Comment;

const SEPARATOR: &str = ", ";

/// Pipeline stage whose output is being saved; decides the file label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Comments,
    Eligible,
    Overdue,
    Identifiers,
    Deduplicated,
    Duplicates,
    Draw,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Comments => "all-comments",
            Stage::Eligible => "overdue-removed",
            Stage::Overdue => "overdue",
            Stage::Identifiers => "identifiers",
            Stage::Deduplicated => "duplicates-removed",
            Stage::Duplicates => "duplicates",
            Stage::Draw => "draw-result",
        }
    }
}

/// A record that can be written as one delimited line.
pub trait Row {
    fn fields(&self) -> Vec<&str>;
}

impl Row for Comment {
    fn fields(&self) -> Vec<&str> {
        vec![self.timestamp_label.as_str(), self.text.as_str(), self.category.as_str()]
    }
}

impl Row for IdentifierRecord {
    fn fields(&self) -> Vec<&str> {
        vec![self.identifier.as_str(), self.category.as_str()]
    }
}

impl Row for String {
    fn fields(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

pub fn file_path(dir: &Path, stage: Stage, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}_{}.txt", date.format("%Y-%m-%d"), stage.label()))
}

/// Write `rows` to `<dir>/<date>_<label>.txt`, replacing any same-day file.
pub fn save_rows<R: Row>(
    dir: &Path,
    stage: Stage,
    date: NaiveDate,
    rows: &[R],
) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = file_path(dir, stage, date);
    let mut out = BufWriter::new(File::create(&path)?);
    for row in rows {
        writeln!(out, "{}", row.fields().join(SEPARATOR))?;
    }
    out.flush()?;
    info!(path = %path.display(), rows = rows.len(), "Saved {}", stage.label());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 9).unwrap()
    }

    #[test]
    fn names_file_by_date_and_stage() {
        let p = file_path(Path::new("data"), Stage::Deduplicated, date());
        assert_eq!(p, Path::new("data/2025-01-09_duplicates-removed.txt"));
    }

    #[test]
    fn writes_comment_rows() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            Comment::new("2일 전", "hello alice", "other"),
            Comment::new("3 days ago", "bob 네이버", "네이버"),
        ];
        let path = save_rows(dir.path(), Stage::Comments, date(), &rows).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(
            text,
            "2일 전, hello alice, other\n3 days ago, bob 네이버, 네이버\n"
        );
    }

    #[test]
    fn same_day_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let first = vec![
            IdentifierRecord::new("a1", "x"),
            IdentifierRecord::new("b2", "y"),
        ];
        save_rows(dir.path(), Stage::Identifiers, date(), &first).unwrap();
        let second = vec![IdentifierRecord::new("c3", "z")];
        let path = save_rows(dir.path(), Stage::Identifiers, date(), &second).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "c3, z\n");
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");
        let rows = vec!["a1".to_string()];
        let path = save_rows(&nested, Stage::Duplicates, date(), &rows).unwrap();
        assert!(path.starts_with(&nested));
        assert_eq!(fs::read_to_string(path).unwrap(), "a1\n");
    }
}
