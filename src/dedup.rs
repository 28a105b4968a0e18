use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::identifiers::IdentifierRecord;

#[derive(Debug, Default)]
pub struct Dedup {
    pub kept: Vec<IdentifierRecord>,
    /// Identifiers seen more than once, in order of first appearance.
    pub duplicates: Vec<String>,
    pub count_before: usize,
}

impl Dedup {
    pub fn count_after(&self) -> usize {
        self.kept.len()
    }

    pub fn count_duplicates(&self) -> usize {
        self.duplicates.len()
    }
}

/// Drop every occurrence of any identifier that appears more than once.
///
/// Matching is exact and case-sensitive. Survivors keep their input order.
pub fn remove_duplicates(records: Vec<IdentifierRecord>) -> Dedup {
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for r in &records {
        *freq.entry(r.identifier.as_str()).or_default() += 1;
    }

    let mut repeated: HashSet<&str> = HashSet::new();
    let mut duplicates = Vec::new();
    for r in &records {
        let id = r.identifier.as_str();
        if freq.get(id).copied().unwrap_or(0) > 1 && repeated.insert(id) {
            duplicates.push(id.to_string());
        }
    }

    let count_before = records.len();
    let kept: Vec<IdentifierRecord> = records
        .iter()
        .filter(|r| !repeated.contains(r.identifier.as_str()))
        .cloned()
        .collect();

    if duplicates.is_empty() {
        info!("No duplicate identifiers");
    } else {
        warn!(duplicates = ?duplicates, "Disqualified duplicate identifiers");
    }
    info!(before = count_before, after = kept.len(), "Deduplicated identifiers");

    Dedup {
        kept,
        duplicates,
        count_before,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(id: &str, cat: &str) -> IdentifierRecord {
        IdentifierRecord::new(id, cat)
    }

    #[test]
    fn removes_every_occurrence() {
        let out = remove_duplicates(vec![r("a1", "x"), r("a1", "y"), r("b2", "x")]);
        assert_eq!(out.kept, vec![r("b2", "x")]);
        assert_eq!(out.duplicates, vec!["a1"]);
        assert_eq!(out.count_before, 3);
        assert_eq!(out.count_after(), 1);
    }

    #[test]
    fn case_sensitive() {
        let out = remove_duplicates(vec![r("Bob", "x"), r("bob", "x")]);
        assert_eq!(out.count_after(), 2);
        assert!(out.duplicates.is_empty());
    }

    #[test]
    fn preserves_order_and_reports_first_seen_order() {
        let out = remove_duplicates(vec![
            r("z", "x"),
            r("c", "x"),
            r("m", "x"),
            r("a", "x"),
            r("c", "x"),
            r("z", "x"),
            r("z", "x"),
        ]);
        assert_eq!(out.kept, vec![r("m", "x"), r("a", "x")]);
        assert_eq!(out.duplicates, vec!["z", "c"]);
        assert_eq!(out.count_duplicates(), 2);
    }

    #[test]
    fn idempotent() {
        let once = remove_duplicates(vec![r("a", "x"), r("b", "x"), r("a", "y"), r("c", "z")]);
        let twice = remove_duplicates(once.kept.clone());
        assert_eq!(once.kept, twice.kept);
        assert!(twice.duplicates.is_empty());
    }

    #[test]
    fn large_pool_with_one_repeat() {
        let mut records: Vec<IdentifierRecord> =
            (0..2000).map(|i| r(&format!("user{i}"), "x")).collect();
        records.push(r("user1234", "y"));
        let out = remove_duplicates(records);
        assert_eq!(out.duplicates, vec!["user1234"]);
        assert_eq!(out.count_before, 2001);
        assert_eq!(out.count_after(), 1999);
        assert!(out.kept.iter().all(|k| k.identifier != "user1234"));
    }

    #[test]
    fn empty_input() {
        let out = remove_duplicates(Vec::new());
        assert!(out.kept.is_empty());
        assert_eq!(out.count_before, 0);
    }
}
