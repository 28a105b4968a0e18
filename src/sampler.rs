use rand::seq::index;
use rand::Rng;
use tracing::info;

use crate::error::{RaffleError, Result};
use crate::identifiers::IdentifierRecord;

pub const MASK: &str = "****";
const MASKED_TAIL: usize = 4;

#[derive(Debug, Clone)]
pub struct Draw {
    pub winners: Vec<IdentifierRecord>,
}

impl Draw {
    /// `identifier@category` for each winner.
    pub fn rendered(&self) -> Vec<String> {
        self.winners
            .iter()
            .map(|w| format!("{}@{}", w.identifier, w.category))
            .collect()
    }

    /// Display form with the identifier's tail hidden.
    pub fn masked(&self) -> Vec<String> {
        self.winners
            .iter()
            .map(|w| format!("{}@{}", mask(&w.identifier), w.category))
            .collect()
    }

    pub fn masked_records(&self) -> Vec<IdentifierRecord> {
        self.winners
            .iter()
            .map(|w| IdentifierRecord::new(&mask(&w.identifier), &w.category))
            .collect()
    }
}

/// Replace the last four characters with the mask. Shorter identifiers are
/// consumed entirely.
pub fn mask(identifier: &str) -> String {
    let keep = identifier.chars().count().saturating_sub(MASKED_TAIL);
    let mut out: String = identifier.chars().take(keep).collect();
    out.push_str(MASK);
    out
}

/// Pick `count` distinct records uniformly at random without replacement.
pub fn draw<R: Rng + ?Sized>(
    records: &[IdentifierRecord],
    count: usize,
    rng: &mut R,
) -> Result<Draw> {
    if count > records.len() {
        return Err(RaffleError::InsufficientPool {
            requested: count,
            available: records.len(),
        });
    }
    let winners: Vec<IdentifierRecord> = index::sample(rng, records.len(), count)
        .into_iter()
        .map(|i| records[i].clone())
        .collect();
    info!(pool = records.len(), drawn = winners.len(), "Drew winners");
    Ok(Draw { winners })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn pool(n: usize) -> Vec<IdentifierRecord> {
        (0..n)
            .map(|i| IdentifierRecord::new(&format!("user{i:03}"), "other"))
            .collect()
    }

    #[test]
    fn mask_examples() {
        assert_eq!(mask("abcdef"), "ab****");
        assert_eq!(mask("abcd"), "****");
        assert_eq!(mask("ab"), "****");
        assert_eq!(mask(""), "****");
        assert_eq!(mask("지메일계정12"), "지메일****");
    }

    #[test]
    fn draws_distinct_records() {
        let records = pool(50);
        let mut rng = StdRng::seed_from_u64(7);
        for k in [0, 1, 10, 50] {
            let d = draw(&records, k, &mut rng).unwrap();
            assert_eq!(d.winners.len(), k);
            let unique: HashSet<_> = d.winners.iter().collect();
            assert_eq!(unique.len(), k);
            assert!(d.winners.iter().all(|w| records.contains(w)));
        }
    }

    #[test]
    fn same_seed_same_draw() {
        let records = pool(30);
        let a = draw(&records, 5, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = draw(&records, 5, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.winners, b.winners);
    }

    #[test]
    fn insufficient_pool() {
        let records = pool(2);
        let err = draw(&records, 3, &mut StdRng::seed_from_u64(1)).unwrap_err();
        match err {
            RaffleError::InsufficientPool {
                requested,
                available,
            } => {
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn renderings() {
        let d = Draw {
            winners: vec![
                IdentifierRecord::new("alice_01", "지메일"),
                IdentifierRecord::new("bo", "other"),
            ],
        };
        assert_eq!(d.rendered(), vec!["alice_01@지메일", "bo@other"]);
        assert_eq!(d.masked(), vec!["alic****@지메일", "****@other"]);
        assert_eq!(d.masked_records()[0].identifier, "alic****");
    }
}
