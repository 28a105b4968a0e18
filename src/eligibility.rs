use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{RaffleError, Result};
use crate::parser::Comment;

static CUTOFF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})/(\d{2})$").unwrap());
static LEADING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+").unwrap());

/// Last day of the giveaway, entered as `mm/dd` and pinned to the current year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffDate(NaiveDate);

impl CutoffDate {
    pub fn parse(raw: &str, today: NaiveDate) -> Result<Self> {
        let caps = CUTOFF_RE.captures(raw.trim()).ok_or_else(|| {
            RaffleError::InvalidConfiguration(format!(
                "end date must be in mm/dd form, got '{}'",
                raw
            ))
        })?;
        let month: u32 = caps[1].parse().unwrap_or(0);
        let day: u32 = caps[2].parse().unwrap_or(0);
        NaiveDate::from_ymd_opt(today.year(), month, day)
            .map(CutoffDate)
            .ok_or_else(|| {
                RaffleError::InvalidConfiguration(format!(
                    "'{}' is not a valid date in {}",
                    raw,
                    today.year()
                ))
            })
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Whole days elapsed since the cutoff; negative while it is still ahead.
    pub fn threshold_days(&self, today: NaiveDate) -> i64 {
        (today - self.0).num_days()
    }
}

/// What to do with a comment whose timestamp label has no usable leading number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPolicy {
    /// Report the comment in `rejected` and keep going.
    #[default]
    Collect,
    /// Abort the stage on the first bad label.
    Strict,
}

#[derive(Debug, Clone)]
pub struct Rejected {
    pub comment: Comment,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct Partition {
    pub eligible: Vec<Comment>,
    pub overdue: Vec<Comment>,
    pub rejected: Vec<Rejected>,
}

impl Partition {
    pub fn count_eligible(&self) -> usize {
        self.eligible.len()
    }

    pub fn count_overdue(&self) -> usize {
        self.overdue.len()
    }
}

/// Leading run of digits in a relative-time label ("3 days ago" → 3).
pub fn age_of(label: &str) -> std::result::Result<i64, String> {
    let digits = LEADING_NUMBER_RE
        .find(label)
        .ok_or_else(|| "no leading number".to_string())?;
    digits
        .as_str()
        .parse()
        .map_err(|e| format!("leading number {} unusable: {}", digits.as_str(), e))
}

/// Split comments into eligible and overdue.
///
/// A comment is eligible iff `age >= threshold_days - grace_period_days`;
/// the boundary itself counts as eligible.
pub fn partition(
    comments: Vec<Comment>,
    threshold_days: i64,
    grace_period_days: u32,
    policy: LabelPolicy,
    verbose: bool,
) -> Result<Partition> {
    let boundary = threshold_days - i64::from(grace_period_days);
    let mut out = Partition::default();

    for comment in comments {
        let age = match age_of(&comment.timestamp_label) {
            Ok(age) => age,
            Err(reason) => {
                let err = RaffleError::MalformedTimestampLabel {
                    label: comment.timestamp_label.clone(),
                    text: comment.text.clone(),
                    reason,
                };
                if policy == LabelPolicy::Strict {
                    return Err(err);
                }
                warn!("{}", err);
                out.rejected.push(Rejected {
                    comment,
                    error: err.to_string(),
                });
                continue;
            }
        };

        let eligible = age >= boundary;
        if verbose {
            info!(age, eligible, "{}: {}", comment.timestamp_label, comment.text);
        } else {
            debug!(age, eligible, "{}: {}", comment.timestamp_label, comment.text);
        }
        if eligible {
            out.eligible.push(comment);
        } else {
            out.overdue.push(comment);
        }
    }

    info!(
        threshold_days,
        grace_period_days,
        eligible = out.count_eligible(),
        overdue = out.count_overdue(),
        rejected = out.rejected.len(),
        "Applied eligibility cutoff"
    );
    Ok(out)
}
