//! Forward-only stage runner: comments → eligibility → identifiers → dedup → draw.
//!
//! Each stage fully consumes the previous one's output. Only the draw is
//! non-deterministic, and its RNG is supplied by the caller.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rand::Rng;

use crate::dedup::{self, Dedup};
use crate::eligibility::{self, CutoffDate, LabelPolicy, Partition};
use crate::error::{RaffleError, Result};
use crate::history::{self, Stage};
use crate::identifiers::{self, Extraction};
use crate::parser::{self, Comment};
use crate::sampler::{self, Draw};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Comments,
    Filter,
    Identifiers,
    Dedup,
    Draw,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Comments,
        Step::Filter,
        Step::Identifiers,
        Step::Dedup,
        Step::Draw,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Step::Comments => "extract comments",
            Step::Filter => "apply cutoff",
            Step::Identifiers => "extract identifiers",
            Step::Dedup => "remove duplicates",
            Step::Draw => "draw winners",
        }
    }
}

pub struct RunOptions {
    pub until: Step,
    /// Required for every step past `Comments`.
    pub cutoff: Option<CutoffDate>,
    pub today: NaiveDate,
    pub draw_count: usize,
}

/// Everything a run produced, up to the step it stopped at.
#[derive(Debug, Default)]
pub struct Outcome {
    pub comments: Vec<Comment>,
    pub threshold_days: Option<i64>,
    pub partition: Option<Partition>,
    pub extraction: Option<Extraction>,
    pub dedup: Option<Dedup>,
    pub draw: Option<Draw>,
}

pub fn run<R, F>(
    settings: &Settings,
    opts: &RunOptions,
    rng: &mut R,
    mut on_step: F,
) -> Result<Outcome>
where
    R: Rng + ?Sized,
    F: FnMut(Step),
{
    let mut out = Outcome::default();

    on_step(Step::Comments);
    out.comments = parser::load_comments(
        Path::new(&settings.source_name),
        &settings.category_keywords,
        settings.verbose,
    )?;
    if opts.until == Step::Comments {
        return Ok(out);
    }

    on_step(Step::Filter);
    let cutoff = opts.cutoff.ok_or_else(|| {
        RaffleError::InvalidConfiguration("an end date is required past extraction".to_string())
    })?;
    let threshold = cutoff.threshold_days(opts.today);
    let policy = if settings.strict_labels {
        LabelPolicy::Strict
    } else {
        LabelPolicy::Collect
    };
    let partition = eligibility::partition(
        out.comments.clone(),
        threshold,
        settings.grace_period_days,
        policy,
        settings.verbose,
    )?;
    out.threshold_days = Some(threshold);
    if opts.until == Step::Filter {
        out.partition = Some(partition);
        return Ok(out);
    }

    on_step(Step::Identifiers);
    let extraction = identifiers::extract(&partition.eligible, settings.verbose);
    out.partition = Some(partition);
    if opts.until == Step::Identifiers {
        out.extraction = Some(extraction);
        return Ok(out);
    }

    on_step(Step::Dedup);
    let deduped = dedup::remove_duplicates(extraction.records.clone());
    out.extraction = Some(extraction);
    if opts.until == Step::Dedup {
        out.dedup = Some(deduped);
        return Ok(out);
    }

    on_step(Step::Draw);
    out.draw = Some(sampler::draw(&deduped.kept, opts.draw_count, rng)?);
    out.dedup = Some(deduped);
    Ok(out)
}

impl Outcome {
    /// Stage of the furthest output produced.
    pub fn reached(&self) -> Stage {
        if self.draw.is_some() {
            Stage::Draw
        } else if self.dedup.is_some() {
            Stage::Deduplicated
        } else if self.extraction.is_some() {
            Stage::Identifiers
        } else if self.partition.is_some() {
            Stage::Eligible
        } else {
            Stage::Comments
        }
    }

    /// Persist one stage's rows. Stages this run never reached write nothing.
    pub fn save(&self, stage: Stage, dir: &Path, date: NaiveDate) -> Result<Option<PathBuf>> {
        let path = match stage {
            Stage::Comments => Some(history::save_rows(dir, stage, date, &self.comments)?),
            Stage::Eligible => match &self.partition {
                Some(p) => Some(history::save_rows(dir, stage, date, &p.eligible)?),
                None => None,
            },
            Stage::Overdue => match &self.partition {
                Some(p) => Some(history::save_rows(dir, stage, date, &p.overdue)?),
                None => None,
            },
            Stage::Identifiers => match &self.extraction {
                Some(e) => Some(history::save_rows(dir, stage, date, &e.records)?),
                None => None,
            },
            Stage::Deduplicated => match &self.dedup {
                Some(d) => Some(history::save_rows(dir, stage, date, &d.kept)?),
                None => None,
            },
            Stage::Duplicates => match &self.dedup {
                Some(d) => Some(history::save_rows(dir, stage, date, &d.duplicates)?),
                None => None,
            },
            Stage::Draw => match &self.draw {
                Some(d) => {
                    let mut rows = d.winners.clone();
                    rows.extend(d.masked_records());
                    Some(history::save_rows(dir, stage, date, &rows)?)
                }
                None => None,
            },
        };
        Ok(path)
    }
}
