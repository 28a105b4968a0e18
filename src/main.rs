mod dedup;
mod eligibility;
mod error;
mod history;
mod identifiers;
mod parser;
mod pipeline;
mod sampler;
mod settings;
mod source;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;

use eligibility::CutoffDate;
use history::Stage;
use pipeline::{Outcome, RunOptions, Step};
use settings::{Settings, SettingsUpdate};

#[derive(Parser)]
#[command(name = "comment_raffle", about = "Comment giveaway draw from a saved comments page")]
struct Cli {
    /// Settings file (created with defaults if missing)
    #[arg(long, global = true, default_value = settings::DEFAULT_PATH)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract comments from the saved page
    Comments {
        /// Save the extracted comments
        #[arg(long)]
        save: bool,
    },
    /// Drop comments posted after the end date
    Filter {
        /// End date in mm/dd form
        #[arg(short, long)]
        end_date: String,
        /// Save both the eligible and the overdue comments
        #[arg(long)]
        save: bool,
    },
    /// Pull one identifier out of each eligible comment
    Identifiers {
        #[arg(short, long)]
        end_date: String,
        #[arg(long)]
        save: bool,
    },
    /// Disqualify identifiers that entered more than once
    Dedup {
        #[arg(short, long)]
        end_date: String,
        #[arg(long)]
        save: bool,
    },
    /// Draw winners from the deduplicated pool
    Draw {
        #[arg(short, long)]
        end_date: String,
        /// Winners to draw (default: draw_count from settings)
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        save: bool,
    },
    /// Every step in order, saving each stage's output
    Run {
        #[arg(short, long)]
        end_date: String,
        #[arg(short = 'n', long)]
        count: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show or edit settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show,
    /// Validate and save new values
    Set {
        /// Saved comments page
        #[arg(long)]
        source: Option<String>,
        /// Comma-separated category keywords, in priority order
        #[arg(long)]
        keywords: Option<String>,
        /// Winners per draw (positive integer)
        #[arg(long)]
        count: Option<String>,
        /// Grace period in days (non-negative integer)
        #[arg(long)]
        grace: Option<String>,
        #[arg(long)]
        verbose: Option<bool>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load_or_create(&cli.settings)
        .with_context(|| format!("loading {}", cli.settings.display()))?;
    if !matches!(cli.command, Commands::Settings { .. }) {
        settings
            .validate()
            .with_context(|| format!("fix {} with `settings set`", cli.settings.display()))?;
    }
    let today = Local::now().date_naive();

    let result = match cli.command {
        Commands::Comments { save } => {
            let out = run_steps(&settings, Step::Comments, None, today, None, None, false)?;
            print_comments(&out.comments);
            println!("Total comments: {}", out.comments.len());
            if save {
                save_stages(&out, &[out.reached()], &settings.output_dir, today)?;
            }
            Ok(())
        }
        Commands::Filter { end_date, save } => {
            let cutoff = CutoffDate::parse(&end_date, today)?;
            let out = run_steps(&settings, Step::Filter, Some(cutoff), today, None, None, false)?;
            print_partition(&out);
            if save {
                save_stages(&out, &[Stage::Eligible, Stage::Overdue], &settings.output_dir, today)?;
            }
            Ok(())
        }
        Commands::Identifiers { end_date, save } => {
            let cutoff = CutoffDate::parse(&end_date, today)?;
            let out =
                run_steps(&settings, Step::Identifiers, Some(cutoff), today, None, None, false)?;
            print_identifiers(&out);
            if save {
                save_stages(&out, &[out.reached()], &settings.output_dir, today)?;
            }
            Ok(())
        }
        Commands::Dedup { end_date, save } => {
            let cutoff = CutoffDate::parse(&end_date, today)?;
            let out = run_steps(&settings, Step::Dedup, Some(cutoff), today, None, None, false)?;
            print_dedup(&out);
            if save {
                save_stages(
                    &out,
                    &[Stage::Deduplicated, Stage::Duplicates],
                    &settings.output_dir,
                    today,
                )?;
            }
            Ok(())
        }
        Commands::Draw {
            end_date,
            count,
            seed,
            save,
        } => {
            let cutoff = CutoffDate::parse(&end_date, today)?;
            let out = run_steps(&settings, Step::Draw, Some(cutoff), today, count, seed, false)?;
            print_draw(&out);
            if save {
                save_stages(&out, &[out.reached()], &settings.output_dir, today)?;
            }
            Ok(())
        }
        Commands::Run {
            end_date,
            count,
            seed,
        } => {
            let cutoff = CutoffDate::parse(&end_date, today)?;
            let out = run_steps(&settings, Step::Draw, Some(cutoff), today, count, seed, true)?;
            println!(
                "Comments: {} | eligible: {} | identifiers: {} | after dedup: {}",
                out.comments.len(),
                out.partition.as_ref().map_or(0, |p| p.count_eligible()),
                out.extraction.as_ref().map_or(0, |e| e.count_identifier_like),
                out.dedup.as_ref().map_or(0, |d| d.count_after()),
            );
            print_draw(&out);
            save_stages(
                &out,
                &[
                    Stage::Comments,
                    Stage::Eligible,
                    Stage::Overdue,
                    Stage::Identifiers,
                    Stage::Deduplicated,
                    Stage::Duplicates,
                    Stage::Draw,
                ],
                &settings.output_dir,
                today,
            )?;
            Ok(())
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                println!("{}", serde_json::to_string_pretty(&settings)?);
                Ok(())
            }
            SettingsAction::Set {
                source,
                keywords,
                count,
                grace,
                verbose,
            } => {
                let mut next = settings.clone();
                next.apply(SettingsUpdate {
                    source_name: source,
                    category_keywords: keywords,
                    draw_count: count,
                    grace_period_days: grace,
                    verbose,
                })?;
                next.save(&cli.settings)?;
                println!("Saved settings to {}", cli.settings.display());
                Ok(())
            }
        },
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run_steps(
    settings: &Settings,
    until: Step,
    cutoff: Option<CutoffDate>,
    today: NaiveDate,
    count: Option<usize>,
    seed: Option<u64>,
    show_progress: bool,
) -> anyhow::Result<Outcome> {
    if let Some(cutoff) = cutoff {
        println!(
            "{} days since end date {}",
            cutoff.threshold_days(today),
            cutoff.date().format("%m/%d")
        );
    }
    let draw_count = count.unwrap_or(settings.draw_count);
    if draw_count == 0 {
        anyhow::bail!(error::RaffleError::InvalidConfiguration(
            "draw count must be a positive integer".to_string()
        ));
    }
    let opts = RunOptions {
        until,
        cutoff,
        today,
        draw_count,
    };
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    let pb = if show_progress {
        let pb = ProgressBar::new(Step::ALL.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:20.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };
    let mut started = 0;
    let out = pipeline::run(settings, &opts, &mut rng, |step| {
        if started > 0 {
            pb.inc(1);
        }
        started += 1;
        pb.set_message(step.name());
    })
    .with_context(|| format!("processing {}", settings.source_name));
    pb.finish_and_clear();
    out
}

fn save_stages(out: &Outcome, stages: &[Stage], dir: &Path, date: NaiveDate) -> anyhow::Result<()> {
    for &stage in stages {
        if let Some(path) = out.save(stage, dir, date)? {
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

fn print_comments(comments: &[parser::Comment]) {
    println!("{:>3} | {:<12} | {:<48} | {:<10}", "#", "Time", "Comment", "Category");
    println!("{}", "-".repeat(83));
    for (i, c) in comments.iter().enumerate() {
        println!(
            "{:>3} | {:<12} | {:<48} | {:<10}",
            i + 1,
            truncate(&c.timestamp_label, 12),
            truncate(&c.text, 48),
            c.category
        );
    }
}

fn print_partition(out: &Outcome) {
    let Some(p) = &out.partition else { return };
    if !p.overdue.is_empty() {
        println!("--- Posted after the end date ---");
        print_comments(&p.overdue);
        println!();
    }
    if !p.rejected.is_empty() {
        println!("--- Unreadable timestamps ---");
        for r in &p.rejected {
            println!("  [{}] {}", r.comment.category, r.error);
        }
        println!();
    }
    println!("Before end date: {}", p.count_eligible());
    println!("After end date:  {}", p.count_overdue());
}

fn print_identifiers(out: &Outcome) {
    let Some(e) = &out.extraction else { return };
    for r in &e.records {
        println!("  {:<32} {}", r.identifier, r.category);
    }
    println!("Identifiers:  {}", e.count_identifier_like);
    println!("Numeric-only: {}", e.count_numeric_only);
}

fn print_dedup(out: &Outcome) {
    let Some(d) = &out.dedup else { return };
    if d.duplicates.is_empty() {
        println!("No duplicate identifiers.");
    } else {
        println!("Duplicate identifiers: {}", d.duplicates.join(", "));
    }
    println!("Duplicated:     {}", d.count_duplicates());
    println!("Remaining pool: {} (of {})", d.count_after(), d.count_before);
}

fn print_draw(out: &Outcome) {
    let Some(d) = &out.draw else { return };
    println!("\n--- Winners ---");
    for line in d.rendered() {
        println!("  {}", line);
    }
    println!("--- Masked ---");
    for line in d.masked() {
        println!("  {}", line);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
