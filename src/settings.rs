use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RaffleError, Result};
use crate::source;

pub const DEFAULT_PATH: &str = "settings.json";
const ENV_PREFIX: &str = "RAFFLE";

const DEFAULT_KEYWORDS: &[&str] = &[
    "지메일", "네이버", "핫메일", "아웃룩", "한메일", "다음",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Saved comments page, relative to the working directory.
    pub source_name: String,
    /// Checked in order; the first keyword contained in a comment names its category.
    pub category_keywords: Vec<String>,
    pub draw_count: usize,
    pub grace_period_days: u32,
    pub verbose: bool,
    /// Where stage snapshots are written.
    pub output_dir: PathBuf,
    /// Abort the eligibility stage on the first malformed timestamp label.
    pub strict_labels: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_name: "comments.html".to_string(),
            category_keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            draw_count: 3,
            grace_period_days: 1,
            verbose: true,
            output_dir: PathBuf::from("data"),
            strict_labels: false,
        }
    }
}

/// Raw text edits as typed by the user; `None` leaves a field untouched.
#[derive(Debug, Default, Clone)]
pub struct SettingsUpdate {
    pub source_name: Option<String>,
    pub category_keywords: Option<String>,
    pub draw_count: Option<String>,
    pub grace_period_days: Option<String>,
    pub verbose: Option<bool>,
}

impl Settings {
    /// Read settings, writing the defaults first if the file does not exist.
    ///
    /// Values are not validated here so a bad file can still be repaired with
    /// [`Settings::apply`]; callers that run the pipeline call `validate`.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let settings = Settings::default();
            settings.save(path)?;
            info!(path = %path.display(), "Created default settings");
            return Ok(settings);
        }
        Self::read(path, ENV_PREFIX)
    }

    /// Read and validate the settings file.
    #[cfg(test)]
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Self::read(path, ENV_PREFIX)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse the file and layer `<env_prefix>_*` environment overrides on top.
    fn read(path: &Path, env_prefix: &str) -> Result<Self> {
        let text = source::read_text(path)?;
        Config::builder()
            .add_source(File::from_str(&text, FileFormat::Json))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("category_keywords"),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| {
                RaffleError::InvalidConfiguration(format!("{}: {}", path.display(), e))
            })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| RaffleError::InvalidConfiguration(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_name.trim().is_empty() {
            return Err(RaffleError::InvalidConfiguration(
                "source_name must not be empty".to_string(),
            ));
        }
        if self.category_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(RaffleError::InvalidConfiguration(
                "category_keywords must not contain blank entries".to_string(),
            ));
        }
        if self.draw_count == 0 {
            return Err(RaffleError::InvalidConfiguration(
                "draw_count must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply user edits. Nothing changes unless every edited field is valid.
    pub fn apply(&mut self, update: SettingsUpdate) -> Result<()> {
        let mut next = self.clone();
        if let Some(name) = update.source_name {
            next.source_name = name.trim().to_string();
        }
        if let Some(keywords) = update.category_keywords {
            next.category_keywords = parse_keywords(&keywords);
        }
        if let Some(count) = update.draw_count {
            next.draw_count = parse_positive(&count, "draw_count")?;
        }
        if let Some(grace) = update.grace_period_days {
            next.grace_period_days = parse_non_negative(&grace, "grace_period_days")?;
        }
        if let Some(verbose) = update.verbose {
            next.verbose = verbose;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

/// Split comma-separated keywords, trimming each and dropping blanks.
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive(raw: &str, field: &str) -> Result<usize> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n as usize),
        _ => Err(RaffleError::InvalidConfiguration(format!(
            "{} must be a positive integer, got '{}'",
            field, raw
        ))),
    }
}

fn parse_non_negative(raw: &str, field: &str) -> Result<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        RaffleError::InvalidConfiguration(format!(
            "{} must be a non-negative integer, got '{}'",
            field, raw
        ))
    })
}
