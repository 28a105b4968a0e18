use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the comment pipeline and its settings/source loaders.
#[derive(Debug, Error)]
pub enum RaffleError {
    #[error("source '{}' not found", path.display())]
    SourceNotFound { path: PathBuf },
    #[error("source '{}' is unreadable: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },
    #[error("timestamp label '{label}' is malformed: {reason} (comment: {text})")]
    MalformedTimestampLabel {
        label: String,
        text: String,
        reason: String,
    },
    #[error("cannot draw {requested} entrants from a pool of {available}")]
    InsufficientPool { requested: usize, available: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, RaffleError>;
