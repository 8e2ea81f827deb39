//! Command history
//!
//! An append-only list of previously entered lines with a browse cursor used
//! for up/down recall, optionally backed by a file whose format is supplied by
//! the caller through [`HistoryFormat`].

mod file;
mod format;
mod store;

pub use file::{HistoryFile, DEFAULT_MAX_FILE_LEN};
pub use format::{HistoryFormat, LineFormat};
pub use store::{EntryTag, History, HistoryEntry, MIN_CAPACITY};

use std::io;
use std::path::PathBuf;

/// Error type for history operations
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("History is already initialized")]
    AlreadyInitialized,

    #[error("History is not initialized")]
    NotInitialized,

    #[error("Failed to open history file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read history file: {0}")]
    Read(#[source] io::Error),

    #[error("Failed to write history file: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to parse history file: {0}")]
    Parse(String),
}

/// Result type for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;
