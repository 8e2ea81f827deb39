//! Error types for line reading
//!
//! Every failure of a read call is a [`LineError`]. The session also keeps the
//! [`ErrorKind`] of the most recent failure so callers that only check the
//! returned status can ask for it afterwards.

use std::io;

use crate::history::HistoryError;

/// Copyable classification of a [`LineError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Writing to the terminal failed
    Write,
    /// Input or output is not an interactive terminal
    NotATerminal,
    /// The session has not been initialized
    NotInitialized,
    /// No output slot was supplied for the line
    MissingOutputSlot,
    /// No prompt was supplied
    MissingPrompt,
    /// The read was aborted by an interrupt
    Interrupted,
    /// Reading from the terminal failed
    ReadFailure,
    /// Terminal attributes could not be captured or changed
    Terminal,
    /// The history store rejected an operation
    History,
}

impl ErrorKind {
    /// Human-readable description of the error kind
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::Write => "Failed to write to the terminal",
            ErrorKind::NotATerminal => "Not inside a tty",
            ErrorKind::NotInitialized => "The line reader must be initialized first",
            ErrorKind::MissingOutputSlot => "An output slot for the line is required",
            ErrorKind::MissingPrompt => "Prompt cannot be missing",
            ErrorKind::Interrupted => "Interrupt",
            ErrorKind::ReadFailure => "Failed to read from the terminal",
            ErrorKind::Terminal => "Failed to configure the terminal",
            ErrorKind::History => "History error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Error type for line reading
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("Failed to write to the terminal: {0}")]
    Write(#[source] io::Error),

    #[error("Not inside a tty")]
    NotATerminal,

    #[error("The line reader must be initialized first")]
    NotInitialized,

    #[error("An output slot for the line is required")]
    MissingOutputSlot,

    #[error("Prompt cannot be missing")]
    MissingPrompt,

    #[error("Interrupt")]
    Interrupted,

    #[error("Failed to read from the terminal: {0}")]
    ReadFailure(#[source] io::Error),

    #[error("Failed to configure the terminal: {0}")]
    Terminal(#[source] io::Error),

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

impl LineError {
    /// The kind recorded as the session's last error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LineError::Write(_) => ErrorKind::Write,
            LineError::NotATerminal => ErrorKind::NotATerminal,
            LineError::NotInitialized => ErrorKind::NotInitialized,
            LineError::MissingOutputSlot => ErrorKind::MissingOutputSlot,
            LineError::MissingPrompt => ErrorKind::MissingPrompt,
            LineError::Interrupted => ErrorKind::Interrupted,
            LineError::ReadFailure(_) => ErrorKind::ReadFailure,
            LineError::Terminal(_) => ErrorKind::Terminal,
            LineError::History(_) => ErrorKind::History,
        }
    }
}

/// Result type for line reading
pub type LineResult<T> = Result<T, LineError>;
