//! Rawline Line Editing Library
//!
//! A small interactive line editor for raw-mode terminals, built directly on
//! termios without any line editing libraries.
//! This crate provides:
//!
//! - `tty`: terminal I/O, raw-mode lifecycle with nesting depth
//! - `editor`: the editable line buffer
//! - `parser`: arrow key escape sequence recognizer and key classification
//! - `history`: command history with browse cursor and pluggable file format
//! - `session`: the read loop, hooks and redraw
//! - `signals`: job-control signal coordination
//! - `headless`: scripted terminal for tests and automation

pub mod app;
pub mod editor;
pub mod error;
pub mod headless;
pub mod history;
pub mod parser;
pub mod session;
pub mod signals;
pub mod tty;

pub use app::{ConfigError, Options};
pub use editor::LineBuffer;
pub use error::{ErrorKind, LineError, LineResult};
pub use history::{History, HistoryEntry, HistoryError, HistoryFile, HistoryFormat, LineFormat};
pub use session::{CommandOutcome, DefaultHooks, LineContext, LineHooks, Session};
pub use tty::{StdTerminal, TerminalIo};
