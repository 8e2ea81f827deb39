//! Raw-mode lifecycle
//!
//! The controller captures the terminal attributes once, derives the raw
//! variant once, and applies it only while at least one read is active.
//! Nested reads share the raw state through a depth counter: the outermost
//! entry applies raw mode and the outermost exit restores the saved
//! attributes.

use std::io;

use tracing::{debug, trace, warn};

use super::TerminalIo;

/// Byte sink for prompts, echo and redraws
pub trait Output {
    /// Write all of `data`, retrying interrupted writes
    fn puts(&mut self, data: &[u8]) -> io::Result<()>;
}

/// Owns the saved/raw attribute pair and the nesting depth
#[derive(Debug)]
pub struct TerminalController<T: TerminalIo> {
    io: T,
    saved: Option<T::Attrs>,
    raw: Option<T::Attrs>,
    is_tty: bool,
    depth: u32,
    initialized: bool,
}

impl<T: TerminalIo> TerminalController<T> {
    /// Wrap a terminal; interactivity is detected immediately
    pub fn new(io: T) -> Self {
        let is_tty = io.is_interactive();
        Self {
            io,
            saved: None,
            raw: None,
            is_tty,
            depth: 0,
            initialized: false,
        }
    }

    /// Capture the attributes and derive raw mode. A second call is a no-op.
    pub fn initialize(&mut self, cbreak: bool) -> io::Result<()> {
        if self.initialized {
            return Ok(());
        }

        if self.is_tty {
            let saved = self.io.get_attrs()?;
            self.raw = Some(self.io.make_raw(&saved, cbreak));
            self.saved = Some(saved);
        }
        debug!(tty = self.is_tty, cbreak, "terminal initialized");
        self.initialized = true;
        Ok(())
    }

    /// Apply the raw attributes (no-op when not interactive)
    pub fn apply_raw(&mut self) {
        if !self.is_tty {
            return;
        }
        if let Some(raw) = &self.raw {
            trace!("applying raw mode");
            if let Err(e) = self.io.set_attrs(raw) {
                warn!("Failed to apply raw mode: {}", e);
            }
        }
    }

    /// Restore the saved attributes (no-op when not interactive)
    pub fn restore(&mut self) {
        if !self.is_tty {
            return;
        }
        if let Some(saved) = &self.saved {
            trace!("restoring terminal attributes");
            if let Err(e) = self.io.set_attrs(saved) {
                warn!("Failed to restore terminal attributes: {}", e);
            }
        }
    }

    /// Enter one read level, applying raw mode on the outermost entry
    pub fn enter(&mut self) {
        if self.depth == 0 {
            self.apply_raw();
        }
        self.depth += 1;
    }

    /// Leave one read level, restoring when the outermost level exits
    pub fn leave(&mut self) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            self.restore();
        }
    }

    /// Restore the terminal and forget the initialization. Safe to repeat.
    pub fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        self.restore();
        self.depth = 0;
        self.initialized = false;
        debug!("terminal shut down");
    }

    /// Read one byte from the terminal
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.io.read_byte()
    }

    /// Current nesting depth
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The underlying terminal
    pub fn io(&self) -> &T {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut T {
        &mut self.io
    }
}

impl<T: TerminalIo> Output for TerminalController<T> {
    fn puts(&mut self, mut data: &[u8]) -> io::Result<()> {
        while !data.is_empty() {
            match self.io.write(data) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => data = &data[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
