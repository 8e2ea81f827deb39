//! Line reading session
//!
//! A [`Session`] owns everything a read needs: the terminal controller, the
//! line buffer, the history store, the hooks and the signal coordinator.
//! Each [`Session::read`] runs the loop
//!
//! 1. check preconditions
//! 2. enter raw mode (outermost level only) and write the prompt
//! 3. redraw, read one byte, handle pending signals
//! 4. hand the byte to the hooks and check for completion
//!
//! and always leaves the raw-mode level it entered, whatever the outcome.

mod hooks;
pub mod render;

pub use hooks::{CommandOutcome, DefaultHooks, LineContext, LineHooks};

use std::io;

use tracing::{debug, trace, warn};

use crate::app::Options;
use crate::editor::{LineBuffer, BACKSPACE};
use crate::error::{ErrorKind, LineError, LineResult};
use crate::history::History;
use crate::signals::SignalCoordinator;
use crate::tty::{Output, TerminalController, TerminalIo};

/// An interactive line reader on one terminal
pub struct Session<T: TerminalIo> {
    terminal: TerminalController<T>,
    buffer: LineBuffer,
    history: History,
    hooks: Box<dyn LineHooks>,
    prompt: String,
    done: bool,
    last_error: Option<ErrorKind>,
    signals: Option<SignalCoordinator>,
}

impl<T: TerminalIo> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tty", &self.terminal.is_tty())
            .field("depth", &self.terminal.depth())
            .field("buffer", &self.buffer)
            .field("history", &self.history)
            .field("prompt", &self.prompt)
            .field("last_error", &self.last_error)
            .field("signals", &self.signals.is_some())
            .finish()
    }
}

impl<T: TerminalIo> Session<T> {
    /// Create a session with the built-in hooks and an in-memory history
    pub fn new(io: T) -> Self {
        Self::with_hooks(io, Box::new(DefaultHooks::new()))
    }

    /// Create a session with custom hooks
    pub fn with_hooks(io: T, hooks: Box<dyn LineHooks>) -> Self {
        Self {
            terminal: TerminalController::new(io),
            buffer: LineBuffer::new(),
            history: History::in_memory(),
            hooks,
            prompt: String::new(),
            done: false,
            last_error: None,
            signals: None,
        }
    }

    /// Replace the history store, e.g. with one backed by a file
    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    /// Capture terminal attributes, derive raw mode and optionally install
    /// signal handling. A history store that was never initialized (or was
    /// shut down) becomes a memory-only one. A second call is a no-op.
    pub fn initialize(&mut self, options: &Options) -> LineResult<()> {
        if self.terminal.is_initialized() {
            return Ok(());
        }

        if let Err(e) = self.terminal.initialize(options.raw_mode_cbreak) {
            return Err(self.fail(LineError::Terminal(e)));
        }
        if !self.history.is_initialized() {
            if let Err(e) = self.history.init(None) {
                return Err(self.fail(e.into()));
            }
        }
        if options.enable_vt {
            debug!("VT processing is always enabled on this platform");
        }
        if options.install_handlers && self.terminal.is_tty() {
            match SignalCoordinator::install() {
                Ok(coordinator) => self.signals = Some(coordinator),
                Err(e) => warn!("Failed to install signal handlers: {}", e),
            }
        }
        Ok(())
    }

    /// Restore the terminal, flush the history and drop the signal handlers.
    ///
    /// Safe to call more than once; only a history flush failure is reported.
    pub fn shutdown(&mut self) -> LineResult<()> {
        if !self.terminal.is_initialized() {
            return Ok(());
        }

        self.terminal.shutdown();
        self.signals = None;
        let result = if self.history.is_initialized() {
            self.history.shutdown().map_err(LineError::from)
        } else {
            Ok(())
        };
        result.map_err(|e| self.fail(e))
    }

    /// Read one line.
    ///
    /// On success the line (without its terminator) is written to `out` and
    /// its length returned. `Ok(0)` with `out` untouched means end of input.
    /// On failure `out` is untouched and the error kind is also recorded in
    /// [`last_error`](Self::last_error).
    pub fn read(&mut self, prompt: Option<&str>, out: Option<&mut String>) -> LineResult<usize> {
        self.read_checked(prompt, out).map_err(|e| self.fail(e))
    }

    /// Read one line; `Ok(None)` at end of input
    pub fn read_line(&mut self, prompt: &str) -> LineResult<Option<String>> {
        let mut line = String::new();
        let mut completed = false;
        let mut slot = Completion {
            line: &mut line,
            completed: &mut completed,
        };
        self.read_into(Some(prompt), Some(&mut slot))
            .map_err(|e| self.fail(e))?;
        Ok(completed.then_some(line))
    }

    /// Write bytes to the terminal
    pub fn puts(&mut self, data: &[u8]) -> LineResult<()> {
        if !self.terminal.is_initialized() {
            return Err(self.fail(LineError::NotInitialized));
        }
        self.terminal
            .puts(data)
            .map_err(|e| self.fail(LineError::Write(e)))
    }

    /// Repaint the prompt, the buffer and the cursor column
    pub fn redraw(&mut self) -> LineResult<()> {
        render::redraw(&mut self.terminal, &self.prompt, &self.buffer)
            .map_err(|e| self.fail(LineError::Write(e)))
    }

    /// Kind of the most recent failure
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    /// Open an outer raw-mode level so successive reads stay in raw mode
    pub fn hold_raw(&mut self) {
        self.terminal.enter();
    }

    /// Close a level opened by [`hold_raw`](Self::hold_raw)
    pub fn release_raw(&mut self) {
        self.terminal.leave();
    }

    /// Current raw-mode nesting depth
    pub fn depth(&self) -> u32 {
        self.terminal.depth()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// The line being edited
    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    /// The underlying terminal
    pub fn terminal(&self) -> &T {
        self.terminal.io()
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        self.terminal.io_mut()
    }

    pub fn is_initialized(&self) -> bool {
        self.terminal.is_initialized()
    }

    fn fail(&mut self, err: LineError) -> LineError {
        debug!(kind = ?err.kind(), "{}", err);
        self.last_error = Some(err.kind());
        err
    }

    fn read_checked(&mut self, prompt: Option<&str>, out: Option<&mut String>) -> LineResult<usize> {
        match out {
            Some(line) => {
                let mut completed = false;
                let mut slot = Completion {
                    line,
                    completed: &mut completed,
                };
                self.read_into(prompt, Some(&mut slot))
            }
            None => self.read_into(prompt, None),
        }
    }

    fn read_into(&mut self, prompt: Option<&str>, out: Option<&mut Completion<'_>>) -> LineResult<usize> {
        if !self.terminal.is_tty() {
            return Err(LineError::NotATerminal);
        }
        if !self.terminal.is_initialized() {
            return Err(LineError::NotInitialized);
        }
        let Some(out) = out else {
            return Err(LineError::MissingOutputSlot);
        };
        let Some(prompt) = prompt else {
            return Err(LineError::MissingPrompt);
        };

        self.prompt.clear();
        self.prompt.push_str(prompt);
        self.done = false;
        self.discard_pending_signals();
        self.hooks.start_line();

        self.terminal.enter();
        let result = match render::write_prompt(&mut self.terminal, &self.prompt) {
            Ok(()) => {
                self.buffer.reset();
                self.run(out)
            }
            Err(e) => Err(LineError::Write(e)),
        };
        self.buffer.reset();
        self.terminal.leave();
        result
    }

    fn run(&mut self, out: &mut Completion<'_>) -> LineResult<usize> {
        loop {
            if let Err(e) = render::redraw(&mut self.terminal, &self.prompt, &self.buffer) {
                trace!("redraw failed: {}", e);
            }

            let read = self.terminal.read_byte();
            let read_interrupted =
                matches!(&read, Err(e) if e.kind() == io::ErrorKind::Interrupted);
            let signals = self.handle_signals(read_interrupted);

            let byte = match read {
                Ok(Some(byte)) => byte,
                Ok(None) => {
                    debug!("end of input");
                    return Ok(0);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted && !signals.retry => {
                    let _ = self.terminal.puts(render::INTERRUPT_ECHO);
                    return Err(LineError::Interrupted);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(LineError::ReadFailure(e)),
            };
            if signals.abort {
                let _ = self.terminal.puts(render::INTERRUPT_ECHO);
                return Err(LineError::Interrupted);
            }

            let mut ctx = LineContext::new(
                &mut self.buffer,
                &mut self.history,
                &mut self.terminal,
                &self.prompt,
                &mut self.done,
            );
            if !self.hooks.handle_byte(&mut ctx, byte)? {
                continue;
            }
            if self.hooks.is_done(&mut ctx) {
                return self.complete(out);
            }
        }
    }

    /// Apply pending job-control transitions after a read returned.
    ///
    /// Raw mode is re-applied after a resume only when the read was
    /// interrupted; a read that delivered a byte proves the terminal is still
    /// raw, and re-applying would flush the typeahead behind that byte.
    fn handle_signals(&mut self, read_interrupted: bool) -> SignalDisposition {
        let Some(signals) = &self.signals else {
            return SignalDisposition::default();
        };
        let mut pending = signals.take_pending();
        if pending.is_empty() {
            return SignalDisposition::default();
        }

        if pending.suspend {
            debug!("suspending");
            self.terminal.restore();
            if let Err(e) = signals.suspend_process() {
                warn!("Failed to suspend: {}", e);
            }
            // The SIGCONT that woke us is ours; only keep a new interrupt
            pending.interrupt |= signals.take_pending().interrupt;
            debug!("resumed");
            if self.terminal.depth() > 0 {
                self.terminal.apply_raw();
            }
        } else if pending.resume && read_interrupted && self.terminal.depth() > 0 {
            debug!("resumed, re-applying raw mode");
            self.terminal.apply_raw();
        }

        SignalDisposition {
            abort: pending.interrupt,
            retry: !pending.interrupt && (pending.suspend || pending.resume),
        }
    }

    /// Drop signals that arrived while no read was active
    fn discard_pending_signals(&mut self) {
        if let Some(signals) = &self.signals {
            let stale = signals.take_pending();
            if !stale.is_empty() {
                trace!(?stale, "discarding signals received between reads");
            }
        }
    }

    fn complete(&mut self, out: &mut Completion<'_>) -> LineResult<usize> {
        if self.buffer.as_bytes().last() == Some(&b'\n') {
            self.buffer.goto(self.buffer.len() as isize);
            self.buffer.command(BACKSPACE);
        }

        let line = String::from_utf8_lossy(self.buffer.as_bytes()).into_owned();
        // Length of what the caller receives, after lossy conversion
        let len = line.len();
        trace!(len, "line complete");

        let outcome = self.hooks.exec_command(&mut self.history, &line)?;
        out.line.clear();
        out.line.push_str(&line);
        *out.completed = true;

        if outcome == CommandOutcome::Exit {
            debug!("exit requested");
            self.buffer.reset();
            self.terminal.leave();
            if let Err(e) = self.shutdown() {
                warn!("Shutdown before exit failed: {}", e);
            }
            std::process::exit(0);
        }
        Ok(len)
    }
}

impl<T: TerminalIo> Drop for Session<T> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Session shutdown failed: {}", e);
        }
    }
}

/// Where a completed line goes
struct Completion<'a> {
    line: &'a mut String,
    completed: &'a mut bool,
}

/// What the loop does with a read that returned while signals were pending
#[derive(Debug, Default, Clone, Copy)]
struct SignalDisposition {
    /// An interrupt arrived: abandon the line
    abort: bool,
    /// Only job-control signals arrived: read again
    retry: bool,
}
