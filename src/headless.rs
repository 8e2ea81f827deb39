//! Headless terminal
//!
//! A scripted [`TerminalIo`] for testing and automation. Input is a queue of
//! events (bytes, interrupted reads, read failures); output is captured in
//! memory; attribute changes are counted instead of touching a real tty.
//!
//! # Example
//!
//! ```
//! use rawline::headless::HeadlessTerminal;
//! use rawline::{Options, Session};
//!
//! let mut session = Session::new(HeadlessTerminal::with_input(b"hi\n"));
//! session.initialize(&Options::default()).unwrap();
//! let line = session.read_line("> ").unwrap();
//! assert_eq!(line.as_deref(), Some("hi"));
//! ```

use std::collections::VecDeque;
use std::io;

use crate::tty::TerminalIo;

/// One scripted input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A byte is read
    Byte(u8),
    /// The read is interrupted by a signal (`EINTR`)
    Interrupt,
    /// The read fails with the given kind
    Fail(io::ErrorKind),
}

/// Attribute set of a headless terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeadlessAttrs {
    pub raw: bool,
    pub cbreak: bool,
}

/// A scripted terminal
#[derive(Debug)]
pub struct HeadlessTerminal {
    input: VecDeque<Input>,
    output: Vec<u8>,
    interactive: bool,
    attrs: HeadlessAttrs,
    attr_reads: usize,
    attr_writes: usize,
    reads: usize,
    fail_writes: bool,
    interrupted_writes: usize,
}

impl Default for HeadlessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessTerminal {
    /// An interactive terminal with no pending input
    pub fn new() -> Self {
        Self {
            input: VecDeque::new(),
            output: Vec::new(),
            interactive: true,
            attrs: HeadlessAttrs::default(),
            attr_reads: 0,
            attr_writes: 0,
            reads: 0,
            fail_writes: false,
            interrupted_writes: 0,
        }
    }

    /// A terminal that reports itself as not interactive
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            ..Self::new()
        }
    }

    /// An interactive terminal that will read `bytes` and then hit EOF
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut term = Self::new();
        term.push_bytes(bytes);
        term
    }

    /// Queue an input event
    pub fn push(&mut self, input: Input) {
        self.input.push_back(input);
    }

    /// Queue bytes
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().map(|&b| Input::Byte(b)));
    }

    /// Everything written so far
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Everything written so far, as text
    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Take and clear the captured output
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    /// Make every subsequent write fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make the next `n` writes fail with `EINTR`
    pub fn interrupt_next_writes(&mut self, n: usize) {
        self.interrupted_writes = n;
    }

    /// Whether raw attributes are currently applied
    pub fn is_raw(&self) -> bool {
        self.attrs.raw
    }

    /// Whether the applied attributes keep signal keys active
    pub fn is_cbreak(&self) -> bool {
        self.attrs.cbreak
    }

    /// Number of attribute captures
    pub fn attr_reads(&self) -> usize {
        self.attr_reads
    }

    /// Number of attribute changes
    pub fn attr_writes(&self) -> usize {
        self.attr_writes
    }

    /// Number of byte reads attempted
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Input events not consumed yet
    pub fn pending_input(&self) -> usize {
        self.input.len()
    }
}

impl TerminalIo for HeadlessTerminal {
    type Attrs = HeadlessAttrs;

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn get_attrs(&mut self) -> io::Result<HeadlessAttrs> {
        self.attr_reads += 1;
        Ok(self.attrs)
    }

    fn make_raw(&self, _saved: &HeadlessAttrs, cbreak: bool) -> HeadlessAttrs {
        HeadlessAttrs { raw: true, cbreak }
    }

    fn set_attrs(&mut self, attrs: &HeadlessAttrs) -> io::Result<()> {
        self.attr_writes += 1;
        self.attrs = *attrs;
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.reads += 1;
        match self.input.pop_front() {
            None => Ok(None),
            Some(Input::Byte(b)) => Ok(Some(b)),
            Some(Input::Interrupt) => Err(io::ErrorKind::Interrupted.into()),
            Some(Input::Fail(kind)) => Err(io::Error::new(kind, "scripted read failure")),
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.interrupted_writes > 0 {
            self.interrupted_writes -= 1;
            return Err(io::ErrorKind::Interrupted.into());
        }
        if self.fail_writes {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "scripted write failure",
            ));
        }
        self.output.extend_from_slice(data);
        Ok(data.len())
    }
}
