//! Signal handling in the read loop
//!
//! Signal flags are process-wide, so every scenario runs from a single test
//! in its own binary. Handlers are installed through `Options`; signals are
//! raised with `nix` while a session owns them.

use std::fs::File;
use std::io::Write;
use std::os::fd::AsRawFd;

use nix::pty::openpty;
use nix::sys::signal::{raise, Signal};

use rawline::headless::{HeadlessTerminal, Input};
use rawline::{
    DefaultHooks, ErrorKind, LineContext, LineHooks, LineResult, Options, Session, StdTerminal,
};

fn handler_options() -> Options {
    Options {
        install_handlers: true,
        ..Options::default()
    }
}

/// Default editing, but raises `signal` when `trigger` is typed
struct RaiseOn {
    trigger: u8,
    signal: Signal,
    inner: DefaultHooks,
}

impl RaiseOn {
    fn new(trigger: u8, signal: Signal) -> Self {
        Self {
            trigger,
            signal,
            inner: DefaultHooks::new(),
        }
    }
}

impl LineHooks for RaiseOn {
    fn start_line(&mut self) {
        self.inner.start_line();
    }

    fn handle_byte(&mut self, ctx: &mut LineContext<'_>, byte: u8) -> LineResult<bool> {
        if byte == self.trigger {
            raise(self.signal).expect("Failed to raise signal");
            return Ok(true);
        }
        self.inner.handle_byte(ctx, byte)
    }
}

fn hooked_session(trigger: u8, signal: Signal, term: HeadlessTerminal) -> Session<HeadlessTerminal> {
    let mut session = Session::with_hooks(term, Box::new(RaiseOn::new(trigger, signal)));
    session
        .initialize(&handler_options())
        .expect("Failed to initialize session");
    session
}

fn stale_interrupt_is_discarded() {
    let mut s = Session::new(HeadlessTerminal::with_input(b"ok\n"));
    s.initialize(&handler_options()).unwrap();

    raise(Signal::SIGINT).unwrap();
    assert_eq!(s.read_line("> ").unwrap().as_deref(), Some("ok"));
    assert!(!s.terminal().output_lossy().contains("^C"));
    s.shutdown().unwrap();
}

fn interrupt_aborts_with_byte_in_hand() {
    let mut s = hooked_session(b'!', Signal::SIGINT, HeadlessTerminal::with_input(b"ab!cd\n"));

    let err = s.read_line("> ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Interrupted);
    assert!(s.terminal().output_lossy().ends_with("^C\r\n"));
    assert_eq!(s.depth(), 0);
    assert!(s.history().is_empty());
    // The byte read after the signal is dropped with the line
    assert_eq!(s.terminal().pending_input(), 2);

    assert_eq!(s.read_line("> ").unwrap().as_deref(), Some("d"));
    s.shutdown().unwrap();
}

fn resume_retries_interrupted_read() {
    let mut term = HeadlessTerminal::with_input(b"a~");
    term.push(Input::Interrupt);
    term.push_bytes(b"b\n");
    let mut s = hooked_session(b'~', Signal::SIGCONT, term);

    assert_eq!(s.read_line("> ").unwrap().as_deref(), Some("ab"));
    assert!(!s.terminal().output_lossy().contains("^C"));
    // Enter, re-apply after the resume, restore
    assert_eq!(s.terminal().attr_writes(), 3);
    assert!(!s.terminal().is_raw());
    s.shutdown().unwrap();
}

fn resume_keeps_raw_mode_when_byte_delivered() {
    let mut s = hooked_session(b'~', Signal::SIGCONT, HeadlessTerminal::with_input(b"a~bc\n"));

    assert_eq!(s.read_line("> ").unwrap().as_deref(), Some("abc"));
    // Only enter and restore; no flush of the bytes behind `b`
    assert_eq!(s.terminal().attr_writes(), 2);
    s.shutdown().unwrap();
}

fn stale_resume_keeps_pty_typeahead() {
    let pty = openpty(None, None).expect("Failed to open PTY");
    let slave_fd = pty.slave.as_raw_fd();
    let mut master = File::from(pty.master);

    let mut s = Session::new(StdTerminal::from_fds(slave_fd, slave_fd));
    s.initialize(&handler_options()).unwrap();
    s.history_mut().append(b"echo", None).unwrap();

    raise(Signal::SIGCONT).unwrap();
    s.hold_raw();
    master.write_all(b"\x1b[Ax\r").unwrap();

    assert_eq!(s.read_line("$ ").unwrap().as_deref(), Some("echox"));

    s.release_raw();
    s.shutdown().unwrap();
}

#[test]
fn test_signal_paths() {
    stale_interrupt_is_discarded();
    interrupt_aborts_with_byte_in_hand();
    resume_retries_interrupted_read();
    resume_keeps_raw_mode_when_byte_delivered();
    stale_resume_keeps_pty_typeahead();
}
