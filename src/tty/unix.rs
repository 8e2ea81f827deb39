//! Unix terminal implementation
//!
//! Reads and writes file descriptors directly with POSIX calls so that a
//! blocked read returns `EINTR` when a signal arrives, and configures the
//! line discipline with termios.

use std::io;
use std::os::fd::BorrowedFd;
use std::os::unix::io::RawFd;

use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::sys::termios::{
    self, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg, SpecialCharacterIndices,
    Termios,
};
use nix::unistd::{isatty, read, write};

use super::TerminalIo;

/// A terminal on a pair of file descriptors (stdin/stdout by default)
#[derive(Debug, Clone, Copy)]
pub struct StdTerminal {
    input: RawFd,
    output: RawFd,
}

impl Default for StdTerminal {
    fn default() -> Self {
        Self::stdio()
    }
}

impl StdTerminal {
    /// The process's standard input and output
    pub fn stdio() -> Self {
        Self {
            input: STDIN_FILENO,
            output: STDOUT_FILENO,
        }
    }

    /// Arbitrary descriptors, e.g. the slave side of a PTY.
    ///
    /// The descriptors must stay open for as long as the terminal is used.
    pub fn from_fds(input: RawFd, output: RawFd) -> Self {
        Self { input, output }
    }

    fn input_fd(&self) -> BorrowedFd<'_> {
        // SAFETY: the caller guarantees the descriptor outlives this terminal
        unsafe { BorrowedFd::borrow_raw(self.input) }
    }
}

impl TerminalIo for StdTerminal {
    type Attrs = Termios;

    fn is_interactive(&self) -> bool {
        isatty(self.input).unwrap_or(false) && isatty(self.output).unwrap_or(false)
    }

    fn get_attrs(&mut self) -> io::Result<Termios> {
        termios::tcgetattr(self.input_fd()).map_err(io::Error::from)
    }

    fn make_raw(&self, saved: &Termios, cbreak: bool) -> Termios {
        raw_attrs(saved, cbreak)
    }

    fn set_attrs(&mut self, attrs: &Termios) -> io::Result<()> {
        termios::tcsetattr(self.input_fd(), SetArg::TCSAFLUSH, attrs).map_err(io::Error::from)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match read(self.input, &mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => Err(io::Error::from(e)),
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        write(self.output, data).map_err(io::Error::from)
    }
}

/// Derive raw-mode attributes from `saved`.
///
/// Input processing, output post-processing, echo, canonical mode, extended
/// input and signal keys are disabled; characters are 8 bits; reads return
/// after one byte with no timeout. `cbreak` re-enables signal keys.
pub fn raw_attrs(saved: &Termios, cbreak: bool) -> Termios {
    let mut raw = saved.clone();

    raw.input_flags &= !(InputFlags::BRKINT
        | InputFlags::ICRNL
        | InputFlags::INPCK
        | InputFlags::ISTRIP
        | InputFlags::IXON);
    raw.output_flags &= !OutputFlags::OPOST;
    raw.control_flags |= ControlFlags::CS8;
    raw.local_flags &= !(LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::IEXTEN | LocalFlags::ISIG);
    if cbreak {
        raw.local_flags |= LocalFlags::ISIG;
    }
    raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
    raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;

    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::fd::AsRawFd;

    use nix::pty::openpty;

    #[test]
    fn test_raw_attrs_flags() {
        let pty = openpty(None, None).expect("Failed to open PTY");
        let saved = termios::tcgetattr(&pty.slave).expect("Failed to get attrs");

        let raw = raw_attrs(&saved, false);
        assert!(!raw.local_flags.contains(LocalFlags::ECHO));
        assert!(!raw.local_flags.contains(LocalFlags::ICANON));
        assert!(!raw.local_flags.contains(LocalFlags::ISIG));
        assert!(!raw.input_flags.contains(InputFlags::ICRNL));
        assert!(!raw.output_flags.contains(OutputFlags::OPOST));
        assert!(raw.control_flags.contains(ControlFlags::CS8));
        assert_eq!(raw.control_chars[SpecialCharacterIndices::VMIN as usize], 1);
        assert_eq!(raw.control_chars[SpecialCharacterIndices::VTIME as usize], 0);

        let cbreak = raw_attrs(&saved, true);
        assert!(cbreak.local_flags.contains(LocalFlags::ISIG));
        assert!(!cbreak.local_flags.contains(LocalFlags::ICANON));
    }

    #[test]
    fn test_pty_is_interactive() {
        let pty = openpty(None, None).expect("Failed to open PTY");
        let fd = pty.slave.as_raw_fd();
        let term = StdTerminal::from_fds(fd, fd);
        assert!(term.is_interactive());
    }

    #[test]
    fn test_regular_file_is_not_interactive() {
        let null = std::fs::File::open("/dev/null").expect("Failed to open /dev/null");
        let term = StdTerminal::from_fds(null.as_raw_fd(), null.as_raw_fd());
        assert!(!term.is_interactive());
    }

    #[test]
    fn test_apply_and_restore() {
        let pty = openpty(None, None).expect("Failed to open PTY");
        let fd = pty.slave.as_raw_fd();
        let mut term = StdTerminal::from_fds(fd, fd);

        let saved = term.get_attrs().unwrap();
        let raw = term.make_raw(&saved, false);
        term.set_attrs(&raw).unwrap();
        let now = term.get_attrs().unwrap();
        assert!(!now.local_flags.contains(LocalFlags::ICANON));

        term.set_attrs(&saved).unwrap();
        let now = term.get_attrs().unwrap();
        assert_eq!(
            now.local_flags.contains(LocalFlags::ICANON),
            saved.local_flags.contains(LocalFlags::ICANON)
        );
    }
}
