//! Line hooks
//!
//! The read loop hands every byte to a [`LineHooks`] implementation, asks it
//! whether the line is complete, and passes the completed line back to it.
//! [`DefaultHooks`] provides the built-in editing keys: arrow keys for history
//! recall and cursor movement, Enter, Backspace and printable insertion.

use tracing::trace;

use super::render;
use crate::editor::{LineBuffer, BACKSPACE};
use crate::error::{LineError, LineResult};
use crate::history::History;
use crate::parser::{ArrowKey, KeyAction, Recognizer, Step};
use crate::tty::Output;

/// What the session does after a line has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Return the line to the caller
    Continue,
    /// Shut the session down and exit the process
    Exit,
}

/// The state a hook may touch while a line is being read
pub struct LineContext<'a> {
    pub buffer: &'a mut LineBuffer,
    pub history: &'a mut History,
    output: &'a mut dyn Output,
    prompt: &'a str,
    done: &'a mut bool,
}

impl<'a> LineContext<'a> {
    pub(crate) fn new(
        buffer: &'a mut LineBuffer,
        history: &'a mut History,
        output: &'a mut dyn Output,
        prompt: &'a str,
        done: &'a mut bool,
    ) -> Self {
        Self {
            buffer,
            history,
            output,
            prompt,
            done,
        }
    }

    /// Write bytes to the terminal
    pub fn puts(&mut self, data: &[u8]) -> LineResult<()> {
        self.output.puts(data).map_err(LineError::Write)
    }

    /// Repaint the prompt and the buffer
    pub fn redraw(&mut self) -> LineResult<()> {
        render::redraw(&mut *self.output, self.prompt, self.buffer).map_err(LineError::Write)
    }

    /// The active prompt
    pub fn prompt(&self) -> &str {
        self.prompt
    }

    /// Latch the line as complete
    pub fn set_done(&mut self) {
        *self.done = true;
    }

    /// Read and clear the completion latch
    pub fn take_done(&mut self) -> bool {
        std::mem::take(&mut *self.done)
    }
}

/// Per-session editing strategy
pub trait LineHooks {
    /// Called before the prompt of every read
    fn start_line(&mut self) {}

    /// Handle one input byte. Returns `false` if the byte was not consumed,
    /// in which case the loop ignores it and reads the next one.
    fn handle_byte(&mut self, ctx: &mut LineContext<'_>, byte: u8) -> LineResult<bool>;

    /// Whether the line is complete; checked after every consumed byte
    fn is_done(&mut self, ctx: &mut LineContext<'_>) -> bool {
        let latched = ctx.take_done();
        latched || ctx.buffer.last_char() == Some(b'\n')
    }

    /// Called with every completed line
    fn exec_command(&mut self, history: &mut History, line: &str) -> LineResult<CommandOutcome> {
        if !line.is_empty() && history.is_initialized() {
            history.append(line.as_bytes(), None)?;
        }
        if line == "exit" {
            return Ok(CommandOutcome::Exit);
        }
        Ok(CommandOutcome::Continue)
    }
}

/// Built-in editing keys
#[derive(Debug, Default)]
pub struct DefaultHooks {
    recognizer: Recognizer,
}

impl DefaultHooks {
    pub fn new() -> Self {
        Self::default()
    }

    fn arrow(&mut self, ctx: &mut LineContext<'_>, key: ArrowKey) -> LineResult<()> {
        trace!(?key, "arrow key");
        match key {
            ArrowKey::Up | ArrowKey::Down => {
                let entry = if key == ArrowKey::Up {
                    ctx.history.previous()
                } else {
                    ctx.history.next()
                };
                if let Some(entry) = entry {
                    ctx.buffer.set_content(entry.text());
                }
                ctx.redraw()
            }
            ArrowKey::Right => {
                ctx.buffer.move_by(1);
                Ok(())
            }
            ArrowKey::Left => {
                ctx.buffer.move_by(-1);
                Ok(())
            }
        }
    }
}

impl LineHooks for DefaultHooks {
    fn start_line(&mut self) {
        // A sequence cut off by an interrupt must not swallow the next line
        self.recognizer.reset();
    }

    fn handle_byte(&mut self, ctx: &mut LineContext<'_>, byte: u8) -> LineResult<bool> {
        let byte = match self.recognizer.feed(byte) {
            Step::Byte(b) => b,
            Step::Pending | Step::Discarded => return Ok(true),
            Step::Arrow(key) => {
                self.arrow(ctx, key)?;
                return Ok(true);
            }
        };

        match KeyAction::classify(byte) {
            KeyAction::Enter => {
                ctx.buffer.command(b'\n');
                ctx.set_done();
                ctx.puts(render::CRLF)?;
            }
            KeyAction::Backspace => {
                ctx.history.set_dirty();
                ctx.buffer.command(BACKSPACE);
                ctx.puts(render::RUBOUT)?;
            }
            KeyAction::Insert(c) => {
                ctx.history.set_dirty();
                ctx.buffer.command(c);
                ctx.puts(&[c])?;
            }
            KeyAction::Unhandled(_) => {
                ctx.history.set_dirty();
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Default)]
    struct Sink(Vec<u8>);

    impl Output for Sink {
        fn puts(&mut self, data: &[u8]) -> io::Result<()> {
            self.0.extend_from_slice(data);
            Ok(())
        }
    }

    struct Fixture {
        buffer: LineBuffer,
        history: History,
        sink: Sink,
        done: bool,
        hooks: DefaultHooks,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                buffer: LineBuffer::new(),
                history: History::in_memory(),
                sink: Sink::default(),
                done: false,
                hooks: DefaultHooks::new(),
            }
        }

        fn feed(&mut self, bytes: &[u8]) -> Vec<bool> {
            let mut consumed = Vec::new();
            for &b in bytes {
                let mut ctx = LineContext::new(
                    &mut self.buffer,
                    &mut self.history,
                    &mut self.sink,
                    "> ",
                    &mut self.done,
                );
                consumed.push(self.hooks.handle_byte(&mut ctx, b).unwrap());
            }
            consumed
        }

        fn is_done(&mut self) -> bool {
            let mut ctx = LineContext::new(
                &mut self.buffer,
                &mut self.history,
                &mut self.sink,
                "> ",
                &mut self.done,
            );
            self.hooks.is_done(&mut ctx)
        }
    }

    #[test]
    fn test_insert_echoes() {
        let mut fx = Fixture::new();
        fx.feed(b"hi");
        assert_eq!(fx.buffer.as_bytes(), b"hi");
        assert_eq!(fx.sink.0, b"hi");
        assert!(!fx.is_done());
    }

    #[test]
    fn test_enter_latches_done_once() {
        let mut fx = Fixture::new();
        fx.feed(b"a\r");
        assert!(fx.done);
        assert_eq!(fx.buffer.as_bytes(), b"a");
        assert!(fx.sink.0.ends_with(b"\r\n"));
        assert!(fx.is_done());
        assert!(!fx.done);
    }

    #[test]
    fn test_backspace_rubs_out() {
        let mut fx = Fixture::new();
        fx.feed(b"ab\x7f");
        assert_eq!(fx.buffer.as_bytes(), b"a");
        assert!(fx.sink.0.ends_with(b"\x08 \x08"));
    }

    #[test]
    fn test_unhandled_control_byte() {
        let mut fx = Fixture::new();
        let consumed = fx.feed(&[0x01]);
        assert_eq!(consumed, vec![false]);
        assert!(fx.buffer.is_empty());
    }

    #[test]
    fn test_escape_bytes_are_consumed() {
        let mut fx = Fixture::new();
        let consumed = fx.feed(b"\x1b[Z");
        assert_eq!(consumed, vec![true, true, true]);
        assert!(fx.buffer.is_empty());
        assert!(fx.sink.0.is_empty());
    }

    #[test]
    fn test_up_down_recall() {
        let mut fx = Fixture::new();
        fx.history.append(b"one", None).unwrap();
        fx.history.append(b"two", None).unwrap();

        fx.feed(b"\x1b[A");
        assert_eq!(fx.buffer.as_bytes(), b"two");
        fx.feed(b"\x1b[A");
        assert_eq!(fx.buffer.as_bytes(), b"one");
        fx.feed(b"\x1b[B");
        assert_eq!(fx.buffer.as_bytes(), b"two");
        assert!(fx.sink.0.ends_with(b"> two\x1b[6G"));
    }

    #[test]
    fn test_left_right_move_cursor() {
        let mut fx = Fixture::new();
        fx.feed(b"ab\x1b[D\x1b[D\x1b[C");
        assert_eq!(fx.buffer.cursor(), 1);
        fx.feed(b"x");
        assert_eq!(fx.buffer.as_bytes(), b"axb");
    }

    #[test]
    fn test_exec_command_appends_non_empty() {
        let mut hooks = DefaultHooks::new();
        let mut history = History::in_memory();
        assert_eq!(
            hooks.exec_command(&mut history, "ls").unwrap(),
            CommandOutcome::Continue
        );
        hooks.exec_command(&mut history, "").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(
            hooks.exec_command(&mut history, "exit").unwrap(),
            CommandOutcome::Exit
        );
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_exec_command_skips_uninitialized_history() {
        let mut hooks = DefaultHooks::new();
        let mut history = History::new();
        hooks.exec_command(&mut history, "ls").unwrap();
        assert!(history.is_empty());
    }
}
