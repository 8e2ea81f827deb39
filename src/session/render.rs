//! Prompt and line rendering
//!
//! Frames are built into a byte vector and written with a single `puts`, so a
//! redraw never leaves half a line on screen when the write succeeds.

use std::io::{self, Write};

use crate::editor::LineBuffer;
use crate::tty::Output;

/// Erase the whole current line
pub const ERASE_LINE: &[u8] = b"\x1b[2K";

/// Return to column 1 and erase to the end of the line
pub const CLEAR_TO_END: &[u8] = b"\r\x1b[K";

/// Echo for a deleted character
pub const RUBOUT: &[u8] = b"\x08 \x08";

/// Line terminator written on completion
pub const CRLF: &[u8] = b"\r\n";

/// Written when a read is interrupted
pub const INTERRUPT_ECHO: &[u8] = b"^C\r\n";

fn push_prompt(frame: &mut Vec<u8>, prompt: &str) {
    frame.extend_from_slice(CLEAR_TO_END);
    frame.extend_from_slice(prompt.as_bytes());
}

/// Bytes that clear the line and print `prompt`
pub fn prompt_frame(prompt: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(CLEAR_TO_END.len() + prompt.len());
    push_prompt(&mut frame, prompt);
    frame
}

/// Bytes that repaint `prompt` and `buffer` and park the cursor.
///
/// The cursor column is 1-based: `prompt.len() + cursor + 1`.
pub fn redraw_frame(prompt: &str, buffer: &LineBuffer) -> Vec<u8> {
    let mut frame =
        Vec::with_capacity(ERASE_LINE.len() + CLEAR_TO_END.len() + prompt.len() + buffer.len() + 8);
    frame.extend_from_slice(ERASE_LINE);
    push_prompt(&mut frame, prompt);
    frame.extend_from_slice(buffer.as_bytes());
    let column = prompt.len() + buffer.cursor() + 1;
    // Writing to a Vec cannot fail
    let _ = write!(frame, "\x1b[{}G", column);
    frame
}

pub fn write_prompt<O: Output + ?Sized>(out: &mut O, prompt: &str) -> io::Result<()> {
    out.puts(&prompt_frame(prompt))
}

pub fn redraw<O: Output + ?Sized>(out: &mut O, prompt: &str, buffer: &LineBuffer) -> io::Result<()> {
    out.puts(&redraw_frame(prompt, buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_frame() {
        assert_eq!(prompt_frame("> "), b"\r\x1b[K> ");
    }

    #[test]
    fn test_redraw_frame_cursor_column() {
        let mut buffer = LineBuffer::new();
        buffer.set_content(b"abc");
        buffer.move_by(-1);
        let frame = redraw_frame("> ", &buffer);
        assert_eq!(frame, b"\x1b[2K\r\x1b[K> abc\x1b[5G");
    }

    #[test]
    fn test_redraw_frame_empty() {
        let frame = redraw_frame("", &LineBuffer::new());
        assert_eq!(frame, b"\x1b[2K\r\x1b[K\x1b[1G");
    }
}
