//! Line buffer implementation
//!
//! A growable byte sequence with a cursor. Capacity is tracked explicitly:
//! it starts at [`MIN_CAPACITY`] and doubles whenever `len + 1` reaches it.

use std::fmt;

/// Initial capacity of a non-empty buffer
pub const MIN_CAPACITY: usize = 128;

/// Command byte that deletes the character left of the cursor
pub const BACKSPACE: u8 = 0x08;

/// Per-instance replacement for the default command semantics
pub type CommandFn = fn(&mut LineBuffer, u8);

/// Editable line with a cursor
#[derive(Clone, Default)]
pub struct LineBuffer {
    content: Vec<u8>,
    /// Cursor index, always within `0..=content.len()`
    cursor: usize,
    /// Capacity according to the doubling policy
    capacity: usize,
    last_char: Option<u8>,
    command_fn: Option<CommandFn>,
}

impl fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineBuffer")
            .field("content", &String::from_utf8_lossy(&self.content))
            .field("cursor", &self.cursor)
            .field("capacity", &self.capacity)
            .field("last_char", &self.last_char)
            .field("custom_command", &self.command_fn.is_some())
            .finish()
    }
}

impl LineBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer that routes [`command`](Self::command) to `f`
    pub fn with_command_fn(f: CommandFn) -> Self {
        Self {
            command_fn: Some(f),
            ..Self::default()
        }
    }

    /// Install or remove the per-instance command override
    pub fn set_command_fn(&mut self, f: Option<CommandFn>) {
        self.command_fn = f;
    }

    /// Release the content and zero cursor, length and capacity.
    ///
    /// The command override survives a reset.
    pub fn reset(&mut self) {
        self.content = Vec::new();
        self.cursor = 0;
        self.capacity = 0;
        self.last_char = None;
    }

    /// Apply a single command byte.
    ///
    /// Without an override: [`BACKSPACE`] deletes left of the cursor, `\n`
    /// only records itself as the last character, anything else is inserted
    /// at the cursor.
    pub fn command(&mut self, c: u8) {
        if let Some(f) = self.command_fn {
            f(self, c);
            return;
        }

        match c {
            BACKSPACE => self.backspace(),
            b'\n' => self.last_char = Some(b'\n'),
            _ => self.insert(c),
        }
    }

    /// Insert a byte at the cursor, shifting the tail right
    pub fn insert(&mut self, c: u8) {
        self.grow();
        self.content.insert(self.cursor, c);
        self.cursor += 1;
        self.last_char = Some(c);
    }

    /// Remove the byte left of the cursor, shifting the tail left
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let removed = self.content.remove(self.cursor - 1);
        self.cursor -= 1;
        self.last_char = Some(removed);
    }

    /// Move the cursor by a signed offset, clamped to `[0, len]`
    pub fn move_by(&mut self, offset: isize) {
        let target = (self.cursor as isize).saturating_add(offset);
        self.goto(target);
    }

    /// Move the cursor to an absolute position, clamped to `[0, len]`
    pub fn goto(&mut self, pos: isize) {
        self.cursor = pos.clamp(0, self.content.len() as isize) as usize;
    }

    /// The most recent character touched by [`command`](Self::command)
    pub fn last_char(&self) -> Option<u8> {
        self.last_char
    }

    /// Replace the content wholesale and put the cursor at the end
    pub fn set_content(&mut self, bytes: &[u8]) {
        self.capacity = capacity_for(bytes.len());
        let mut content = Vec::with_capacity(self.capacity);
        content.extend_from_slice(bytes);
        self.content = content;
        self.cursor = bytes.len();
        self.last_char = bytes.last().copied();
    }

    /// Current content
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Content length in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Cursor index
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Capacity according to the doubling policy
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn grow(&mut self) {
        if self.content.len() + 1 >= self.capacity {
            self.capacity = if self.capacity == 0 {
                MIN_CAPACITY
            } else {
                self.capacity * 2
            };
            self.content
                .reserve_exact(self.capacity - self.content.len());
        }
    }
}

/// Smallest doubling-policy capacity that holds `len` bytes plus one
fn capacity_for(len: usize) -> usize {
    let mut capacity = MIN_CAPACITY;
    while len + 1 >= capacity {
        capacity *= 2;
    }
    capacity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> LineBuffer {
        let mut buf = LineBuffer::new();
        for b in text.bytes() {
            buf.command(b);
        }
        buf
    }

    #[test]
    fn test_insert_appends_at_cursor() {
        let buf = typed("hello");
        assert_eq!(buf.as_bytes(), b"hello");
        assert_eq!(buf.cursor(), 5);
        assert_eq!(buf.last_char(), Some(b'o'));
    }

    #[test]
    fn test_insert_in_middle_shifts_tail() {
        let mut buf = typed("ac");
        buf.move_by(-1);
        buf.command(b'b');
        assert_eq!(buf.as_bytes(), b"abc");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn test_backspace_in_middle() {
        let mut buf = typed("abcd");
        buf.goto(2);
        buf.command(BACKSPACE);
        assert_eq!(buf.as_bytes(), b"acd");
        assert_eq!(buf.cursor(), 1);
        assert_eq!(buf.last_char(), Some(b'b'));
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut buf = typed("ab");
        buf.goto(0);
        buf.command(BACKSPACE);
        assert_eq!(buf.as_bytes(), b"ab");
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn test_newline_records_without_inserting() {
        let mut buf = typed("hi");
        buf.command(b'\n');
        assert_eq!(buf.as_bytes(), b"hi");
        assert_eq!(buf.last_char(), Some(b'\n'));
    }

    #[test]
    fn test_move_and_goto_clamp() {
        let mut buf = typed("abc");
        buf.move_by(isize::MIN);
        assert_eq!(buf.cursor(), 0);
        buf.move_by(isize::MAX);
        assert_eq!(buf.cursor(), 3);
        buf.goto(-7);
        assert_eq!(buf.cursor(), 0);
        buf.goto(100);
        assert_eq!(buf.cursor(), 3);
        buf.goto(1);
        assert_eq!(buf.cursor(), 1);
    }

    #[test]
    fn test_capacity_doubles() {
        let mut buf = LineBuffer::new();
        assert_eq!(buf.capacity(), 0);
        buf.command(b'x');
        assert_eq!(buf.capacity(), MIN_CAPACITY);
        for _ in 1..MIN_CAPACITY - 1 {
            buf.command(b'x');
        }
        assert_eq!(buf.len(), MIN_CAPACITY - 1);
        assert_eq!(buf.capacity(), MIN_CAPACITY);
        buf.command(b'x');
        assert_eq!(buf.capacity(), MIN_CAPACITY * 2);
    }

    #[test]
    fn test_reset_releases_everything() {
        let mut buf = typed("abc");
        buf.reset();
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.last_char(), None);
    }

    #[test]
    fn test_set_content() {
        let mut buf = typed("old text");
        buf.goto(0);
        buf.set_content(b"echo hi");
        assert_eq!(buf.as_bytes(), b"echo hi");
        assert_eq!(buf.cursor(), 7);
        assert_eq!(buf.last_char(), Some(b'i'));
        assert_eq!(buf.capacity(), MIN_CAPACITY);

        let long = vec![b'z'; 300];
        buf.set_content(&long);
        assert_eq!(buf.capacity(), 512);
        assert!(buf.len() < buf.capacity());
    }

    #[test]
    fn test_set_content_empty() {
        let mut buf = typed("abc");
        buf.set_content(b"");
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.last_char(), None);
    }

    #[test]
    fn test_command_override() {
        fn upper(buf: &mut LineBuffer, c: u8) {
            buf.insert(c.to_ascii_uppercase());
        }

        let mut buf = LineBuffer::with_command_fn(upper);
        buf.command(b'a');
        buf.command(BACKSPACE);
        assert_eq!(buf.as_bytes(), &[b'A', BACKSPACE]);

        buf.reset();
        buf.command(b'q');
        assert_eq!(buf.as_bytes(), b"Q");

        buf.set_command_fn(None);
        buf.command(BACKSPACE);
        assert!(buf.is_empty());
    }
}
