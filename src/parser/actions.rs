//! Key actions produced from input bytes

/// Escape
pub const ESC: u8 = 0x1B;
/// Delete, sent by most terminals for the backspace key
pub const DEL: u8 = 0x7F;
/// Backspace (Ctrl-H)
pub const BS: u8 = 0x08;

/// Arrow keys decoded from `ESC [ <final>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Up,
    Down,
    Right,
    Left,
}

impl ArrowKey {
    /// Decode the final byte of a CSI arrow sequence
    pub fn from_final_byte(byte: u8) -> Option<Self> {
        match byte {
            b'A' => Some(ArrowKey::Up),
            b'B' => Some(ArrowKey::Down),
            b'C' => Some(ArrowKey::Right),
            b'D' => Some(ArrowKey::Left),
            _ => None,
        }
    }
}

/// What a plain (non-escape) byte means to the line editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// CR or LF: finish the line
    Enter,
    /// DEL or BS: delete left of the cursor
    Backspace,
    /// Printable ASCII or tab
    Insert(u8),
    /// Any other control byte
    Unhandled(u8),
}

impl KeyAction {
    /// Classify a byte received outside an escape sequence
    pub fn classify(byte: u8) -> Self {
        match byte {
            b'\r' | b'\n' => KeyAction::Enter,
            DEL | BS => KeyAction::Backspace,
            b'\t' | 0x20..=0x7E => KeyAction::Insert(byte),
            _ => KeyAction::Unhandled(byte),
        }
    }
}
