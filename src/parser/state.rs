//! Escape sequence recognizer
//!
//! Two states:
//! - Normal: bytes pass through, except ESC which starts a sequence
//! - InEscape: collects exactly two bytes, then returns to Normal
//!
//! A collected `[` followed by `A`, `B`, `C` or `D` is an arrow key. Any other
//! pair is discarded. Nothing else about the pair is inspected, so an ESC
//! inside a sequence is just another collected byte.

use super::actions::{ArrowKey, ESC};

/// Recognizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Normal,
    InEscape,
}

/// Result of feeding one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A plain byte for the character handler
    Byte(u8),
    /// Consumed as part of an unfinished sequence
    Pending,
    /// A complete arrow key sequence
    Arrow(ArrowKey),
    /// A complete but unrecognized sequence, dropped
    Discarded,
}

/// The escape sequence recognizer
#[derive(Debug, Default, Clone)]
pub struct Recognizer {
    state: State,
    seq: [u8; 2],
    seq_len: usize,
}

impl Recognizer {
    /// Create a recognizer in the Normal state
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any partial sequence and return to Normal
    pub fn reset(&mut self) {
        self.state = State::Normal;
        self.seq = [0; 2];
        self.seq_len = 0;
    }

    /// Whether a sequence is being collected
    pub fn in_escape(&self) -> bool {
        self.state == State::InEscape
    }

    /// Process a single byte
    pub fn feed(&mut self, byte: u8) -> Step {
        match self.state {
            State::Normal if byte == ESC => {
                self.reset();
                self.state = State::InEscape;
                Step::Pending
            }
            State::Normal => Step::Byte(byte),
            State::InEscape => {
                self.seq[self.seq_len] = byte;
                self.seq_len += 1;
                if self.seq_len < self.seq.len() {
                    return Step::Pending;
                }

                let [intro, last] = self.seq;
                self.reset();
                match (intro, ArrowKey::from_final_byte(last)) {
                    (b'[', Some(key)) => Step::Arrow(key),
                    _ => Step::Discarded,
                }
            }
        }
    }

    /// Process a chunk of bytes, returning every non-pending step
    pub fn feed_all(&mut self, data: &[u8]) -> Vec<Step> {
        data.iter()
            .map(|&b| self.feed(b))
            .filter(|step| *step != Step::Pending)
            .collect()
    }
}
