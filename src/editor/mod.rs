//! Line editing
//!
//! The editable line buffer. It knows nothing about the terminal: the read
//! loop feeds it commands and redraws whatever it holds.

mod buffer;

pub use buffer::{CommandFn, LineBuffer, BACKSPACE, MIN_CAPACITY};
