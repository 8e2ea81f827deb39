//! Keyboard input recognition
//!
//! A small state machine that turns raw terminal bytes into key actions.
//! Only the 2-byte CSI form of the arrow keys (`ESC [ A` .. `ESC [ D`) is
//! recognized; other escape sequences are swallowed.

mod actions;
mod state;

pub use actions::{ArrowKey, KeyAction, BS, DEL, ESC};
pub use state::{Recognizer, Step};
