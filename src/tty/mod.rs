//! Terminal control
//!
//! [`TerminalIo`] is the seam between the line editor and the operating
//! system: attribute capture/apply plus single-byte reads and raw writes.
//! [`TerminalController`] layers the raw-mode lifecycle on top of it.

mod controller;
#[cfg(unix)]
mod unix;

pub use controller::{Output, TerminalController};
#[cfg(unix)]
pub use unix::{raw_attrs, StdTerminal};

use std::fmt;
use std::io;

/// Low-level terminal access
pub trait TerminalIo {
    /// Terminal attribute set
    type Attrs: Clone + fmt::Debug;

    /// Whether both input and output are interactive terminals
    fn is_interactive(&self) -> bool;

    /// Capture the current attributes
    fn get_attrs(&mut self) -> io::Result<Self::Attrs>;

    /// Derive the raw-mode variant of `saved`.
    ///
    /// With `cbreak` set, signal-generating keys stay active.
    fn make_raw(&self, saved: &Self::Attrs, cbreak: bool) -> Self::Attrs;

    /// Apply an attribute set
    fn set_attrs(&mut self, attrs: &Self::Attrs) -> io::Result<()>;

    /// Block until one byte is available; `Ok(None)` at end of input
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Write some of `data`, returning how much was written
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;
}
