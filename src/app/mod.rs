//! Application glue module
//!
//! Options and their on-disk form.

mod config;

pub use config::{ConfigError, Options};
